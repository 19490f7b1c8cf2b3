use std::sync::Arc;

use crate::{
    entities::GeoPoint,
    gateways::geocode::{
        ForwardMatch, GeoCodingGateway, ProviderError, ReverseGeoCodingGateway, ReverseMatch,
    },
    rate_limit::RateLimiter,
};

/// The outcome of a single resolution attempt.
///
/// A provider that answers without a match is a regular
/// business outcome (`NotFound`) and must never be confused
/// with a provider that could not answer at all (`Failed`).
#[derive(Debug, Clone, PartialEq)]
pub enum ResolutionOutcome<T> {
    Found(T),
    NotFound,
    Failed(ProviderError),
}

impl<T> ResolutionOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResolutionOutcome<U> {
        match self {
            Self::Found(found) => ResolutionOutcome::Found(f(found)),
            Self::NotFound => ResolutionOutcome::NotFound,
            Self::Failed(err) => ResolutionOutcome::Failed(err),
        }
    }

    pub fn into_result(self) -> Result<Option<T>, ProviderError> {
        match self {
            Self::Found(found) => Ok(Some(found)),
            Self::NotFound => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

impl<T> From<Result<Option<T>, ProviderError>> for ResolutionOutcome<T> {
    fn from(from: Result<Option<T>, ProviderError>) -> Self {
        match from {
            Ok(Some(found)) => Self::Found(found),
            Ok(None) => Self::NotFound,
            Err(err) => Self::Failed(err),
        }
    }
}

/// Sends every request of a gateway through a [`RateLimiter`].
///
/// Resolvers that are created with the same (shared) limiter
/// also share its budget.
#[derive(Debug)]
pub struct RateLimitedResolver<G> {
    gateway: G,
    limiter: Arc<RateLimiter>,
}

impl<G> RateLimitedResolver<G> {
    pub fn new(gateway: G, limiter: Arc<RateLimiter>) -> Self {
        Self { gateway, limiter }
    }

    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn shared_limiter(&self) -> Arc<RateLimiter> {
        Arc::clone(&self.limiter)
    }
}

impl<G> RateLimitedResolver<G>
where
    G: GeoCodingGateway,
{
    pub fn resolve(&self, address: &str) -> ResolutionOutcome<GeoPoint> {
        self.resolve_match(address).map(|m| m.point)
    }

    /// Like [`Self::resolve`] but keeps the matched address
    /// and the provider attributes.
    pub fn resolve_match(&self, address: &str) -> ResolutionOutcome<ForwardMatch> {
        let outcome = ResolutionOutcome::from(self.limiter.call(|| self.gateway.forward(address)));
        match &outcome {
            ResolutionOutcome::Found(m) => {
                log::debug!("Resolved address location '{}': {}", address, m.point);
            }
            ResolutionOutcome::NotFound => {
                log::info!("No location found for address '{}'", address);
            }
            ResolutionOutcome::Failed(err) => {
                log::warn!("Failed to resolve address location '{}': {}", address, err);
            }
        }
        outcome
    }
}

impl<G> RateLimitedResolver<G>
where
    G: ReverseGeoCodingGateway,
{
    pub fn reverse_resolve(&self, pos: &GeoPoint) -> ResolutionOutcome<String> {
        self.reverse_resolve_match(pos).map(|m| m.address)
    }

    pub fn reverse_resolve_match(&self, pos: &GeoPoint) -> ResolutionOutcome<ReverseMatch> {
        let outcome = ResolutionOutcome::from(self.limiter.call(|| self.gateway.reverse(pos)));
        match &outcome {
            ResolutionOutcome::Found(m) => {
                log::debug!("Resolved address of location {}: '{}'", pos, m.address);
            }
            ResolutionOutcome::NotFound => {
                log::info!("No address found for location {}", pos);
            }
            ResolutionOutcome::Failed(err) => {
                log::warn!("Failed to resolve address of location {}: {}", pos, err);
            }
        }
        outcome
    }
}
