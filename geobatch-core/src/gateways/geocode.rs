use std::{collections::BTreeMap, sync::Arc};

use thiserror::Error;

use crate::entities::GeoPoint;

/// Raw, provider specific details of a match.
pub type Attributes = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq)]
pub struct ForwardMatch {
    pub point: GeoPoint,
    /// The full address as matched by the provider.
    pub address: Option<String>,
    pub attributes: Attributes,
}

impl ForwardMatch {
    pub fn new(point: GeoPoint) -> Self {
        Self {
            point,
            address: None,
            attributes: Attributes::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReverseMatch {
    pub address: String,
    pub attributes: Attributes,
}

impl ReverseMatch {
    pub fn new(address: String) -> Self {
        Self {
            address,
            attributes: Attributes::new(),
        }
    }
}

/// A provider failed to answer a request.
///
/// Providers that answer without a match don't fail,
/// they return `Ok(None)` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Geocoding provider unreachable: {0}")]
    Unreachable(String),
    #[error("Geocoding provider unavailable: {0}")]
    Unavailable(String),
    #[error("Geocoding quota exceeded: {0}")]
    QuotaExceeded(String),
    #[error("Request rejected by geocoding provider: {0}")]
    Rejected(String),
    #[error("Malformed response from geocoding provider: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Transient errors might disappear when retrying the same
    /// request later.
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Unreachable(_) | Self::Unavailable(_) | Self::QuotaExceeded(_)
        )
    }
}

pub trait GeoCodingGateway {
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError>;
}

pub trait ReverseGeoCodingGateway {
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError>;
}

impl<G> GeoCodingGateway for &G
where
    G: GeoCodingGateway + ?Sized,
{
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError> {
        (**self).forward(address)
    }
}

impl<G> GeoCodingGateway for Arc<G>
where
    G: GeoCodingGateway + ?Sized,
{
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError> {
        (**self).forward(address)
    }
}

impl<G> ReverseGeoCodingGateway for &G
where
    G: ReverseGeoCodingGateway + ?Sized,
{
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError> {
        (**self).reverse(pos)
    }
}

impl<G> ReverseGeoCodingGateway for Arc<G>
where
    G: ReverseGeoCodingGateway + ?Sized,
{
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError> {
        (**self).reverse(pos)
    }
}
