use thiserror::Error;

use crate::{entities::*, gateways::geocode::ProviderError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error(transparent)]
    MissingField(#[from] MissingFieldError),
    #[error("Failed to resolve '{query}': {source}")]
    Provider {
        query: String,
        #[source]
        source: ProviderError,
    },
    #[error("Invalid position ({latitude}, {longitude}): {source}")]
    InvalidPosition {
        latitude: f64,
        longitude: f64,
        #[source]
        source: InvalidPosition,
    },
}
