use geobatch_core::gateways::geocode::ProviderError;

pub mod nominatim;
pub mod opencage;

/// Classifies the HTTP status of a failed provider response.
fn status_error(status: u16, msg: String) -> ProviderError {
    match status {
        // OpenCage answers 402 if the daily quota is exhausted
        402 | 429 => ProviderError::QuotaExceeded(msg),
        500..=599 => ProviderError::Unavailable(msg),
        _ => ProviderError::Rejected(msg),
    }
}
