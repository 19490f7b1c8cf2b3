use std::fmt;

use geobatch_core::{entities::GeoPoint, gateways::geocode::*};
use geocoding::{Forward, GeocodingError, Opencage, Point, Reverse};

/// Geocoding through the OpenCage API.
pub struct OpenCage {
    client: Opencage<'static>,
}

impl OpenCage {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Opencage::new(api_key),
        }
    }
}

impl fmt::Debug for OpenCage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenCage").finish_non_exhaustive()
    }
}

impl GeoCodingGateway for OpenCage {
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError> {
        let points: Vec<Point<f64>> = self.client.forward(address).map_err(provider_error)?;
        let Some(point) = points.into_iter().next() else {
            return Ok(None);
        };
        // x = longitude, y = latitude
        let pos = GeoPoint::try_new(point.y(), point.x(), None)
            .map_err(|err| ProviderError::MalformedResponse(err.to_string()))?;
        Ok(Some(ForwardMatch::new(pos)))
    }
}

impl ReverseGeoCodingGateway for OpenCage {
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError> {
        let point = Point::new(pos.longitude(), pos.latitude());
        let address = self.client.reverse(&point).map_err(provider_error)?;
        Ok(address.map(ReverseMatch::new))
    }
}

fn provider_error(err: GeocodingError) -> ProviderError {
    match err {
        GeocodingError::Request(err) => match err.status() {
            Some(status) => crate::status_error(status.as_u16(), err.to_string()),
            None if err.is_decode() => ProviderError::MalformedResponse(err.to_string()),
            None => ProviderError::Unreachable(err.to_string()),
        },
        err => ProviderError::MalformedResponse(err.to_string()),
    }
}
