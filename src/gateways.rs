use anyhow::Result;
use geobatch_core::{entities::GeoPoint, gateways::geocode::*};
use geobatch_gateways::{nominatim::Nominatim, opencage::OpenCage};

use crate::config::GeocodingGateway;

/// The configured geocoding provider.
#[derive(Debug)]
pub enum Gateway {
    Nominatim(Nominatim),
    OpenCage(OpenCage),
}

impl GeoCodingGateway for Gateway {
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError> {
        match self {
            Self::Nominatim(gw) => gw.forward(address),
            Self::OpenCage(gw) => gw.forward(address),
        }
    }
}

impl ReverseGeoCodingGateway for Gateway {
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError> {
        match self {
            Self::Nominatim(gw) => gw.reverse(pos),
            Self::OpenCage(gw) => gw.reverse(pos),
        }
    }
}

pub fn geocoding_gateway(cfg: &GeocodingGateway) -> Result<Gateway> {
    let gw = match cfg {
        GeocodingGateway::Nominatim {
            base_url,
            user_agent,
            timeout,
        } => Gateway::Nominatim(Nominatim::new(base_url, user_agent, *timeout)?),
        GeocodingGateway::OpenCage { api_key } => Gateway::OpenCage(OpenCage::new(api_key.clone())),
    };
    Ok(gw)
}
