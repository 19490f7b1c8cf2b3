use std::{collections::BTreeMap, time::Duration};

use geobatch_core::{entities::GeoPoint, gateways::geocode::*};
use reqwest::{blocking::Client, StatusCode};
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoding through a Nominatim (OpenStreetMap) server.
///
/// Nominatim requires every client to identify itself
/// with a meaningful user agent.
#[derive(Debug, Clone)]
pub struct Nominatim {
    base_url: String,
    client: Client,
}

impl Nominatim {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            client,
        })
    }

    fn get(&self, path: &str, params: &[(&str, String)]) -> Result<String, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .map_err(|err| ProviderError::Unreachable(err.to_string()))?;
        check_status(response.status())?;
        let body = response
            .text()
            .map_err(|err| ProviderError::Unreachable(err.to_string()))?;
        log::trace!("Nominatim response: {}", body);
        Ok(body)
    }
}

impl GeoCodingGateway for Nominatim {
    fn forward(&self, address: &str) -> Result<Option<ForwardMatch>, ProviderError> {
        let params = [
            ("q", address.to_owned()),
            ("format", "jsonv2".to_owned()),
            ("limit", "1".to_owned()),
            ("addressdetails", "1".to_owned()),
        ];
        let body = self.get("search", &params)?;
        decode_search(&body)
    }
}

impl ReverseGeoCodingGateway for Nominatim {
    fn reverse(&self, pos: &GeoPoint) -> Result<Option<ReverseMatch>, ProviderError> {
        let params = [
            ("lat", pos.latitude().to_string()),
            ("lon", pos.longitude().to_string()),
            ("format", "jsonv2".to_owned()),
            ("addressdetails", "1".to_owned()),
        ];
        let body = self.get("reverse", &params)?;
        decode_reverse(&body)
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: Option<String>,
    #[serde(default)]
    address: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReverseResponse {
    Found(Place),
    NotFound { error: String },
}

fn check_status(status: StatusCode) -> Result<(), ProviderError> {
    if status.is_success() {
        return Ok(());
    }
    Err(crate::status_error(
        status.as_u16(),
        format!("HTTP status {status}"),
    ))
}

fn malformed(err: impl ToString) -> ProviderError {
    ProviderError::MalformedResponse(err.to_string())
}

fn place_position(place: &Place) -> Result<GeoPoint, ProviderError> {
    let lat = place.lat.parse::<f64>().map_err(malformed)?;
    let lon = place.lon.parse::<f64>().map_err(malformed)?;
    // Nominatim doesn't know about elevations
    GeoPoint::try_new(lat, lon, None).map_err(malformed)
}

fn decode_search(body: &str) -> Result<Option<ForwardMatch>, ProviderError> {
    let places: Vec<Place> = serde_json::from_str(body).map_err(malformed)?;
    let Some(place) = places.into_iter().next() else {
        return Ok(None);
    };
    let point = place_position(&place)?;
    Ok(Some(ForwardMatch {
        point,
        address: place.display_name,
        attributes: place.address,
    }))
}

fn decode_reverse(body: &str) -> Result<Option<ReverseMatch>, ProviderError> {
    let response: ReverseResponse = serde_json::from_str(body).map_err(malformed)?;
    match response {
        ReverseResponse::Found(place) => {
            let Place {
                display_name,
                address,
                ..
            } = place;
            let address_line = display_name
                .filter(|name| !name.trim().is_empty())
                .ok_or_else(|| malformed("Missing display name"))?;
            Ok(Some(ReverseMatch {
                address: address_line,
                attributes: address,
            }))
        }
        ReverseResponse::NotFound { error } => {
            log::debug!("Nominatim reverse lookup without result: {}", error);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH_RESPONSE: &str = r#"[{
        "place_id": 132214467,
        "licence": "Data © OpenStreetMap contributors, ODbL 1.0. http://osm.org/copyright",
        "osm_type": "way",
        "osm_id": 4411426,
        "lat": "52.5170365",
        "lon": "13.3888599",
        "category": "boundary",
        "type": "administrative",
        "place_rank": 8,
        "importance": 0.8875390282491362,
        "addresstype": "city",
        "name": "Berlin",
        "display_name": "Berlin, Deutschland",
        "address": {
            "city": "Berlin",
            "ISO3166-2-lvl4": "DE-BE",
            "country": "Deutschland",
            "country_code": "de"
        },
        "boundingbox": ["52.3382448", "52.6755087", "13.0883450", "13.7611609"]
    }]"#;

    const REVERSE_RESPONSE: &str = r#"{
        "place_id": 140089418,
        "lat": "52.51628",
        "lon": "13.37769",
        "display_name": "Pariser Platz, Mitte, Berlin, 10117, Deutschland",
        "address": {
            "road": "Pariser Platz",
            "suburb": "Mitte",
            "city": "Berlin",
            "postcode": "10117",
            "country": "Deutschland",
            "country_code": "de"
        }
    }"#;

    #[test]
    fn decode_search_result() {
        let found = decode_search(SEARCH_RESPONSE).unwrap().unwrap();
        assert_eq!(found.point.latitude(), 52.5170365);
        assert_eq!(found.point.longitude(), 13.3888599);
        assert_eq!(found.point.altitude(), None);
        assert_eq!(found.address.as_deref(), Some("Berlin, Deutschland"));
        assert_eq!(found.attributes.get("country_code").unwrap(), "de");
    }

    #[test]
    fn decode_empty_search_result() {
        assert_eq!(decode_search("[]").unwrap(), None);
    }

    #[test]
    fn decode_malformed_search_result() {
        assert!(matches!(
            decode_search("<html>Bad gateway</html>"),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_search(r#"[{"lat":"north","lon":"13.0"}]"#),
            Err(ProviderError::MalformedResponse(_))
        ));
        assert!(matches!(
            decode_search(r#"[{"lat":"95.0","lon":"13.0"}]"#),
            Err(ProviderError::MalformedResponse(_))
        ));
    }

    #[test]
    fn decode_reverse_result() {
        let found = decode_reverse(REVERSE_RESPONSE).unwrap().unwrap();
        assert_eq!(
            found.address,
            "Pariser Platz, Mitte, Berlin, 10117, Deutschland"
        );
        assert_eq!(found.attributes.get("postcode").unwrap(), "10117");
    }

    #[test]
    fn decode_reverse_without_result() {
        assert_eq!(
            decode_reverse(r#"{"error":"Unable to geocode"}"#).unwrap(),
            None
        );
        assert!(decode_reverse("{}").is_err());
    }

    #[test]
    fn classify_http_status() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(matches!(
            check_status(StatusCode::TOO_MANY_REQUESTS),
            Err(ProviderError::QuotaExceeded(_))
        ));
        assert!(matches!(
            check_status(StatusCode::SERVICE_UNAVAILABLE),
            Err(ProviderError::Unavailable(_))
        ));
        assert!(matches!(
            check_status(StatusCode::FORBIDDEN),
            Err(ProviderError::Rejected(_))
        ));
    }

    #[test]
    fn trim_trailing_slash_of_base_url() {
        let gw = Nominatim::new("http://localhost:8080/", "geobatch-test", DEFAULT_TIMEOUT).unwrap();
        assert_eq!(gw.base_url, "http://localhost:8080");
    }
}
