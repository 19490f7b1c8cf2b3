use duration_str::deserialize_option_duration;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = include_str!("geobatch.default.toml");

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub geocoding: Option<Geocoding>,
    pub gateway: Option<Gateway>,
    pub address: Option<Address>,
    pub batch: Option<Batch>,
}

impl Default for Config {
    fn default() -> Self {
        let cfg: Self = toml::from_str(DEFAULT_CONFIG_FILE).expect("Default configuration");
        cfg
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Geocoding {
    pub gateway: Option<GeocodingGateway>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub min_delay: Option<Duration>,
}

impl Default for Geocoding {
    fn default() -> Self {
        Config::default()
            .geocoding
            .expect("Geocoding configuration")
    }
}

#[derive(Clone, Copy, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GeocodingGateway {
    Nominatim,
    Opencage,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Gateway {
    pub nominatim: Option<Nominatim>,
    pub opencage: Option<OpenCage>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Nominatim {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,
}

impl Default for Nominatim {
    fn default() -> Self {
        Config::default()
            .gateway
            .and_then(|gw| gw.nominatim)
            .expect("Nominatim configuration")
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OpenCage {
    pub api_key: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Address {
    pub fields: Option<Vec<String>>,
    pub separator: Option<String>,
    pub suffix: Option<String>,
    pub key_column: Option<String>,
}

impl Default for Address {
    fn default() -> Self {
        Config::default().address.expect("Address configuration")
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Batch {
    pub crs: Option<String>,
    pub fail_fast: Option<bool>,
    pub max_retries: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub retry_backoff: Option<Duration>,
    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub max_backoff: Option<Duration>,
}

impl Default for Batch {
    fn default() -> Self {
        Config::default().batch.expect("Batch configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parse_default_config_from_file() {
        let cfg: Config = toml::from_str(DEFAULT_CONFIG_FILE).unwrap();
        assert!(cfg.geocoding.is_some());
        assert!(cfg.gateway.is_some());
        assert!(cfg.address.is_some());
        assert!(cfg.batch.is_some());
    }

    #[test]
    fn default_batch_config() {
        let cfg = Batch::default();
        assert_eq!(cfg.crs.as_deref(), Some("EPSG:4326"));
        assert_eq!(cfg.fail_fast, Some(false));
        assert_eq!(cfg.max_retries, Some(0));
        assert_eq!(cfg.retry_backoff, Some(Duration::from_secs(2)));
        assert_eq!(cfg.max_backoff, Some(Duration::from_secs(60)));
    }

    #[test]
    fn default_nominatim_config() {
        let cfg = Nominatim::default();
        assert!(cfg.base_url.is_some());
        assert!(cfg.user_agent.is_some());
        assert_eq!(cfg.timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn missing_durations() {
        let cfg: Config = toml::from_str("[geocoding]\ngateway = \"nominatim\"\n").unwrap();
        assert!(cfg.geocoding.unwrap().min_delay.is_none());
        assert!(cfg.batch.is_none());
    }

    #[test]
    fn parse_full_config_example_from_file() {
        let cfg_string = fs::read_to_string("src/config/geobatch.full-example.toml").unwrap();
        let cfg: Config = toml::from_str(&cfg_string).unwrap();
        let opencage = cfg.gateway.and_then(|gw| gw.opencage).unwrap();
        assert!(opencage.api_key.is_some());
        assert_eq!(cfg.batch.unwrap().max_backoff, Some(Duration::from_secs(60)));
    }
}
