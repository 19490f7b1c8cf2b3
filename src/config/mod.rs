use anyhow::{anyhow, Result};
use geobatch_core::{
    entities::Crs,
    normalize::{AddressNormalizer, FieldSpec, DEFAULT_SEPARATOR},
    rate_limit::DEFAULT_MIN_DELAY,
    retry::{RetryPolicy, DEFAULT_BACKOFF, DEFAULT_MAX_BACKOFF},
    usecases::BatchOptions,
};
use geobatch_gateways::nominatim;
use std::{env, fs, io::ErrorKind, path::Path, time::Duration};

mod raw;

const DEFAULT_CONFIG_FILE_NAME: &str = "geobatch.toml";

const ENV_NAME_OPENCAGE_API_KEY: &str = "OPENCAGE_API_KEY";
const ENV_NAME_NOMINATIM_USER_AGENT: &str = "NOMINATIM_USER_AGENT";
const ENV_NAME_MIN_DELAY: &str = "GEOBATCH_MIN_DELAY";

/// Marks an address field as optional, e.g. `zip?`.
const OPTIONAL_FIELD_MARKER: char = '?';

pub struct Config {
    pub geocoding: Geocoding,
    pub address: Address,
    pub batch: Batch,
}

impl Config {
    pub fn try_load_from_file_or_default<P: AsRef<Path>>(file_path: Option<P>) -> Result<Self> {
        let file_path: &Path = file_path.as_ref().map(|p| p.as_ref()).unwrap_or_else(|| {
            log::info!("No configuration file specified. load {DEFAULT_CONFIG_FILE_NAME}");
            Path::new(DEFAULT_CONFIG_FILE_NAME)
        });

        let mut raw_config = match fs::read_to_string(file_path) {
            Ok(cfg_string) => toml::from_str(&cfg_string)?,
            Err(err) => match err.kind() {
                ErrorKind::NotFound => {
                    log::info!(
                        "{} not found => load default configuration.",
                        file_path.display()
                    );
                    Ok(raw::Config::default())
                }
                _ => Err(err),
            }?,
        };
        override_from_env(&mut raw_config, |name| env::var(name).ok())?;
        Self::try_from(raw_config)
    }
}

fn override_from_env<F>(cfg: &mut raw::Config, var: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(api_key) = var(ENV_NAME_OPENCAGE_API_KEY) {
        let gateway = cfg.gateway.get_or_insert_with(Default::default);
        gateway.opencage = Some(raw::OpenCage {
            api_key: Some(api_key),
        });
    }
    if let Some(user_agent) = var(ENV_NAME_NOMINATIM_USER_AGENT) {
        let gateway = cfg.gateway.get_or_insert_with(Default::default);
        gateway
            .nominatim
            .get_or_insert_with(Default::default)
            .user_agent = Some(user_agent);
    }
    if let Some(min_delay) = var(ENV_NAME_MIN_DELAY) {
        let min_delay = duration_str::parse(&min_delay)
            .map_err(|err| anyhow!("Invalid {ENV_NAME_MIN_DELAY} '{min_delay}': {err}"))?;
        cfg.geocoding
            .get_or_insert_with(Default::default)
            .min_delay = Some(min_delay);
    }
    Ok(())
}

pub struct Geocoding {
    pub gateway: GeocodingGateway,
    /// Minimum time between the start of two provider requests.
    pub min_delay: Duration,
}

#[derive(Clone)]
pub enum GeocodingGateway {
    Nominatim {
        base_url: String,
        user_agent: String,
        timeout: Duration,
    },
    OpenCage {
        api_key: String,
    },
}

pub struct Address {
    pub fields: Vec<FieldSpec>,
    pub separator: String,
    pub suffix: Option<String>,
    pub key_column: Option<String>,
}

impl Address {
    pub fn normalizer(&self) -> AddressNormalizer {
        let normalizer =
            AddressNormalizer::new(self.fields.clone()).with_separator(self.separator.as_str());
        match &self.suffix {
            Some(suffix) => normalizer.with_suffix(suffix.as_str()),
            None => normalizer,
        }
    }
}

pub struct Batch {
    pub crs: Crs,
    pub fail_fast: bool,
    pub retry: RetryPolicy,
}

impl Batch {
    pub fn options(&self) -> BatchOptions {
        BatchOptions {
            crs: self.crs,
            fail_fast: self.fail_fast,
            retry: self.retry,
            cancel: None,
        }
    }
}

fn field_spec(field: &str) -> Result<FieldSpec> {
    let field = field.trim();
    let spec = match field.strip_suffix(OPTIONAL_FIELD_MARKER) {
        Some(column) => FieldSpec::optional(column.trim()),
        None => FieldSpec::required(field),
    };
    if spec.column.is_empty() {
        return Err(anyhow!("Empty address field name"));
    }
    Ok(spec)
}

impl TryFrom<raw::Config> for Config {
    type Error = anyhow::Error;
    fn try_from(from: raw::Config) -> Result<Self> {
        let raw::Config {
            geocoding,
            gateway,
            address,
            batch,
        } = from;

        let raw::Geocoding {
            gateway: gw_name,
            min_delay,
        } = geocoding.unwrap_or_default();
        let min_delay = min_delay.unwrap_or(DEFAULT_MIN_DELAY);
        let gateway = gateway.unwrap_or_default();

        let gateway = match gw_name.unwrap_or(raw::GeocodingGateway::Nominatim) {
            raw::GeocodingGateway::Nominatim => {
                let raw::Nominatim {
                    base_url,
                    user_agent,
                    timeout,
                } = gateway.nominatim.unwrap_or_default();
                let user_agent = user_agent
                    .map(|ua| ua.trim().to_owned())
                    .filter(|ua| !ua.is_empty())
                    .ok_or_else(|| anyhow!("Missing 'nominatim' user agent"))?;
                let base_url = base_url.unwrap_or_else(|| nominatim::DEFAULT_BASE_URL.to_owned());
                log::info!("Use Nominatim gateway ({base_url})");
                GeocodingGateway::Nominatim {
                    base_url,
                    user_agent,
                    timeout: timeout.unwrap_or(nominatim::DEFAULT_TIMEOUT),
                }
            }
            raw::GeocodingGateway::Opencage => {
                let api_key = gateway
                    .opencage
                    .and_then(|gw| gw.api_key)
                    .filter(|key| !key.trim().is_empty())
                    .ok_or_else(|| anyhow!("Missing 'opencage' API key"))?;
                log::info!("Use OpenCage gateway");
                GeocodingGateway::OpenCage { api_key }
            }
        };
        let geocoding = Geocoding { gateway, min_delay };

        let raw::Address {
            fields,
            separator,
            suffix,
            key_column,
        } = address.unwrap_or_default();
        let fields = fields
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .map(field_spec)
            .collect::<Result<Vec<_>>>()?;
        if fields.is_empty() {
            return Err(anyhow!("No address fields defined"));
        }
        let address = Address {
            fields,
            separator: separator.unwrap_or_else(|| DEFAULT_SEPARATOR.to_owned()),
            suffix: suffix.filter(|s| !s.trim().is_empty()),
            key_column: key_column.filter(|c| !c.trim().is_empty()),
        };

        let raw::Batch {
            crs,
            fail_fast,
            max_retries,
            retry_backoff,
            max_backoff,
        } = batch.unwrap_or_default();
        let crs = crs.as_deref().map(str::parse::<Crs>).transpose()?.unwrap_or_default();
        let retry = RetryPolicy {
            max_retries: max_retries.unwrap_or_default(),
            backoff: retry_backoff.unwrap_or(DEFAULT_BACKOFF),
            max_backoff: max_backoff.unwrap_or(DEFAULT_MAX_BACKOFF),
        };
        let batch = Batch {
            crs,
            fail_fast: fail_fast.unwrap_or_default(),
            retry,
        };

        Ok(Self {
            geocoding,
            address,
            batch,
        })
    }
}
