use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "https://pcod-healthcare.onrender.com/api";
pub const DEFAULT_ML_BASE_URL: &str = "https://pcod-ml.onrender.com";
pub const DEFAULT_ML_API_KEY: &str = "health-checker";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TYPING_INTERVAL_MS: u64 = 30;

/// Endpoints and timings for the remote services.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    pub api_base_url: Url,
    pub ml_base_url: Url,
    pub ml_api_key: String,
    pub http_timeout: Duration,
    pub typing_interval: Duration,
}

impl ServiceConfig {
    /// Read `PCOD_*` variables, falling back to the hosted defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is set but malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a value is present but malformed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_base_url = parse_url(
            "PCOD_API_BASE_URL",
            read("PCOD_API_BASE_URL").as_deref().unwrap_or(DEFAULT_API_BASE_URL),
        )?;
        let ml_base_url = parse_url(
            "PCOD_ML_BASE_URL",
            read("PCOD_ML_BASE_URL").as_deref().unwrap_or(DEFAULT_ML_BASE_URL),
        )?;
        let ml_api_key = read("PCOD_ML_API_KEY").unwrap_or_else(|| DEFAULT_ML_API_KEY.into());
        let timeout_secs = parse_positive(
            "PCOD_HTTP_TIMEOUT_SECS",
            read("PCOD_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let typing_ms = parse_positive(
            "PCOD_TYPING_INTERVAL_MS",
            read("PCOD_TYPING_INTERVAL_MS"),
            DEFAULT_TYPING_INTERVAL_MS,
        )?;

        Ok(Self {
            api_base_url,
            ml_base_url,
            ml_api_key,
            http_timeout: Duration::from_secs(timeout_secs),
            typing_interval: Duration::from_millis(typing_ms),
        })
    }
}

fn parse_url(var: &'static str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value.trim()).map_err(|_| ConfigError::InvalidUrl {
        var,
        value: value.to_string(),
    })?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var,
            value: value.to_string(),
        });
    }
    Ok(url)
}

fn parse_positive(
    var: &'static str,
    value: Option<String>,
    default: u64,
) -> Result<u64, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value.trim().parse::<u64>() {
        Ok(parsed) if parsed > 0 => Ok(parsed),
        _ => Err(ConfigError::InvalidNumber { var, value }),
    }
}
