mod env;
mod types;


pub use types::*;

use std::path::Path;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or if
    /// an env override is malformed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?;
            toml::from_str::<Self>(&content)?
        } else {
            tracing::debug!("config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Validate the loaded values into a [`ClientConfig`].
    ///
    /// A missing or empty base URL is rejected here rather than at request time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingBaseUrl`] or [`ConfigError::InvalidBaseUrl`].
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        let raw = self
            .api
            .base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingBaseUrl)?;

        let base_url = parse_base_url(raw)?;
        let mut config = ClientConfig::new(base_url);
        if let Some(ms) = self.api.timeout_ms.filter(|ms| *ms > 0) {
            config = config.with_timeout(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

impl ClientConfig {
    /// Build the client configuration from `API_URL` and `API_TIMEOUT` alone.
    ///
    /// # Errors
    ///
    /// Fails fast when the base URL is unset or invalid, or the timeout is not
    /// numeric.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        config.client_config()
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl {
        value: raw.to_owned(),
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            reason: format!("unsupported scheme {other}"),
        }),
    }
}
