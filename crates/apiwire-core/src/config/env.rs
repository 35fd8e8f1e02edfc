use std::env::VarError;
use std::ffi::OsString;

use super::Config;
use crate::error::ConfigError;

pub(crate) const API_URL: &str = "API_URL";
pub(crate) const API_TIMEOUT: &str = "API_TIMEOUT";
pub(crate) const LEGACY_API_URL: &str = "VUE_APP_API_URL";
pub(crate) const LEGACY_API_TIMEOUT: &str = "VUE_APP_API_TIMEOUT";

impl Config {
    /// Overlay `API_URL` and `API_TIMEOUT` (or their `VUE_APP_` names) on top
    /// of the file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidTimeout`] if the timeout is not a whole
    /// number of milliseconds, and [`ConfigError::InvalidBaseUrl`] or
    /// [`ConfigError::InvalidTimeout`] if a variable is set but not valid UTF-8.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        match env_var(API_URL, LEGACY_API_URL) {
            Ok(Some(v)) => self.api.base_url = Some(v),
            Ok(None) => {}
            Err(raw) => {
                return Err(ConfigError::InvalidBaseUrl {
                    value: raw.to_string_lossy().into_owned(),
                    reason: "not valid UTF-8".into(),
                });
            }
        }
        match env_var(API_TIMEOUT, LEGACY_API_TIMEOUT) {
            Ok(Some(v)) => self.api.timeout_ms = Some(parse_timeout_ms(&v)?),
            Ok(None) => {}
            Err(raw) => {
                return Err(ConfigError::InvalidTimeout {
                    value: raw.to_string_lossy().into_owned(),
                });
            }
        }
        Ok(())
    }
}

/// Read `primary`, falling back to `fallback` only when `primary` is absent.
/// A set but non-UTF-8 value is returned as `Err` with the raw contents.
fn env_var(primary: &str, fallback: &str) -> Result<Option<String>, OsString> {
    match std::env::var(primary) {
        Ok(v) => Ok(Some(v)),
        Err(VarError::NotUnicode(raw)) => Err(raw),
        Err(VarError::NotPresent) => match std::env::var(fallback) {
            Ok(v) => {
                tracing::debug!("{primary} not set, using {fallback}");
                Ok(Some(v))
            }
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(raw)) => Err(raw),
        },
    }
}

pub(crate) fn parse_timeout_ms(value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidTimeout {
            value: value.to_owned(),
        })
}
