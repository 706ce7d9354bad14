//! Runtime settings.
//!
//! Everything is read from the environment; unset variables fall back to
//! defaults that talk to the public API without a key.

use std::time::Duration;

use crate::api::ApiConfig;
use crate::session::DEFAULT_CLOSE_TIMEOUT;

pub const ENV_API_URL: &str = "TIMETABLE_API_URL";
pub const ENV_API_KEY: &str = "TIMETABLE_API_KEY";
pub const ENV_ABOUT_URL: &str = "TIMETABLE_ABOUT_URL";
pub const ENV_TIMEOUT_SECS: &str = "TIMETABLE_TIMEOUT_SECS";
pub const ENV_CLOSE_TIMEOUT_MS: &str = "TIMETABLE_CLOSE_TIMEOUT_MS";

/// Errors from reading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a whole number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

/// Application settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Timetable API client configuration
    pub api: ApiConfig,
    /// Bound on closing a fetch session
    pub close_timeout: Duration,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its
    /// value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let mut api = ApiConfig::new();
        if let Some(url) = get(ENV_API_URL) {
            api = api.with_base_url(url.trim());
        }
        if let Some(key) = get(ENV_API_KEY) {
            api = api.with_api_key(key.trim());
        }
        if let Some(url) = get(ENV_ABOUT_URL) {
            api = api.with_about_url(url.trim());
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            api = api.with_timeout(parse_number(ENV_TIMEOUT_SECS, &secs)?);
        }

        let close_timeout = match get(ENV_CLOSE_TIMEOUT_MS) {
            Some(ms) => Duration::from_millis(parse_number(ENV_CLOSE_TIMEOUT_MS, &ms)?),
            None => DEFAULT_CLOSE_TIMEOUT,
        };

        Ok(Self { api, close_timeout })
    }
}

fn parse_number(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        })
}
