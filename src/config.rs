//! Portal client configuration parsed from environment variables.

use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const BASE_URL_VAR: &str = "PORTAL_BASE_URL";
pub const REQUEST_TIMEOUT_VAR: &str = "PORTAL_REQUEST_TIMEOUT_SECS";
pub const CONNECT_TIMEOUT_VAR: &str = "PORTAL_CONNECT_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{0}' (expected http:// or https://)")]
    InvalidBaseUrl(String),
    #[error("invalid value for {var}: '{value}'")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    /// Backend API root, without a trailing slash.
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl PortalConfig {
    /// Build config from process environment variables.
    ///
    /// Optional:
    /// - `PORTAL_BASE_URL`: default `http://127.0.0.1:5000/api`
    /// - `PORTAL_REQUEST_TIMEOUT_SECS`: default 30
    /// - `PORTAL_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let request_timeout_secs =
            parse_secs(REQUEST_TIMEOUT_VAR, lookup(REQUEST_TIMEOUT_VAR), DEFAULT_REQUEST_TIMEOUT_SECS)?;
        let connect_timeout_secs =
            parse_secs(CONNECT_TIMEOUT_VAR, lookup(CONNECT_TIMEOUT_VAR), DEFAULT_CONNECT_TIMEOUT_SECS)?;

        Self { base_url: String::new(), request_timeout_secs, connect_timeout_secs }.with_base_url(&base_url)
    }

    /// Convenience for tests and embedding: lookup from a fixed map.
    ///
    /// # Errors
    ///
    /// Same as [`PortalConfig::from_lookup`].
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Replace the base URL, normalizing away trailing slashes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] unless the URL is `http(s)://<host>...`.
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    /// Join an endpoint path (leading slash optional) onto the base URL.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .ok_or_else(|| ConfigError::InvalidBaseUrl(raw.to_owned()))?;
    if host.is_empty() {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn parse_secs(var: &'static str, raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(secs),
        _ => Err(ConfigError::InvalidNumber { var, value: raw }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
