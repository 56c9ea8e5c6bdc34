//! Probe configuration types.
//!
//! The binary loads [`ProbeConfig`] from environment variables; every field
//! has a default so an empty environment yields a usable configuration.

use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {name}: {value:?}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// The raw value.
        value: String,
    },
}

/// Configuration for the probe sidecar.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Listen address (e.g., "0.0.0.0:8080").
    #[serde(default = "ProbeConfig::default_listen_addr")]
    pub listen_addr: String,

    /// Base URL of the upstream service.
    #[serde(default = "ProbeConfig::default_upstream_url")]
    pub upstream_url: String,

    /// Path on the upstream answering health requests.
    #[serde(default = "ProbeConfig::default_health_path")]
    pub upstream_health_path: String,

    /// Drain window applied on shutdown, in milliseconds.
    #[serde(default = "ProbeConfig::default_drain_delay")]
    pub drain_delay_ms: u64,

    /// Upstream request timeout in seconds.
    #[serde(default = "ProbeConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ProbeConfig {
    fn default_listen_addr() -> String {
        "0.0.0.0:8080".to_string()
    }

    fn default_upstream_url() -> String {
        "http://127.0.0.1:9000".to_string()
    }

    fn default_health_path() -> String {
        "/health".to_string()
    }

    const fn default_drain_delay() -> u64 {
        5_000
    }

    const fn default_request_timeout() -> u64 {
        10
    }

    /// Load configuration from the process environment.
    ///
    /// Reads `LISTEN_ADDR`, `UPSTREAM_URL`, `UPSTREAM_HEALTH_PATH`,
    /// `DRAIN_DELAY_MS` and `REQUEST_TIMEOUT_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVar` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidVar` if a numeric variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            listen_addr: lookup("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            upstream_url: lookup("UPSTREAM_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.upstream_url),
            upstream_health_path: lookup("UPSTREAM_HEALTH_PATH")
                .unwrap_or(defaults.upstream_health_path),
            drain_delay_ms: parse_var(&lookup, "DRAIN_DELAY_MS")?
                .unwrap_or(defaults.drain_delay_ms),
            request_timeout_seconds: parse_var(&lookup, "REQUEST_TIMEOUT_SECONDS")?
                .unwrap_or(defaults.request_timeout_seconds),
        })
    }

    /// Get the drain window as a `Duration`.
    #[must_use]
    pub const fn drain_delay(&self) -> Duration {
        Duration::from_millis(self.drain_delay_ms)
    }

    /// Get the request timeout as a `Duration`.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Full URL of the upstream health endpoint.
    #[must_use]
    pub fn health_url(&self) -> String {
        let path = self.upstream_health_path.trim_start_matches('/');
        format!("{}/{path}", self.upstream_url.trim_end_matches('/'))
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    lookup(name)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidVar { name, value })
        })
        .transpose()
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            listen_addr: Self::default_listen_addr(),
            upstream_url: Self::default_upstream_url(),
            upstream_health_path: Self::default_health_path(),
            drain_delay_ms: Self::default_drain_delay(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}
