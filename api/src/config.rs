//! Environment-driven configuration

use std::time::Duration;

use pestaway_sessions::GatewayConfig;
use thiserror::Error;

/// Default per-request timeout for backend calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration could not be read from the environment
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required variable is absent
    #[error("Missing environment variable: {0}")]
    MissingVar(String),

    /// A variable is present but unusable
    #[error("Invalid value for {name}: {value}")]
    InvalidVar {
        /// Variable name
        name: String,
        /// Rejected value
        value: String,
    },
}

/// REST client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl ApiConfig {
    /// Create a configuration with the default timeout
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the per-request timeout
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Read configuration from the process environment
    ///
    /// `PESTAWAY_API_URL` is required; `PESTAWAY_REQUEST_TIMEOUT_SECS` is
    /// optional and defaults to 30 seconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] or [`ConfigError::InvalidVar`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through a variable lookup function
    ///
    /// Split out from [`ApiConfig::from_env`] so tests can supply
    /// variables without touching the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingVar`] or [`ConfigError::InvalidVar`].
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let base_url = lookup("PESTAWAY_API_URL")
            .ok_or_else(|| ConfigError::MissingVar("PESTAWAY_API_URL".to_owned()))?;
        let mut config = Self::new(base_url);
        if let Some(raw) = lookup("PESTAWAY_REQUEST_TIMEOUT_SECS") {
            let seconds = raw.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                name: "PESTAWAY_REQUEST_TIMEOUT_SECS".to_owned(),
                value: raw,
            })?;
            config.request_timeout = Duration::from_secs(seconds);
        }
        Ok(config)
    }
}

/// Read the gateway configuration from the process environment
///
/// A missing `RAZORPAY_KEY` does not fail here: sessions surface it as a
/// configuration error at payment initiation, which keeps browsing usable
/// on a misconfigured deployment.
#[must_use]
pub fn gateway_config_from_env() -> GatewayConfig {
    gateway_config_from_lookup(|name| std::env::var(name).ok())
}

/// Gateway configuration through a variable lookup function
#[must_use]
pub fn gateway_config_from_lookup(
    lookup: impl Fn(&str) -> Option<String>,
) -> GatewayConfig {
    match lookup("RAZORPAY_KEY") {
        Some(key) if !key.trim().is_empty() => GatewayConfig::new(key),
        _ => {
            tracing::warn!("RAZORPAY_KEY not set; payments will be rejected at initiation");
            GatewayConfig::unconfigured()
        },
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reads_url_and_timeout() {
        let config = ApiConfig::from_lookup(|name| match name {
            "PESTAWAY_API_URL" => Some("https://api.pestaway.example/".to_owned()),
            "PESTAWAY_REQUEST_TIMEOUT_SECS" => Some("10".to_owned()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_url, "https://api.pestaway.example");
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn timeout_defaults_to_thirty_seconds() {
        let config = ApiConfig::from_lookup(|name| {
            (name == "PESTAWAY_API_URL").then(|| "http://localhost:8000".to_owned())
        })
        .unwrap();
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn missing_url_is_an_error() {
        assert_eq!(
            ApiConfig::from_lookup(|_| None),
            Err(ConfigError::MissingVar("PESTAWAY_API_URL".to_owned()))
        );
    }

    #[test]
    fn bad_timeout_is_an_error() {
        let result = ApiConfig::from_lookup(|name| match name {
            "PESTAWAY_API_URL" => Some("http://localhost:8000".to_owned()),
            "PESTAWAY_REQUEST_TIMEOUT_SECS" => Some("soon".to_owned()),
            _ => None,
        });
        assert!(matches!(result, Err(ConfigError::InvalidVar { .. })));
    }

    #[test]
    fn missing_gateway_key_yields_unconfigured() {
        let config = gateway_config_from_lookup(|_| None);
        assert!(config.key.is_none());

        let config = gateway_config_from_lookup(|name| {
            (name == "RAZORPAY_KEY").then(|| "rzp_live_abc".to_owned())
        });
        assert_eq!(config.key.as_deref(), Some("rzp_live_abc"));
    }
}
