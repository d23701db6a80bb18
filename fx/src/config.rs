//! Rate service configuration.

use std::time::Duration;

/// Configuration for the HTTP rate service.
#[derive(Debug, Clone)]
pub struct RateServiceConfig {
    /// Base URL of the service; the `latest` endpoint is resolved against it.
    pub base_url: String,
    /// Access key sent as the `access_key` query parameter.
    pub access_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for RateServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://data.fixer.io/api/".to_string(),
            access_key: String::new(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl RateServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("FX_BASE_URL") {
            config.base_url = url;
        }

        if let Ok(key) = std::env::var("FX_ACCESS_KEY") {
            config.access_key = key;
        }

        if let Ok(secs) = std::env::var("FX_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        config
    }

    /// Full URL of the `latest` endpoint, without query parameters.
    pub fn latest_url(&self) -> String {
        format!("{}/latest", self.base_url.trim_end_matches('/'))
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("Rate service URL cannot be empty".to_string());
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("Rate service URL must be http(s): {}", self.base_url));
        }

        if self.request_timeout.is_zero() {
            return Err("Request timeout cannot be zero".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateServiceConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.latest_url(), "http://data.fixer.io/api/latest");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = RateServiceConfig::default();
        config.base_url = "ftp://rates".to_string();
        assert!(config.validate().is_err());

        let mut config = RateServiceConfig::default();
        config.request_timeout = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_latest_url_without_trailing_slash() {
        let config = RateServiceConfig {
            base_url: "https://rates.example".to_string(),
            ..Default::default()
        };
        assert_eq!(config.latest_url(), "https://rates.example/latest");
    }
}
