//! Engine configuration: JSON file first, environment overrides second.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feeds::{bitpay, currency_api};
use crate::ConfigError;

pub const ENV_CURRENCY_API_KEY: &str = "FXLINE_CURRENCY_API_KEY";
pub const ENV_GENERIC_FEED_URL: &str = "FXLINE_GENERIC_FEED_URL";
pub const ENV_BTC_FEED_URL: &str = "FXLINE_BTC_FEED_URL";
pub const ENV_TIMEOUT_MS: &str = "FXLINE_TIMEOUT_MS";

/// Feed endpoints, credentials and the per-request deadline.
///
/// The rate lifetime is not configurable; every refreshed rate is served for
/// [`DEFAULT_RATE_TTL`](crate::cache::DEFAULT_RATE_TTL).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Key for the generic currency feed. Also read from a bot-style `CurrencyApiKey` field.
    #[serde(alias = "CurrencyApiKey")]
    pub currency_api_key: String,
    pub generic_feed_url: String,
    pub btc_feed_url: String,
    pub request_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency_api_key: String::new(),
            generic_feed_url: String::from(currency_api::DEFAULT_BASE_URL),
            btc_feed_url: String::from(bitpay::DEFAULT_BASE_URL),
            request_timeout_ms: 5_000,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// Overlay `FXLINE_*` environment variables.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    pub fn apply_env_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(value) = lookup(ENV_CURRENCY_API_KEY) {
            self.currency_api_key = value;
        }
        if let Some(value) = lookup(ENV_GENERIC_FEED_URL) {
            self.generic_feed_url = value;
        }
        if let Some(value) = lookup(ENV_BTC_FEED_URL) {
            self.btc_feed_url = value;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.request_timeout_ms = parse_env_u64(ENV_TIMEOUT_MS, value)?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::ZeroValue {
                field: "request_timeout_ms",
            });
        }
        if self.generic_feed_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                field: "generic_feed_url",
            });
        }
        if self.btc_feed_url.trim().is_empty() {
            return Err(ConfigError::EmptyValue {
                field: "btc_feed_url",
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse_env_u64(name: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_point_at_public_feeds() {
        let config = EngineConfig::default();
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
        assert_eq!(config.generic_feed_url, "http://currency-api.appspot.com");
        assert_eq!(config.btc_feed_url, "https://bitpay.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn reads_bot_style_config_file_and_ignores_unrelated_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r##"{{"CurrencyApiKey":"abc123","Server":"irc.example.net:6697","Nick":"bot","Channel":"#money"}}"##
        )
        .expect("write config");

        let config = EngineConfig::from_json_file(file.path()).expect("config should load");

        assert_eq!(config.currency_api_key, "abc123");
        assert_eq!(config.request_timeout_ms, 5_000);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::from_json_file("/nonexistent/fxline.json").expect_err("must fail");
        assert!(matches!(err, ConfigError::Read { ref path, .. } if path.contains("fxline.json")));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "{{not json").expect("write config");

        let err = EngineConfig::from_json_file(file.path()).expect_err("must fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_CURRENCY_API_KEY, "from-env"),
            (ENV_TIMEOUT_MS, "750"),
            (ENV_BTC_FEED_URL, "http://localhost:9000"),
        ]);

        let config = EngineConfig::default()
            .apply_env_from(|name| env.get(name).map(|value| value.to_string()))
            .expect("env should apply");

        assert_eq!(config.currency_api_key, "from-env");
        assert_eq!(config.request_timeout(), Duration::from_millis(750));
        assert_eq!(config.btc_feed_url, "http://localhost:9000");
        assert_eq!(config.generic_feed_url, "http://currency-api.appspot.com");
    }

    #[test]
    fn non_numeric_env_value_is_rejected() {
        let err = EngineConfig::default()
            .apply_env_from(|name| (name == ENV_TIMEOUT_MS).then(|| String::from("soon")))
            .expect_err("must fail");
        assert!(matches!(
            err,
            ConfigError::InvalidEnv { name: ENV_TIMEOUT_MS, .. }
        ));
    }

    #[test]
    fn validate_rejects_zero_timeout_and_empty_urls() {
        let config = EngineConfig {
            request_timeout_ms: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroValue {
                field: "request_timeout_ms"
            })
        ));

        let config = EngineConfig {
            generic_feed_url: String::from("  "),
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyValue { field: "generic_feed_url" })
        ));
    }

    #[test]
    fn rate_lifetime_is_not_read_from_file_or_environment() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"rate_ttl_secs":60}"#).expect("unknown fields are ignored");
        assert_eq!(config, EngineConfig::default());

        let config = EngineConfig::default()
            .apply_env_from(|name| (name == "FXLINE_RATE_TTL_SECS").then(|| String::from("60")))
            .expect("unrelated variable is ignored");
        assert_eq!(config, EngineConfig::default());
    }
}
