use thiserror::Error;

use crate::convert::ConversionError;
use crate::feeds::RateFetchError;
use crate::transport::TransportError;

/// Validation errors for values entering `fxline-core` from text or configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported currency '{value}', expected one of USD, GBP, EUR, CHF, BTC")]
    UnsupportedCurrency { value: String },
}

/// Failures raised while turning a numeral substring into a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NumeralError {
    #[error("numeral '{input}' does not match the amount grammar")]
    Malformed { input: String },
    #[error("numeral '{input}' contains no digits")]
    NoDigits { input: String },
}

/// Engine configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnv { name: &'static str, value: String },

    #[error("config field '{field}' must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("config field '{field}' cannot be empty")]
    EmptyValue { field: &'static str },
}

/// Any failure surfaced by `fxline-core`, for callers that handle them uniformly.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Numeral(#[from] NumeralError),

    #[error(transparent)]
    RateFetch(#[from] RateFetchError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
