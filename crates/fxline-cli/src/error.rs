use fxline_core::{
    ConfigError, ConversionError, CoreError, NumeralError, RateFetchError, ValidationError,
};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("worker task failed: {0}")]
    Task(String),
}

macro_rules! from_core_error {
    ($($source:ty),+ $(,)?) => {
        $(
            impl From<$source> for CliError {
                fn from(error: $source) -> Self {
                    Self::Core(CoreError::from(error))
                }
            }
        )+
    };
}

from_core_error!(
    ValidationError,
    NumeralError,
    ConfigError,
    ConversionError,
    RateFetchError,
);

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Core(CoreError::Validation(_) | CoreError::Numeral(_)) => 2,
            Self::Core(
                CoreError::Conversion(_) | CoreError::RateFetch(_) | CoreError::Transport(_),
            ) => 3,
            Self::Core(CoreError::Config(_)) => 4,
            Self::Io(_) => 10,
            Self::Serialization(_) | Self::Task(_) => 1,
        }
    }
}
