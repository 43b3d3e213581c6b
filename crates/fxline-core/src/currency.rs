use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Currencies the engine can recognize and convert between.
///
/// GBP is the triangulation base: every other code is priced as
/// "units per one GBP".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    Usd,
    Gbp,
    Eur,
    Chf,
    Btc,
}

impl CurrencyCode {
    /// Dispatch order used when rendering a conversion table.
    pub const ALL: [Self; 5] = [Self::Usd, Self::Gbp, Self::Eur, Self::Chf, Self::Btc];

    pub const BASE: Self = Self::Gbp;

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Gbp => "GBP",
            Self::Eur => "EUR",
            Self::Chf => "CHF",
            Self::Btc => "BTC",
        }
    }

    /// Conventional marker printed in front of an amount.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Usd => "$",
            Self::Gbp => "£",
            Self::Eur => "€",
            Self::Chf => "FS",
            Self::Btc => "BTC",
        }
    }

    pub const fn is_base(self) -> bool {
        matches!(self, Self::Gbp)
    }

    /// Map a marker found in free text to its currency.
    pub fn from_marker(marker: &str) -> Result<Self, ValidationError> {
        match marker {
            "$" | "USD" => Ok(Self::Usd),
            "£" | "GBP" => Ok(Self::Gbp),
            "€" | "EUR" => Ok(Self::Eur),
            "Fr." | "SFr." | "FS" | "CHF" => Ok(Self::Chf),
            "BTC" => Ok(Self::Btc),
            other => Err(ValidationError::UnsupportedCurrency {
                value: other.to_owned(),
            }),
        }
    }
}

impl Display for CurrencyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CurrencyCode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "GBP" => Ok(Self::Gbp),
            "EUR" => Ok(Self::Eur),
            "CHF" => Ok(Self::Chf),
            "BTC" => Ok(Self::Btc),
            _ => Err(ValidationError::UnsupportedCurrency {
                value: value.trim().to_owned(),
            }),
        }
    }
}
