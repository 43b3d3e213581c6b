//! Currency conversion triangulated through GBP.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::cache::RateCache;
use crate::feeds::RateFetchError;
use crate::CurrencyCode;

/// A rate lookup failed while converting between two currencies.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("cannot convert {source_code} to {target_code}: {cause}")]
    RateUnavailable {
        source_code: CurrencyCode,
        target_code: CurrencyCode,
        #[source]
        cause: RateFetchError,
    },
}

impl ConversionError {
    pub fn rate_error(&self) -> &RateFetchError {
        match self {
            Self::RateUnavailable { cause, .. } => cause,
        }
    }
}

/// Amount expressed in `target` after converting from `source`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConversionResult {
    pub source: CurrencyCode,
    pub target: CurrencyCode,
    pub amount: f64,
}

/// Converts amounts between any two supported currencies via the rate cache.
#[derive(Debug, Clone)]
pub struct Converter {
    rates: Arc<RateCache>,
}

impl Converter {
    pub fn new(rates: Arc<RateCache>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &Arc<RateCache> {
        &self.rates
    }

    /// `amount * (1 / rate(source)) * rate(target)`, with rates per one GBP.
    ///
    /// Identical currencies return `amount` without consulting the cache.
    pub async fn convert(
        &self,
        source: CurrencyCode,
        target: CurrencyCode,
        amount: f64,
    ) -> Result<f64, ConversionError> {
        if source == target {
            return Ok(amount);
        }

        let wrap = |cause| ConversionError::RateUnavailable {
            source_code: source,
            target_code: target,
            cause,
        };
        let source_rate = self.rates.get_rate(source).await.map_err(wrap)?;
        let target_rate = self.rates.get_rate(target).await.map_err(wrap)?;

        Ok(amount * (1.0 / source_rate) * target_rate)
    }

    pub async fn convert_result(
        &self,
        source: CurrencyCode,
        target: CurrencyCode,
        amount: f64,
    ) -> Result<ConversionResult, ConversionError> {
        let amount = self.convert(source, target, amount).await?;
        Ok(ConversionResult {
            source,
            target,
            amount,
        })
    }
}
