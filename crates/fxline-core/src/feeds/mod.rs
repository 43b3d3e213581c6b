//! External exchange-rate feeds.
//!
//! Every feed answers the same question: how many units of `code` buy one GBP.
//!
//! | Feed | Codes | Upstream shape |
//! |------|-------|----------------|
//! | [`CurrencyApiFeed`] | USD, EUR, CHF | `{success, rate, message}`, already per-GBP |
//! | [`BitPayFeed`] | BTC | `{code, name, rate}` in GBP per BTC, inverted here |

pub mod bitpay;
pub mod currency_api;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::transport::TransportError;
use crate::CurrencyCode;

pub use bitpay::BitPayFeed;
pub use currency_api::CurrencyApiFeed;

/// Identifier of an upstream rate provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedId {
    CurrencyApi,
    BitPay,
}

impl FeedId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CurrencyApi => "currency_api",
            Self::BitPay => "bitpay",
        }
    }
}

impl Display for FeedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a failed rate lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateFetchErrorKind {
    /// No feed serves the code.
    Unsupported,
    /// Network or I/O failure before a response arrived.
    Transport,
    /// Upstream answered with a non-2xx status.
    Status,
    /// Body could not be decoded.
    Decode,
    /// Upstream reported failure in its own payload.
    Provider,
    /// Upstream returned zero, negative or non-finite rate.
    InvalidRate,
}

/// Structured rate lookup failure.
///
/// Transport failures keep the [`TransportError`] as their `source()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateFetchError {
    kind: RateFetchErrorKind,
    code: CurrencyCode,
    message: String,
    cause: Option<TransportError>,
}

impl RateFetchError {
    pub fn unsupported(code: CurrencyCode) -> Self {
        Self {
            kind: RateFetchErrorKind::Unsupported,
            code,
            message: format!("no rate feed serves {code}"),
            cause: None,
        }
    }

    pub fn transport(code: CurrencyCode, feed: FeedId, cause: TransportError) -> Self {
        Self {
            kind: RateFetchErrorKind::Transport,
            code,
            message: format!("{feed} unreachable: {cause}"),
            cause: Some(cause),
        }
    }

    pub fn status(code: CurrencyCode, feed: FeedId, status: u16) -> Self {
        Self::new(
            RateFetchErrorKind::Status,
            code,
            format!("{feed} returned status {status}"),
        )
    }

    pub fn decode(code: CurrencyCode, message: impl Into<String>) -> Self {
        Self::new(RateFetchErrorKind::Decode, code, message)
    }

    pub fn provider(code: CurrencyCode, message: impl Into<String>) -> Self {
        Self::new(RateFetchErrorKind::Provider, code, message)
    }

    pub fn invalid_rate(code: CurrencyCode, feed: FeedId, rate: f64) -> Self {
        Self::new(
            RateFetchErrorKind::InvalidRate,
            code,
            format!("{feed} returned unusable rate {rate}"),
        )
    }

    fn new(kind: RateFetchErrorKind, code: CurrencyCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub const fn kind(&self) -> RateFetchErrorKind {
        self.kind
    }

    pub const fn currency(&self) -> CurrencyCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transport_cause(&self) -> Option<&TransportError> {
        self.cause.as_ref()
    }

    pub const fn error_code(&self) -> &'static str {
        match self.kind {
            RateFetchErrorKind::Unsupported => "rate.unsupported",
            RateFetchErrorKind::Transport => "rate.transport",
            RateFetchErrorKind::Status => "rate.status",
            RateFetchErrorKind::Decode => "rate.decode",
            RateFetchErrorKind::Provider => "rate.provider",
            RateFetchErrorKind::InvalidRate => "rate.invalid_rate",
        }
    }
}

impl Display for RateFetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "rate lookup for {} failed: {} ({})",
            self.code,
            self.message,
            self.error_code()
        )
    }
}

impl std::error::Error for RateFetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| cause as &(dyn std::error::Error + 'static))
    }
}

/// Boxed future returned by [`RateSource::fetch_gbp_rate`].
pub type RateFuture<'a> = Pin<Box<dyn Future<Output = Result<f64, RateFetchError>> + Send + 'a>>;

/// Upstream provider of GBP-relative rates.
pub trait RateSource: Send + Sync {
    fn id(&self) -> FeedId;

    /// Fetch units of `code` per one GBP.
    fn fetch_gbp_rate(&self, code: CurrencyCode) -> RateFuture<'_>;
}

/// Picks the feed responsible for each currency.
#[derive(Clone)]
pub struct FeedRouter {
    fiat: Arc<dyn RateSource>,
    crypto: Arc<dyn RateSource>,
}

impl FeedRouter {
    pub fn new(fiat: Arc<dyn RateSource>, crypto: Arc<dyn RateSource>) -> Self {
        Self { fiat, crypto }
    }

    /// Feed for `code`; `None` for the GBP base, which needs no lookup.
    pub fn source_for(&self, code: CurrencyCode) -> Option<&dyn RateSource> {
        match code {
            CurrencyCode::Gbp => None,
            CurrencyCode::Usd | CurrencyCode::Eur | CurrencyCode::Chf => Some(self.fiat.as_ref()),
            CurrencyCode::Btc => Some(self.crypto.as_ref()),
        }
    }
}

impl std::fmt::Debug for FeedRouter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedRouter")
            .field("fiat", &self.fiat.id())
            .field("crypto", &self.crypto.id())
            .finish()
    }
}

/// Shared acceptance check for upstream rates.
fn checked_rate(code: CurrencyCode, feed: FeedId, rate: f64) -> Result<f64, RateFetchError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(RateFetchError::invalid_rate(code, feed, rate))
    }
}
