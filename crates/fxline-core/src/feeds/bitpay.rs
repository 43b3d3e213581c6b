use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::{checked_rate, FeedId, RateFetchError, RateFuture, RateSource};
use crate::transport::{FeedRequest, FeedTransport, DEFAULT_TIMEOUT};
use crate::CurrencyCode;

pub const DEFAULT_BASE_URL: &str = "https://bitpay.com";

/// Dedicated BTC feed.
///
/// BitPay quotes GBP per BTC; the feed inverts it to BTC per GBP so it lines
/// up with the other per-GBP rates.
#[derive(Clone)]
pub struct BitPayFeed {
    transport: Arc<dyn FeedTransport>,
    base_url: String,
    timeout: Duration,
}

impl BitPayFeed {
    pub fn new(transport: Arc<dyn FeedTransport>) -> Self {
        Self {
            transport,
            base_url: String::from(DEFAULT_BASE_URL),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch(&self, code: CurrencyCode) -> Result<f64, RateFetchError> {
        if code != CurrencyCode::Btc {
            return Err(RateFetchError::unsupported(code));
        }

        let endpoint = format!("{}/api/rates/GBP", self.base_url.trim_end_matches('/'));
        let response = self
            .transport
            .get(FeedRequest::new(endpoint, self.timeout))
            .await
            .map_err(|cause| RateFetchError::transport(code, self.id(), cause))?;

        if !response.is_success() {
            return Err(RateFetchError::status(code, self.id(), response.status));
        }

        let quote: PoundsPerCoin = serde_json::from_str(&response.body).map_err(|e| {
            RateFetchError::decode(code, format!("unreadable {} quote: {e}", self.id()))
        })?;
        if !quote.code.eq_ignore_ascii_case("GBP") {
            return Err(RateFetchError::decode(
                code,
                format!("{} quoted '{}' instead of GBP", self.id(), quote.code),
            ));
        }

        let gbp_per_btc = checked_rate(code, self.id(), quote.rate)?;
        Ok(1.0 / gbp_per_btc)
    }
}

impl RateSource for BitPayFeed {
    fn id(&self) -> FeedId {
        FeedId::BitPay
    }

    fn fetch_gbp_rate(&self, code: CurrencyCode) -> RateFuture<'_> {
        Box::pin(self.fetch(code))
    }
}

#[derive(Debug, Deserialize)]
struct PoundsPerCoin {
    code: String,
    rate: f64,
}
