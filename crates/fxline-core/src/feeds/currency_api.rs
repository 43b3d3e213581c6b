use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use super::{checked_rate, FeedId, RateFetchError, RateFuture, RateSource};
use crate::transport::{FeedRequest, FeedTransport, DEFAULT_TIMEOUT};
use crate::CurrencyCode;

pub const DEFAULT_BASE_URL: &str = "http://currency-api.appspot.com";

/// Generic GBP-base multi-currency feed serving USD, EUR and CHF.
#[derive(Clone)]
pub struct CurrencyApiFeed {
    transport: Arc<dyn FeedTransport>,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl CurrencyApiFeed {
    pub fn new(transport: Arc<dyn FeedTransport>, api_key: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: String::from(DEFAULT_BASE_URL),
            api_key: api_key.into(),
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

    fn endpoint(&self, code: CurrencyCode) -> String {
        format!(
            "{}/api/GBP/{}.json?key={}",
            self.base_url.trim_end_matches('/'),
            code.as_str(),
            urlencoding::encode(&self.api_key)
        )
    }

    async fn fetch(&self, code: CurrencyCode) -> Result<f64, RateFetchError> {
        if !matches!(code, CurrencyCode::Usd | CurrencyCode::Eur | CurrencyCode::Chf) {
            return Err(RateFetchError::unsupported(code));
        }

        let response = self
            .transport
            .get(FeedRequest::new(self.endpoint(code), self.timeout))
            .await
            .map_err(|cause| RateFetchError::transport(code, self.id(), cause))?;

        if !response.is_success() {
            return Err(RateFetchError::status(code, self.id(), response.status));
        }

        let payload: QuotePayload = serde_json::from_str(&response.body).map_err(|e| {
            RateFetchError::decode(code, format!("unreadable {} quote: {e}", self.id()))
        })?;

        if !payload.success {
            let reason = payload
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("{} reported failure without a message", self.id()));
            return Err(RateFetchError::provider(code, reason));
        }

        let rate = payload
            .rate
            .ok_or_else(|| RateFetchError::decode(code, "quote has success=true but no rate"))?;
        checked_rate(code, self.id(), rate)
    }
}

impl RateSource for CurrencyApiFeed {
    fn id(&self) -> FeedId {
        FeedId::CurrencyApi
    }

    fn fetch_gbp_rate(&self, code: CurrencyCode) -> RateFuture<'_> {
        Box::pin(self.fetch(code))
    }
}

/// `{success, source, target, rate, message}`; only the fields we act on.
#[derive(Debug, Deserialize)]
struct QuotePayload {
    success: bool,
    #[serde(default)]
    rate: Option<f64>,
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeds::RateFetchErrorKind;
    use crate::transport::scripted::ScriptedTransport;
    use crate::transport::TransportError;

    const USD_URL: &str = "https://rates.test/api/GBP/USD.json?key=k%20y";

    fn feed(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, CurrencyApiFeed) {
        let transport = Arc::new(transport);
        let feed =
            CurrencyApiFeed::new(transport.clone(), "k y").with_base_url("https://rates.test/");
        (transport, feed)
    }

    #[tokio::test]
    async fn returns_rate_from_successful_payload() {
        let (transport, feed) = feed(ScriptedTransport::default().respond(
            USD_URL,
            200,
            r#"{"success":true,"source":"GBP","target":"USD","rate":1.27,"message":""}"#,
        ));

        let rate = feed
            .with_timeout(Duration::from_millis(750))
            .fetch_gbp_rate(CurrencyCode::Usd)
            .await
            .expect("rate should parse");

        assert_eq!(rate, 1.27);
        assert_eq!(
            transport.seen(),
            vec![FeedRequest::new(USD_URL, Duration::from_millis(750))]
        );
    }

    #[tokio::test]
    async fn provider_failure_carries_upstream_message() {
        let (_, feed) = feed(ScriptedTransport::default().respond(
            "https://rates.test/api/GBP/EUR.json?key=k%20y",
            200,
            r#"{"success":false,"message":"Invalid API key"}"#,
        ));

        let err = feed
            .fetch_gbp_rate(CurrencyCode::Eur)
            .await
            .expect_err("provider failure");

        assert_eq!(err.kind(), RateFetchErrorKind::Provider);
        assert_eq!(err.message(), "Invalid API key");
        assert_eq!(err.currency(), CurrencyCode::Eur);
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (_, feed) = feed(ScriptedTransport::default().respond(
            "https://rates.test/api/GBP/CHF.json?key=k%20y",
            503,
            "unavailable",
        ));

        let err = feed
            .fetch_gbp_rate(CurrencyCode::Chf)
            .await
            .expect_err("status failure");
        assert_eq!(err.kind(), RateFetchErrorKind::Status);
        assert!(err.message().contains("503"));
    }

    #[tokio::test]
    async fn transport_failure_is_kept_as_cause() {
        let refused = TransportError::Connect {
            url: String::from(USD_URL),
            reason: String::from("connection refused"),
        };
        let (_, feed) = feed(ScriptedTransport::default().fail(USD_URL, refused.clone()));

        let err = feed
            .fetch_gbp_rate(CurrencyCode::Usd)
            .await
            .expect_err("transport failure");

        assert_eq!(err.kind(), RateFetchErrorKind::Transport);
        assert_eq!(err.transport_cause(), Some(&refused));
    }

    #[tokio::test]
    async fn html_body_is_a_decode_failure() {
        let (_, feed) = feed(ScriptedTransport::default().respond(USD_URL, 200, "<html>"));

        let err = feed
            .fetch_gbp_rate(CurrencyCode::Usd)
            .await
            .expect_err("decode failure");
        assert_eq!(err.kind(), RateFetchErrorKind::Decode);
    }

    #[tokio::test]
    async fn does_not_serve_btc() {
        let (transport, feed) = feed(ScriptedTransport::default());

        let err = feed
            .fetch_gbp_rate(CurrencyCode::Btc)
            .await
            .expect_err("unsupported");
        assert_eq!(err.kind(), RateFetchErrorKind::Unsupported);
        assert!(transport.seen().is_empty());
    }
}
