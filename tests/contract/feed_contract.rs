use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fxline_core::{
    BitPayFeed, CurrencyApiFeed, CurrencyCode, Engine, EngineConfig, FeedId, FeedRequest,
    FeedResponse, FeedTransport, ManualClock, RateFetchErrorKind, RateSource, TransportError,
    TransportFuture,
};
use time::OffsetDateTime;

/// In-memory transport answering by exact URL; unknown URLs fail to connect.
#[derive(Default)]
struct ScriptedTransport {
    routes: HashMap<String, Result<FeedResponse, TransportError>>,
    seen: Mutex<Vec<FeedRequest>>,
}

impl ScriptedTransport {
    fn route(mut self, url: &str, status: u16, body: &str) -> Self {
        let response = FeedResponse {
            status,
            body: body.to_owned(),
        };
        self.routes.insert(url.to_owned(), Ok(response));
        self
    }

    fn time_out(mut self, url: &str) -> Self {
        let error = TransportError::Timeout {
            url: url.to_owned(),
            timeout_ms: 5_000,
        };
        self.routes.insert(url.to_owned(), Err(error));
        self
    }

    fn seen(&self) -> Vec<FeedRequest> {
        self.seen.lock().expect("seen lock").clone()
    }
}

impl FeedTransport for ScriptedTransport {
    fn get(&self, request: FeedRequest) -> TransportFuture<'_> {
        let outcome = self.routes.get(&request.url).cloned().unwrap_or_else(|| {
            Err(TransportError::Connect {
                url: request.url.clone(),
                reason: String::from("no route"),
            })
        });
        self.seen.lock().expect("seen lock").push(request);
        Box::pin(async move { outcome })
    }
}

const FIAT: &str = "http://fiat.test";
const CRYPTO: &str = "http://crypto.test";

fn fiat_feed(transport: Arc<ScriptedTransport>) -> CurrencyApiFeed {
    CurrencyApiFeed::new(transport, "secret").with_base_url(FIAT)
}

fn btc_feed(transport: Arc<ScriptedTransport>) -> BitPayFeed {
    BitPayFeed::new(transport).with_base_url(CRYPTO)
}

#[tokio::test]
async fn generic_feed_requests_gbp_based_rate_with_key_and_deadline() {
    let transport = Arc::new(ScriptedTransport::default().route(
        "http://fiat.test/api/GBP/CHF.json?key=secret",
        200,
        r#"{"success":true,"source":"GBP","target":"CHF","rate":1.12}"#,
    ));
    let feed = fiat_feed(transport.clone()).with_timeout(Duration::from_millis(750));

    assert_eq!(feed.id(), FeedId::CurrencyApi);
    assert_eq!(feed.fetch_gbp_rate(CurrencyCode::Chf).await, Ok(1.12));
    assert_eq!(
        transport.seen(),
        vec![FeedRequest::new(
            "http://fiat.test/api/GBP/CHF.json?key=secret",
            Duration::from_millis(750),
        )]
    );
}

#[tokio::test]
async fn btc_feed_inverts_pounds_per_bitcoin() {
    let transport = Arc::new(ScriptedTransport::default().route(
        "http://crypto.test/api/rates/GBP",
        200,
        r#"{"code":"GBP","name":"British Pound Sterling","rate":20000}"#,
    ));
    let feed = btc_feed(transport);

    assert_eq!(feed.id(), FeedId::BitPay);
    let rate = feed.fetch_gbp_rate(CurrencyCode::Btc).await.expect("rate");
    assert!((rate - 0.00005).abs() < 1e-15);
}

#[tokio::test]
async fn each_feed_refuses_codes_it_does_not_serve() {
    let transport = Arc::new(ScriptedTransport::default());

    for code in [CurrencyCode::Gbp, CurrencyCode::Btc] {
        let error = fiat_feed(transport.clone())
            .fetch_gbp_rate(code)
            .await
            .expect_err("fiat feed does not serve this code");
        assert_eq!(error.kind(), RateFetchErrorKind::Unsupported);
    }
    for code in [CurrencyCode::Usd, CurrencyCode::Gbp] {
        let error = btc_feed(transport.clone())
            .fetch_gbp_rate(code)
            .await
            .expect_err("btc feed only serves BTC");
        assert_eq!(error.kind(), RateFetchErrorKind::Unsupported);
    }

    assert!(transport.seen().is_empty());
}

#[tokio::test]
async fn upstream_failures_map_to_error_kinds() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .route(
                "http://fiat.test/api/GBP/USD.json?key=secret",
                502,
                "bad gateway",
            )
            .route("http://fiat.test/api/GBP/EUR.json?key=secret", 200, "<html>")
            .route(
                "http://fiat.test/api/GBP/CHF.json?key=secret",
                200,
                r#"{"success":true,"rate":-1.0}"#,
            )
            .route(
                "http://crypto.test/api/rates/GBP",
                200,
                r#"{"code":"GBP","rate":0}"#,
            ),
    );
    let fiat = fiat_feed(transport.clone());

    let cases = [
        (
            fiat.fetch_gbp_rate(CurrencyCode::Usd).await,
            RateFetchErrorKind::Status,
            "rate.status",
        ),
        (
            fiat.fetch_gbp_rate(CurrencyCode::Eur).await,
            RateFetchErrorKind::Decode,
            "rate.decode",
        ),
        (
            fiat.fetch_gbp_rate(CurrencyCode::Chf).await,
            RateFetchErrorKind::InvalidRate,
            "rate.invalid_rate",
        ),
        (
            btc_feed(transport).fetch_gbp_rate(CurrencyCode::Btc).await,
            RateFetchErrorKind::InvalidRate,
            "rate.invalid_rate",
        ),
    ];

    for (outcome, kind, code) in cases {
        let error = outcome.expect_err("upstream failure");
        assert_eq!(error.kind(), kind, "{error}");
        assert_eq!(error.error_code(), code);
        assert!(error.transport_cause().is_none());
    }
}

#[tokio::test]
async fn transport_failures_keep_their_category() {
    let transport = Arc::new(ScriptedTransport::default().time_out(
        "http://crypto.test/api/rates/GBP",
    ));

    let refused = fiat_feed(transport.clone())
        .fetch_gbp_rate(CurrencyCode::Usd)
        .await
        .expect_err("no route");
    assert_eq!(refused.kind(), RateFetchErrorKind::Transport);
    assert_eq!(refused.currency(), CurrencyCode::Usd);
    assert!(matches!(
        refused.transport_cause(),
        Some(TransportError::Connect { .. })
    ));

    let timed_out = btc_feed(transport)
        .fetch_gbp_rate(CurrencyCode::Btc)
        .await
        .expect_err("deadline passed");
    assert_eq!(timed_out.kind(), RateFetchErrorKind::Transport);
    assert!(matches!(
        timed_out.transport_cause(),
        Some(TransportError::Timeout { .. })
    ));
}

#[tokio::test]
async fn engine_wires_configured_feeds_into_replies() {
    let transport = Arc::new(
        ScriptedTransport::default()
            .route(
                "http://fiat.test/api/GBP/USD.json?key=secret",
                200,
                r#"{"success":true,"rate":1.25}"#,
            )
            .route(
                "http://fiat.test/api/GBP/EUR.json?key=secret",
                200,
                r#"{"success":true,"rate":1.15}"#,
            )
            .route(
                "http://fiat.test/api/GBP/CHF.json?key=secret",
                200,
                r#"{"success":true,"rate":1.1}"#,
            )
            .route(
                "http://crypto.test/api/rates/GBP",
                200,
                r#"{"code":"GBP","rate":20000}"#,
            ),
    );
    let config = EngineConfig {
        currency_api_key: String::from("secret"),
        generic_feed_url: String::from(FIAT),
        btc_feed_url: String::from(CRYPTO),
        request_timeout_ms: 1_500,
        ..EngineConfig::default()
    };
    let engine = Engine::with_transport(
        &config,
        transport.clone(),
        Arc::new(ManualClock::new(OffsetDateTime::UNIX_EPOCH)),
    )
    .expect("engine");

    let replies = engine.dispatcher().replies("£10 and again £10").await;

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0], replies[1]);
    assert_eq!(
        replies[0],
        "$ 12.50\t|\t£ 10.00\t|\t€ 11.50\t|\tFS 11.00\t|\tBTC 5.000000E-4"
    );

    let seen = transport.seen();
    assert_eq!(seen.len(), 4, "second token is served from cache");
    assert!(seen
        .iter()
        .all(|request| request.timeout == Duration::from_millis(1_500)));
}
