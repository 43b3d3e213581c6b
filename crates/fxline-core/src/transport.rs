//! GET-with-timeout transport the rate feeds talk through.
//!
//! Feeds only ever issue a JSON GET and read the status and body back, so the
//! seam is that narrow. Failures keep their category ([`TransportError`]) and
//! travel on as the cause of a `rate.transport` [`RateFetchError`].
//!
//! [`RateFetchError`]: crate::feeds::RateFetchError

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use thiserror::Error;

/// Per-request deadline used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

/// A single rate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedRequest {
    pub url: String,
    pub timeout: Duration,
}

impl FeedRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub status: u16,
    pub body: String,
}

impl FeedResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub const fn is_success(&self) -> bool {
        matches!(self.status, 200..=299)
    }
}

/// Why a lookup never produced a response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP client could not be built: {reason}")]
    Client { reason: String },

    #[error("no answer from {url} within {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u128 },

    #[error("could not connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("body from {url} could not be read: {reason}")]
    Body { url: String, reason: String },
}

pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = Result<FeedResponse, TransportError>> + Send + 'a>>;

/// Outbound side of every rate feed.
pub trait FeedTransport: Send + Sync {
    fn get(&self, request: FeedRequest) -> TransportFuture<'_>;
}

/// Transport backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fxline/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| TransportError::Client {
                reason: error.to_string(),
            })?;
        Ok(Self { client })
    }

    async fn fetch(&self, request: FeedRequest) -> Result<FeedResponse, TransportError> {
        let response = self
            .client
            .get(&request.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(request.timeout)
            .send()
            .await
            .map_err(|error| classify(&request, &error))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| TransportError::Body {
            url: request.url.clone(),
            reason: error.to_string(),
        })?;
        Ok(FeedResponse { status, body })
    }
}

impl FeedTransport for ReqwestTransport {
    fn get(&self, request: FeedRequest) -> TransportFuture<'_> {
        Box::pin(self.fetch(request))
    }
}

fn classify(request: &FeedRequest, error: &reqwest::Error) -> TransportError {
    let url = request.url.clone();
    if error.is_timeout() {
        TransportError::Timeout {
            url,
            timeout_ms: request.timeout.as_millis(),
        }
    } else if error.is_connect() {
        TransportError::Connect {
            url,
            reason: error.to_string(),
        }
    } else {
        TransportError::Request {
            url,
            reason: error.to_string(),
        }
    }
}
