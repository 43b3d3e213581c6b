//! Pull-through cache of GBP-relative exchange rates.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::sync::{Arc, PoisonError};
use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::{Mutex, RwLock};

use crate::feeds::{FeedRouter, RateFetchError};
use crate::CurrencyCode;

/// How long a refreshed rate is served before the next lookup refreshes it.
pub const DEFAULT_RATE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> OffsetDateTime;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<std::sync::Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(std::sync::Mutex::new(start)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cached rate for one currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateEntry {
    /// Units of the currency per one GBP.
    pub rate: f64,
    pub expires_at: OffsetDateTime,
}

impl RateEntry {
    pub fn is_fresh(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// Owns the rate mapping; the only writer of [`RateEntry`] values.
///
/// Refreshes are serialized per currency: concurrent misses for the same code
/// wait on one fetch, while different codes refresh in parallel. A failed
/// refresh leaves any previous entry untouched.
#[derive(Debug)]
pub struct RateCache {
    entries: RwLock<HashMap<CurrencyCode, RateEntry>>,
    refresh_gates: HashMap<CurrencyCode, Mutex<()>>,
    feeds: FeedRouter,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl RateCache {
    pub fn new(feeds: FeedRouter, clock: Arc<dyn Clock>) -> Self {
        let refresh_gates = CurrencyCode::ALL
            .into_iter()
            .filter(|code| !code.is_base())
            .map(|code| (code, Mutex::new(())))
            .collect();

        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_gates,
            feeds,
            clock,
            ttl: DEFAULT_RATE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Units of `code` per one GBP, refreshing from the feed on miss or expiry.
    pub async fn get_rate(&self, code: CurrencyCode) -> Result<f64, RateFetchError> {
        if code.is_base() {
            return Ok(1.0);
        }

        if let Some(rate) = self.fresh_rate(code).await {
            tracing::debug!(%code, rate, "rate cache hit");
            return Ok(rate);
        }

        let gate = self
            .refresh_gates
            .get(&code)
            .ok_or_else(|| RateFetchError::unsupported(code))?;
        let _guard = gate.lock().await;

        // Another caller may have refreshed while we waited for the gate.
        if let Some(rate) = self.fresh_rate(code).await {
            return Ok(rate);
        }

        self.refresh(code).await
    }

    #[tracing::instrument(name = "refresh_rate", skip(self), fields(code = %code))]
    async fn refresh(&self, code: CurrencyCode) -> Result<f64, RateFetchError> {
        let source = self
            .feeds
            .source_for(code)
            .ok_or_else(|| RateFetchError::unsupported(code))?;

        match source.fetch_gbp_rate(code).await {
            Ok(rate) => {
                let expires_at = self.clock.now() + self.ttl;
                self.entries
                    .write()
                    .await
                    .insert(code, RateEntry { rate, expires_at });
                tracing::info!(feed = %source.id(), rate, %expires_at, "rate refreshed");
                Ok(rate)
            }
            Err(error) => {
                tracing::warn!(feed = %source.id(), %error, "rate refresh failed");
                Err(error)
            }
        }
    }

    async fn fresh_rate(&self, code: CurrencyCode) -> Option<f64> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(&code)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.rate)
    }

    /// Copy of every stored entry, fresh or not.
    pub async fn snapshot(&self) -> BTreeMap<CurrencyCode, RateEntry> {
        self.entries
            .read()
            .await
            .iter()
            .map(|(code, entry)| (*code, *entry))
            .collect()
    }

    /// Drop the entry for `code` so the next lookup refreshes it.
    pub async fn invalidate(&self, code: CurrencyCode) {
        self.entries.write().await.remove(&code);
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
