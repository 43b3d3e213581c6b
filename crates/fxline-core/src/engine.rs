use std::sync::Arc;

use crate::cache::{Clock, RateCache, SystemClock};
use crate::config::EngineConfig;
use crate::convert::Converter;
use crate::feeds::{BitPayFeed, CurrencyApiFeed, FeedRouter};
use crate::format::Dispatcher;
use crate::transport::{FeedTransport, ReqwestTransport};
use crate::{ConfigError, CoreError};

/// Fully wired recognition and conversion pipeline.
#[derive(Debug, Clone)]
pub struct Engine {
    rates: Arc<RateCache>,
    dispatcher: Dispatcher,
}

impl Engine {
    /// Build an engine that talks to the configured feeds over HTTP.
    pub fn from_config(config: &EngineConfig) -> Result<Self, CoreError> {
        let transport = ReqwestTransport::new()?;
        Ok(Self::with_transport(
            config,
            Arc::new(transport),
            Arc::new(SystemClock),
        )?)
    }

    pub fn with_transport(
        config: &EngineConfig,
        transport: Arc<dyn FeedTransport>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let fiat = CurrencyApiFeed::new(transport.clone(), &config.currency_api_key)
            .with_base_url(&config.generic_feed_url)
            .with_timeout(config.request_timeout());
        let crypto = BitPayFeed::new(transport)
            .with_base_url(&config.btc_feed_url)
            .with_timeout(config.request_timeout());

        let rates = Arc::new(RateCache::new(
            FeedRouter::new(Arc::new(fiat), Arc::new(crypto)),
            clock,
        ));
        let dispatcher = Dispatcher::new(Converter::new(rates.clone()));

        tracing::debug!(
            generic_feed = %config.generic_feed_url,
            btc_feed = %config.btc_feed_url,
            timeout_ms = config.request_timeout_ms,
            "engine ready"
        );
        Ok(Self { rates, dispatcher })
    }

    pub fn rates(&self) -> &Arc<RateCache> {
        &self.rates
    }

    pub fn converter(&self) -> &Converter {
        self.dispatcher.converter()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}
