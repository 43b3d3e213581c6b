//! # fxline Core
//!
//! Recognizes currency-tagged amounts in free-form text and converts them into
//! USD, GBP, EUR, CHF and BTC.
//!
//! ## Pipeline
//!
//! ```text
//! line ──▶ extract ──▶ numeral ──▶ convert ──▶ format ──▶ reply lines
//!                                     │
//!                                     ▼
//!                               ┌───────────┐     ┌──────────────────┐
//!                               │ RateCache │────▶│ feeds (HTTP)     │
//!                               └───────────┘     └──────────────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`extract`] | Finds monetary tokens such as `$12.50` or `SFr. 3` |
//! | [`numeral`] | Parses numerals with `.`/`,` decimal and grouping marks |
//! | [`feeds`] | Upstream GBP-relative rate providers |
//! | [`cache`] | Pull-through rate cache with a 12 hour TTL |
//! | [`convert`] | GBP-triangulated conversion |
//! | [`format`] | Per-token reply rendering |
//! | [`config`] | JSON + environment configuration |
//! | [`transport`] | GET-with-timeout seam the feeds talk through |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxline_core::{Engine, EngineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default().apply_env()?;
//!     let engine = Engine::from_config(&config)?;
//!
//!     for reply in engine.dispatcher().replies("lunch was $12.50 and €3").await {
//!         println!("{reply}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod convert;
pub mod currency;
pub mod engine;
pub mod error;
pub mod extract;
pub mod feeds;
pub mod format;
pub mod numeral;
pub mod transport;

pub use cache::{Clock, ManualClock, RateCache, RateEntry, SystemClock, DEFAULT_RATE_TTL};
pub use config::EngineConfig;
pub use convert::{ConversionError, ConversionResult, Converter};
pub use currency::CurrencyCode;
pub use engine::Engine;
pub use error::{ConfigError, CoreError, NumeralError, ValidationError};
pub use extract::{extract_tokens, MonetaryToken, Tokens};
pub use feeds::{
    BitPayFeed, CurrencyApiFeed, FeedId, FeedRouter, RateFetchError, RateFetchErrorKind,
    RateSource,
};
pub use format::{ConversionTable, Dispatcher, Reply};
pub use numeral::{parse_numeral, ParsedAmount};
pub use transport::{
    FeedRequest, FeedResponse, FeedTransport, ReqwestTransport, TransportError, TransportFuture,
};
