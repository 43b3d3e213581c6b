//! CLI argument definitions for fxline.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Convert every amount found in the given lines |
//! | `listen` | Read lines from stdin and reply to each one |
//! | `convert` | Convert a single amount between currencies |
//! | `rates` | Show the GBP-relative rate table |
//!
//! # Examples
//!
//! ```bash
//! fxline scan "lunch was \$12.50 and €3"
//! tail -f chat.log | fxline listen
//! fxline convert 1.234,56 EUR USD GBP
//! fxline rates --format json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Spot currency amounts in text and convert them to USD, GBP, EUR, CHF and BTC.
#[derive(Debug, Parser)]
#[command(
    name = "fxline",
    author,
    version,
    about = "Spot currency amounts in text and convert them"
)]
pub struct Cli {
    /// JSON config file (accepts the bot-style `CurrencyApiKey` field).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-request timeout for rate feeds, in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log line format written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Tab-separated reply lines, as sent back to chat.
    Text,
    /// One JSON object per line.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert every monetary amount found in the given text lines.
    ///
    ///   fxline scan "lunch was $12.50 and €3"
    Scan(ScanArgs),

    /// Read lines from stdin and print the replies for each line.
    ///
    /// Lines are processed concurrently; replies keep input order.
    Listen(ListenArgs),

    /// Convert one amount into one or more currencies.
    ///
    ///   fxline convert 20000 GBP BTC
    ///   fxline convert -- -1,234.56 USD
    Convert(ConvertArgs),

    /// Refresh and print the GBP-relative rate of every currency.
    Rates,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// One or more lines of text.
    #[arg(required = true, num_args = 1..)]
    pub lines: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ListenArgs {
    /// Maximum number of lines being converted at once.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u16).range(1..))]
    pub max_in_flight: u16,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Amount, e.g. 12.50, 1.234,56 or -1,000.
    #[arg(allow_hyphen_values = true)]
    pub amount: String,

    /// Source currency code.
    pub from: String,

    /// Target currency codes; all supported currencies when omitted.
    #[arg(num_args = 0..)]
    pub to: Vec<String>,
}
