use std::io::Write;

use serde::Serialize;
use time::format_description::well_known::Rfc3339;

use fxline_core::{CurrencyCode, Engine};

use crate::cli::OutputFormat;
use crate::error::CliError;

#[derive(Debug, Serialize)]
struct RateRow {
    code: CurrencyCode,
    per_gbp: f64,
    expires_at: Option<String>,
}

/// Look up every currency, then print whatever the cache holds.
pub async fn run(engine: &Engine, format: OutputFormat) -> Result<(), CliError> {
    let mut first_failure = None;
    for code in CurrencyCode::ALL {
        if let Err(error) = engine.rates().get_rate(code).await {
            first_failure.get_or_insert(error);
        }
    }

    let snapshot = engine.rates().snapshot().await;
    let mut rows = vec![RateRow {
        code: CurrencyCode::BASE,
        per_gbp: 1.0,
        expires_at: None,
    }];
    for (code, entry) in snapshot {
        let expires_at = entry
            .expires_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| entry.expires_at.to_string());
        rows.push(RateRow {
            code,
            per_gbp: entry.rate,
            expires_at: Some(expires_at),
        });
    }

    let mut out = std::io::stdout();
    for row in &rows {
        match format {
            OutputFormat::Text => writeln!(
                out,
                "{}\t{}\t{}",
                row.code,
                row.per_gbp,
                row.expires_at.as_deref().unwrap_or("base")
            )?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, row)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;

    match first_failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
