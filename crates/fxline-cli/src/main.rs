mod cli;
mod commands;
mod error;
mod logging;

use std::process::ExitCode;

use clap::Parser;
use fxline_core::{Engine, EngineConfig};

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_format);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::debug!(?error, "command failed");
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let engine = Engine::from_config(&config)?;
    commands::run(cli, &engine).await
}

fn load_config(cli: &Cli) -> Result<EngineConfig, CliError> {
    let base = match &cli.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let mut config = base.apply_env()?;
    if let Some(timeout_ms) = cli.timeout_ms {
        config.request_timeout_ms = timeout_ms;
    }
    if config.currency_api_key.is_empty() {
        tracing::warn!("no currency API key configured; USD/EUR/CHF lookups will likely fail");
    }
    Ok(config)
}
