mod convert;
mod listen;
mod rates;
mod scan;

use std::io::Write;

use fxline_core::{ConversionError, Engine, Reply};

use crate::cli::{Cli, Command, OutputFormat};
use crate::error::CliError;

pub async fn run(cli: &Cli, engine: &Engine) -> Result<(), CliError> {
    match &cli.command {
        Command::Scan(args) => scan::run(args, engine, cli.format).await,
        Command::Listen(args) => listen::run(args, engine, cli.format).await,
        Command::Convert(args) => convert::run(args, engine, cli.format).await,
        Command::Rates => rates::run(engine, cli.format).await,
    }
}

/// Write successful replies in order and hand back the first failure, if any.
fn write_replies(
    out: &mut impl Write,
    results: Vec<Result<Reply, ConversionError>>,
    format: OutputFormat,
) -> Result<Option<ConversionError>, CliError> {
    let mut first_failure = None;
    for result in results {
        match result {
            Ok(reply) => match format {
                OutputFormat::Text => writeln!(out, "{reply}")?,
                OutputFormat::Json => {
                    serde_json::to_writer(&mut *out, &reply)?;
                    writeln!(out)?;
                }
            },
            Err(error) => {
                tracing::warn!(%error, "conversion failed");
                first_failure.get_or_insert(error);
            }
        }
    }
    out.flush()?;
    Ok(first_failure)
}
