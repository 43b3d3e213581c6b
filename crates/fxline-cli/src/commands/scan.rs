use fxline_core::Engine;

use crate::cli::{OutputFormat, ScanArgs};
use crate::error::CliError;

use super::write_replies;

pub async fn run(args: &ScanArgs, engine: &Engine, format: OutputFormat) -> Result<(), CliError> {
    let mut first_failure = None;
    for line in &args.lines {
        let results = engine.dispatcher().respond(line).await;
        let failure = write_replies(&mut std::io::stdout(), results, format)?;
        if first_failure.is_none() {
            first_failure = failure;
        }
    }

    match first_failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}
