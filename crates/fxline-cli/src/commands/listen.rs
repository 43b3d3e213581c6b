use std::collections::VecDeque;

use fxline_core::{ConversionError, Engine, Reply};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::cli::{ListenArgs, OutputFormat};
use crate::error::CliError;

use super::write_replies;

type Pending = JoinHandle<Vec<Result<Reply, ConversionError>>>;

/// Reply to every stdin line until EOF.
///
/// Each line is handled on its own task; at most `max_in_flight` lines are
/// outstanding and replies are printed in input order. Conversion failures are
/// logged and do not stop the loop.
pub async fn run(args: &ListenArgs, engine: &Engine, format: OutputFormat) -> Result<(), CliError> {
    let limit = usize::from(args.max_in_flight);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: VecDeque<Pending> = VecDeque::with_capacity(limit);
    let mut received = 0usize;

    while let Some(line) = lines.next_line().await? {
        received += 1;
        let dispatcher = engine.dispatcher().clone();
        pending.push_back(tokio::spawn(async move { dispatcher.respond(&line).await }));

        if pending.len() >= limit {
            flush_oldest(&mut pending, format).await?;
        }
    }

    while !pending.is_empty() {
        flush_oldest(&mut pending, format).await?;
    }

    tracing::info!(lines = received, "stdin closed");
    Ok(())
}

async fn flush_oldest(
    pending: &mut VecDeque<Pending>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let Some(handle) = pending.pop_front() else {
        return Ok(());
    };
    let results = handle
        .await
        .map_err(|error| CliError::Task(error.to_string()))?;
    write_replies(&mut std::io::stdout(), results, format)?;
    Ok(())
}
