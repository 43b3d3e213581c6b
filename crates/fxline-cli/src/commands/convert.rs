use std::io::Write;

use fxline_core::{parse_numeral, CurrencyCode, Engine};

use crate::cli::{ConvertArgs, OutputFormat};
use crate::error::CliError;

pub async fn run(
    args: &ConvertArgs,
    engine: &Engine,
    format: OutputFormat,
) -> Result<(), CliError> {
    let amount = parse_numeral(args.amount.trim())?.value();
    let source: CurrencyCode = args.from.parse()?;
    let targets = if args.to.is_empty() {
        CurrencyCode::ALL.to_vec()
    } else {
        args.to
            .iter()
            .map(|raw| raw.parse())
            .collect::<Result<Vec<CurrencyCode>, _>>()?
    };

    let mut out = std::io::stdout();
    for target in targets {
        let result = engine
            .converter()
            .convert_result(source, target, amount)
            .await?;
        match format {
            OutputFormat::Text => writeln!(out, "{}", render_amount(target, result.amount))?,
            OutputFormat::Json => {
                serde_json::to_writer(&mut out, &result)?;
                writeln!(out)?;
            }
        }
    }
    out.flush()?;
    Ok(())
}

fn render_amount(code: CurrencyCode, amount: f64) -> String {
    match code {
        CurrencyCode::Btc => format!("{} {:.6E}", code.symbol(), amount),
        _ => format!("{} {:.2}", code.symbol(), amount),
    }
}
