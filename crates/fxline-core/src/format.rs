//! Turns a line of chat text into one conversion reply per monetary token.

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};

use crate::convert::{ConversionError, Converter};
use crate::extract::{extract_tokens, MonetaryToken};
use crate::numeral::parse_numeral;
use crate::CurrencyCode;

/// One amount converted into every supported currency, in `CurrencyCode::ALL` order.
///
/// Serializes as an object keyed by currency code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionTable {
    amounts: [f64; 5],
}

impl ConversionTable {
    pub fn amount(&self, code: CurrencyCode) -> f64 {
        let index = CurrencyCode::ALL
            .iter()
            .position(|candidate| *candidate == code)
            .unwrap_or_default();
        self.amounts[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (CurrencyCode, f64)> + '_ {
        CurrencyCode::ALL.into_iter().zip(self.amounts)
    }
}

impl Serialize for ConversionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl Display for ConversionTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (index, (code, amount)) in self.iter().enumerate() {
            if index > 0 {
                f.write_str("\t|\t")?;
            }
            match code {
                CurrencyCode::Btc => write!(f, "{} {:.6E}", code.symbol(), amount)?,
                _ => write!(f, "{} {:.2}", code.symbol(), amount)?,
            }
        }
        Ok(())
    }
}

/// Reply produced for a single token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reply {
    pub token: String,
    pub source: CurrencyCode,
    pub amount: f64,
    pub table: ConversionTable,
}

impl Display for Reply {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.table, f)
    }
}

/// Orchestrates extraction, parsing and conversion for incoming lines.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    converter: Converter,
}

impl Dispatcher {
    pub fn new(converter: Converter) -> Self {
        Self { converter }
    }

    pub fn converter(&self) -> &Converter {
        &self.converter
    }

    /// One result per parseable token, in input order.
    ///
    /// Tokens whose numeral does not parse are dropped. A conversion failure
    /// only affects the token it happened on.
    pub async fn respond(&self, line: &str) -> Vec<Result<Reply, ConversionError>> {
        let tokens: Vec<MonetaryToken<'_>> = extract_tokens(line).collect();
        self.respond_to_tokens(tokens).await
    }

    /// Same as [`respond`](Self::respond) for tokens that were already extracted.
    pub async fn respond_to_tokens(
        &self,
        tokens: Vec<MonetaryToken<'_>>,
    ) -> Vec<Result<Reply, ConversionError>> {
        let mut results = Vec::with_capacity(tokens.len());
        for token in tokens {
            let amount = match parse_numeral(token.numeral) {
                Ok(parsed) => parsed.value(),
                Err(error) => {
                    tracing::debug!(token = token.raw, %error, "dropping malformed token");
                    continue;
                }
            };
            results.push(self.convert_token(&token, amount).await);
        }
        results
    }

    /// Formatted reply strings for `line`; failed tokens are logged and skipped.
    pub async fn replies(&self, line: &str) -> Vec<String> {
        self.respond(line)
            .await
            .into_iter()
            .filter_map(|result| match result {
                Ok(reply) => Some(reply.to_string()),
                Err(error) => {
                    tracing::warn!(%error, "conversion failed");
                    None
                }
            })
            .collect()
    }

    /// Convert `amount` of `source` into every supported currency.
    pub async fn table(
        &self,
        source: CurrencyCode,
        amount: f64,
    ) -> Result<ConversionTable, ConversionError> {
        let mut amounts = [0.0; 5];
        for (slot, target) in amounts.iter_mut().zip(CurrencyCode::ALL) {
            *slot = self.converter.convert(source, target, amount).await?;
        }
        Ok(ConversionTable { amounts })
    }

    async fn convert_token(
        &self,
        token: &MonetaryToken<'_>,
        amount: f64,
    ) -> Result<Reply, ConversionError> {
        let table = self.table(token.currency, amount).await?;
        Ok(Reply {
            token: token.raw.to_owned(),
            source: token.currency,
            amount,
            table,
        })
    }
}
