//! Monetary token extraction from free-form text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::{CaptureMatches, Regex};

use crate::CurrencyCode;

/// Marker, optional space, optional sign, then a numeral that is either grouped
/// in threes or a plain digit run, with up to two fractional digits.
const TOKEN_PATTERN: &str = r"(?P<marker>[$£€]|\b(?:SFr\.|Fr\.|FS|BTC|USD|GBP|EUR|CHF)) ?(?P<numeral>[+-]?(?:\d{1,3}(?:[., ]\d{3})+|\d+)(?: ?[.,] ?\d{1,2})?)";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(TOKEN_PATTERN).expect("token pattern is a valid regex"));

/// A currency-tagged amount found in a line, prior to numeric parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonetaryToken<'a> {
    /// Full matched text, marker included.
    pub raw: &'a str,
    pub currency: CurrencyCode,
    /// Amount portion with sign and punctuation intact.
    pub numeral: &'a str,
    /// Byte range of `raw` within the scanned line.
    pub span: Range<usize>,
}

/// Lazy iterator over the tokens of one line.
#[derive(Debug)]
pub struct Tokens<'a> {
    matches: CaptureMatches<'static, 'a>,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = MonetaryToken<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        for caps in self.matches.by_ref() {
            let (Some(whole), Some(marker), Some(numeral)) =
                (caps.get(0), caps.name("marker"), caps.name("numeral"))
            else {
                continue;
            };

            match CurrencyCode::from_marker(marker.as_str()) {
                Ok(currency) => {
                    return Some(MonetaryToken {
                        raw: whole.as_str(),
                        currency,
                        numeral: numeral.as_str(),
                        span: whole.range(),
                    });
                }
                Err(error) => {
                    tracing::debug!(token = whole.as_str(), %error, "dropping token");
                }
            }
        }
        None
    }
}

/// Scan `line` left to right for non-overlapping monetary tokens.
///
/// Calling this again on the same line restarts the scan from the beginning.
pub fn extract_tokens(line: &str) -> Tokens<'_> {
    Tokens {
        matches: TOKEN_RE.captures_iter(line),
    }
}
