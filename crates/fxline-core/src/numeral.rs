//! Locale-tolerant numeral parsing.
//!
//! Amounts in chat text use either `.` or `,` as the decimal point and either
//! of them (or a space) for digit grouping. The last `.`/`,` in a numeral is the
//! decimal point only when it is followed by one or two digits and nothing
//! else; every other mark is a grouping separator and is discarded.
//!
//! Group widths are not re-validated, so `1,23,456` parses as `123456`.

use std::sync::LazyLock;

use crate::NumeralError;

const NUMERAL_PATTERN: &str = r"^[+-]?\d+(?:[., ]\d+)*(?: ?[.,] ?\d{1,2})?$";

static NUMERAL_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(NUMERAL_PATTERN).expect("numeral pattern is a valid regex"));

/// Signed value parsed from a numeral substring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedAmount {
    value: f64,
    negative: bool,
}

impl ParsedAmount {
    /// The signed value.
    pub const fn value(self) -> f64 {
        self.value
    }

    pub const fn is_negative(self) -> bool {
        self.negative
    }
}

/// Parse a numeral such as `-1,234.56`, `1.234,56` or `+42`.
pub fn parse_numeral(input: &str) -> Result<ParsedAmount, NumeralError> {
    if !input.bytes().any(|byte| byte.is_ascii_digit()) {
        return Err(NumeralError::NoDigits {
            input: input.to_owned(),
        });
    }
    if !NUMERAL_RE.is_match(input) {
        return Err(NumeralError::Malformed {
            input: input.to_owned(),
        });
    }

    let (negative, unsigned) = match input.as_bytes()[0] {
        b'-' => (true, &input[1..]),
        b'+' => (false, &input[1..]),
        _ => (false, input),
    };

    let decimal_mark = decimal_mark_index(unsigned);
    let mut digits: Vec<u8> = Vec::with_capacity(unsigned.len());
    let mut point = None;
    for (index, byte) in unsigned.bytes().enumerate() {
        if byte.is_ascii_digit() {
            digits.push(byte - b'0');
        } else if Some(index) == decimal_mark {
            point = Some(digits.len());
        }
    }

    let magnitude =
        place_value(&digits, point.unwrap_or(digits.len())).ok_or_else(|| {
            NumeralError::Malformed {
                input: input.to_owned(),
            }
        })?;
    let value = if negative { -magnitude } else { magnitude };
    Ok(ParsedAmount { value, negative })
}

/// Byte index of the mark acting as decimal point, if any.
fn decimal_mark_index(unsigned: &str) -> Option<usize> {
    let index = unsigned.rfind(['.', ','])?;
    let tail = unsigned[index + 1..].trim_start_matches(' ');
    let fractional = (1..=2).contains(&tail.len()) && tail.bytes().all(|b| b.is_ascii_digit());
    fractional.then_some(index)
}

/// Largest integer every smaller one of which is exact in an `f64`.
const EXACT_MANTISSA_LIMIT: u64 = 1 << f64::MANTISSA_DIGITS;

/// Value of `digits` with the decimal point in front of index `point`.
///
/// While the digits form an integer of at most 2^53 it converts to `f64`
/// exactly, and a single division by 1, 10 or 100 rounds once, giving the
/// same value as the equivalent float literal. Longer numerals go through
/// the standard float parser, which is also correctly rounded.
fn place_value(digits: &[u8], point: usize) -> Option<f64> {
    let fraction_digits = i32::try_from(digits.len() - point).ok()?;
    let mantissa = digits
        .iter()
        .try_fold(0u64, |acc, &digit| {
            acc.checked_mul(10)?.checked_add(u64::from(digit))
        })
        .filter(|mantissa| *mantissa <= EXACT_MANTISSA_LIMIT);

    if let Some(mantissa) = mantissa {
        return Some(mantissa as f64 / 10f64.powi(fraction_digits));
    }

    let mut literal = String::with_capacity(digits.len() + 1);
    for (index, digit) in digits.iter().enumerate() {
        if index == point {
            literal.push('.');
        }
        literal.push(char::from(b'0' + digit));
    }
    literal.parse().ok()
}
