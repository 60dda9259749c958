//! Parsing of human-written cache lifetimes such as `"90s"` or `"1h30m"`

use chrono::Duration;
use thiserror::Error;

const NANOSECOND: u128 = 1;
const MICROSECOND: u128 = 1_000 * NANOSECOND;
const MILLISECOND: u128 = 1_000 * MICROSECOND;
const SECOND: u128 = 1_000 * MILLISECOND;
const MINUTE: u128 = 60 * SECOND;
const HOUR: u128 = 60 * MINUTE;

/// Errors that can occur when parsing a duration string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationError {
    /// The string is not a sequence of `<number><unit>` groups
    #[error("invalid duration '{0}'")]
    Invalid(String),

    /// A number was not followed by a unit
    #[error("missing unit in duration '{0}'")]
    MissingUnit(String),

    /// The unit is not one of ns, us, µs, ms, s, m, h
    #[error("unknown unit '{unit}' in duration '{value}'")]
    UnknownUnit { unit: String, value: String },

    /// The duration does not fit, or the resulting expiry is not representable
    #[error("duration '{0}' is out of range")]
    OutOfRange(String),
}

/// Parses a duration written as an optional sign followed by one or more
/// `<number><unit>` groups, e.g. `"300ms"`, `"1.5h"` or `"2h45m"`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. A bare `"0"`
/// is accepted without a unit.
pub fn parse_duration(value: &str) -> Result<Duration, DurationError> {
    let mut rest = value;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }

    if rest == "0" {
        return Ok(Duration::zero());
    }
    if rest.is_empty() {
        return Err(DurationError::Invalid(value.to_string()));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        // Integer part
        let int_len = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        let (int_digits, after_int) = rest.split_at(int_len);
        rest = after_int;

        // Fractional part
        let mut frac_digits = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let frac_len = after_dot
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after_dot.len());
            frac_digits = &after_dot[..frac_len];
            rest = &after_dot[frac_len..];
        }

        if int_digits.is_empty() && frac_digits.is_empty() {
            return Err(DurationError::Invalid(value.to_string()));
        }

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_len);
        rest = after_unit;

        let scale = match unit {
            "" => return Err(DurationError::MissingUnit(value.to_string())),
            "ns" => NANOSECOND,
            "us" | "µs" | "μs" => MICROSECOND,
            "ms" => MILLISECOND,
            "s" => SECOND,
            "m" => MINUTE,
            "h" => HOUR,
            _ => {
                return Err(DurationError::UnknownUnit {
                    unit: unit.to_string(),
                    value: value.to_string(),
                })
            }
        };

        let whole: u128 = if int_digits.is_empty() {
            0
        } else {
            int_digits
                .parse()
                .map_err(|_| DurationError::OutOfRange(value.to_string()))?
        };

        let part = whole
            .checked_mul(scale)
            .and_then(|n| n.checked_add(fraction_nanos(frac_digits, scale)))
            .ok_or_else(|| DurationError::OutOfRange(value.to_string()))?;

        total = total
            .checked_add(part)
            .filter(|&n| n <= i64::MAX as u128)
            .ok_or_else(|| DurationError::OutOfRange(value.to_string()))?;
    }

    let nanos = total as i64;
    Ok(Duration::nanoseconds(if negative { -nanos } else { nanos }))
}

/// Converts the digits after a decimal point into nanoseconds of `scale`.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    let mut numerator: u128 = 0;
    let mut denominator: u128 = 1;
    // Digits beyond nanosecond precision cannot change the result
    for digit in digits.bytes().take(20) {
        numerator = numerator * 10 + u128::from(digit - b'0');
        denominator *= 10;
    }
    numerator * scale / denominator
}
