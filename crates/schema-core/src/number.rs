//! Exact rational arithmetic for numeric keywords (component A).
//!
//! `serde_json::Number` is backed by `f64` (or an integer) and comparing it
//! directly would reintroduce float rounding exactly where the spec forbids
//! it: `{"multipleOf": 0.1}` must accept `0.3` and reject
//! `0.30000000000000004`. Every numeric literal in a schema is parsed once,
//! at compile time, into a [`Rational`] backed by arbitrary-precision
//! big integers, and compared exactly from then on.
use std::{cmp::Ordering, str::FromStr};

use fraction::{BigFraction, Sign};
use serde_json::{Number, Value};

use crate::error::{CompileError, CompileErrorKind};

/// An exact rational number, parsed from a JSON numeric literal without any
/// float round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Rational(BigFraction);

impl Rational {
    /// Parse a JSON value that must be a number into an exact rational.
    ///
    /// # Errors
    /// [`CompileError`] with [`CompileErrorKind::NumericLiteral`] if `value`
    /// is not a JSON number.
    pub fn from_value(value: &Value) -> Result<Rational, CompileError> {
        let Value::Number(number) = value else {
            return Err(CompileError::new(CompileErrorKind::NumericLiteral {
                value: value.clone(),
            }));
        };
        Rational::from_json_number(number)
    }

    /// Parse a JSON number's textual/literal representation exactly: integers
    /// go through the big-integer path, everything else (fixed-point and
    /// scientific notation) is parsed from the number's canonical string form
    /// so `0.1` is stored as exactly one tenth, never as the nearest `f64`.
    pub fn from_json_number(number: &Number) -> Result<Rational, CompileError> {
        if let Some(i) = number.as_i64() {
            return Ok(Rational(BigFraction::from(i)));
        }
        if let Some(u) = number.as_u64() {
            return Ok(Rational(BigFraction::from(u)));
        }
        let text = number.to_string();
        parse_decimal(&text).ok_or_else(|| {
            CompileError::new(CompileErrorKind::NumericLiteral {
                value: Value::Number(number.clone()),
            })
        })
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.sign() == Some(Sign::Plus) && self.0.numer() == Some(&0u8.into())
            || self.0.sign().is_none()
    }

    #[must_use]
    pub fn compare(&self, other: &Rational) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// Exact divisibility test for `multipleOf`: `self / divisor` must be an
    /// integer.
    #[must_use]
    pub fn is_multiple_of(&self, divisor: &Rational) -> bool {
        if divisor.is_zero() {
            return false;
        }
        let quotient = self.0.clone() / divisor.0.clone();
        quotient.fract().numer() == Some(&0u8.into())
    }
}

/// Structural equality for `uniqueItems`/`enum`/`const`: numbers compare by
/// exact rational value (so `1` and `1.0` are equal, per §8.2), objects
/// compare independent of key order (already true of `serde_json::Map`
/// backed by `indexmap`), everything else by `PartialEq`.
#[must_use]
pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (Rational::from_json_number(x), Rational::from_json_number(y)) {
            (Ok(x), Ok(y)) => x.compare(&y) == Ordering::Equal,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| json_equal(a, b)),
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len() && x.iter().all(|(k, v)| y.get(k).is_some_and(|other| json_equal(v, other)))
        }
        _ => a == b,
    }
}

/// Parse fixed-point or scientific-notation decimal text (as produced by
/// `serde_json`'s `Display` for `Number`, or accepted as schema literal text)
/// into an exact `BigFraction`, without ever constructing an intermediate
/// `f64`.
fn parse_decimal(text: &str) -> Option<Rational> {
    let (mantissa, exponent) = match text.split_once(['e', 'E']) {
        Some((m, e)) => (m, i64::from_str(e).ok()?),
        None => (text, 0),
    };
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, mantissa),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    let digits: String = format!("{int_part}{frac_part}");
    let numerator = BigFraction::from_str(&digits).ok()?;
    let scale = frac_part.len() as i64 - exponent;
    let ten = BigFraction::from(10u64);
    let value = if scale > 0 {
        numerator / pow(&ten, scale as u64)
    } else {
        numerator * pow(&ten, (-scale) as u64)
    };
    let signed = if sign < 0 { -value } else { value };
    Some(Rational(signed))
}

fn pow(base: &BigFraction, exp: u64) -> BigFraction {
    let mut result = BigFraction::from(1u64);
    for _ in 0..exp {
        result = result * base.clone();
    }
    result
}

#[cfg(test)]
mod tests {
    use super::Rational;
    use serde_json::json;
    use std::cmp::Ordering;

    #[test]
    fn exact_multiple_of_tenth() {
        let multiple_of = Rational::from_value(&json!(0.1)).unwrap();
        let accepted = Rational::from_value(&json!(0.3)).unwrap();
        let rejected = Rational::from_value(&json!(0.30000000000000004_f64)).unwrap();
        assert!(accepted.is_multiple_of(&multiple_of));
        assert!(!rejected.is_multiple_of(&multiple_of));
    }

    #[test]
    fn ordering_is_exact() {
        let a = Rational::from_value(&json!(1)).unwrap();
        let b = Rational::from_value(&json!(1.0)).unwrap();
        assert_eq!(a.compare(&b), Ordering::Equal);
    }
}
