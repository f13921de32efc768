// Warn about missing docs, but not for item declared with `#[cfg(test)]`.
#![cfg_attr(not(test), warn(missing_docs))]

//! Decimal arithmetic.
//!
//! This crate provides the [Decimal] type: a signed decimal number with a
//! runtime precision `P` in `1..=38` and scale `S` in `0..=P`, stored as an
//! `i128` unscaled value such that the represented number is
//! `unscaled * 10**-S` and `|unscaled| < 10**P`.
//!
//! Values with precision at most 18 are "short" decimals (they fit in an
//! `i64`); larger precisions are "long" decimals.  The two forms share the
//! same representation and all operations treat them transparently.
//!
//! Casts between `(precision, scale)` pairs rescale the unscaled value and
//! then bounds-check it against the target precision.  Narrowing the scale
//! rounds half-up (ties away from zero), which is the SQL cast contract; this
//! is deliberately not the round-to-even used by floating-point formatting.

use std::{cmp::Ordering, fmt, io::Write};

use smallvec::SmallVec;

mod decimal;
pub use decimal::{Decimal, MAX_PRECISION, MAX_SHORT_PRECISION};

/// Error that can be returned when parsing a [Decimal] from text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ParseDecimalError {
    /// Invalid syntax.
    SyntaxError,

    /// The literal has more than [MAX_PRECISION] significant digits, or its
    /// scale exceeds [MAX_PRECISION].
    OutOfRange,
}

impl fmt::Display for ParseDecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SyntaxError => write!(f, "invalid decimal literal"),
            Self::OutOfRange => write!(f, "decimal literal out of range"),
        }
    }
}

impl std::error::Error for ParseDecimalError {}

/// Error returned by [Decimal] operations whose result is not representable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DecimalError {
    /// Precision outside `1..=38`.
    PrecisionOutOfRange(u8),

    /// Scale larger than the precision.
    ScaleOutOfRange {
        /// The offending scale.
        scale: u8,
        /// The precision it was declared against.
        precision: u8,
    },

    /// The unscaled value has more digits than the declared precision.
    UnscaledOutOfRange {
        /// The offending unscaled value.
        unscaled: i128,
        /// The declared precision.
        precision: u8,
    },

    /// A cast produced a value outside the range of the target type.
    CastOverflow {
        /// Rendering of the offending value.
        value: String,
        /// SQL name of the source type, e.g. `DECIMAL(6, 1)` or `DOUBLE`.
        source: String,
        /// SQL name of the target type.
        target: String,
    },

    /// Arithmetic overflowed the 38-digit envelope.
    Overflow {
        /// The operation that overflowed.
        operation: &'static str,
    },

    /// Division by zero.
    DivisionByZero,
}

impl fmt::Display for DecimalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrecisionOutOfRange(precision) => {
                write!(f, "DECIMAL precision must be in range [1, 38]: {precision}")
            }
            Self::ScaleOutOfRange { scale, precision } => {
                write!(f, "DECIMAL scale must be in range [0, {precision}]: {scale}")
            }
            Self::UnscaledOutOfRange {
                unscaled,
                precision,
            } => {
                write!(
                    f,
                    "value {unscaled} exceeds DECIMAL precision {precision}"
                )
            }
            Self::CastOverflow {
                value,
                source,
                target,
            } => {
                write!(f, "Cannot cast {source} '{value}' to {target}")
            }
            Self::Overflow { operation } => write!(f, "DECIMAL overflow in {operation}"),
            Self::DivisionByZero => write!(f, "Division by zero"),
        }
    }
}

impl std::error::Error for DecimalError {}

/// Returns `10**exponent`, or `None` if `exponent > 38` (because the result
/// would be greater than `i128::MAX`).
pub(crate) const fn checked_pow10(exponent: u32) -> Option<i128> {
    10i128.checked_pow(exponent)
}

/// Returns `10**exponent`.
///
/// # Panic
///
/// Panics if `exponent > 38` (because the result would be greater than
/// `i128::MAX`).
pub(crate) const fn pow10(exponent: usize) -> i128 {
    10i128.checked_pow(exponent as u32).unwrap()
}

/// The number of decimal digits in `|value|`; zero has one digit.
pub(crate) fn digit_count(value: i128) -> u8 {
    if value == 0 {
        1
    } else {
        value.unsigned_abs().ilog10() as u8 + 1
    }
}

/// Returns `value / divisor` rounded to the nearest integer, with halfway
/// values rounded away from zero.  `divisor` must be positive.
pub(crate) const fn div_round_half_up(value: i128, divisor: i128) -> i128 {
    debug_assert!(divisor > 0);
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
        quotient + value.signum()
    } else {
        quotient
    }
}

/// Parses decimal string `s` into `(unscaled, scale)`, representing
/// `unscaled * 10**-scale`.  Unlike floating-point parsing, every digit is
/// significant: a literal that does not fit 38 digits is an error rather
/// than being rounded.
pub(crate) fn parse_decimal(s: &str) -> Result<(i128, u8), ParseDecimalError> {
    let mut value: i128 = 0;
    let mut scale: i32 = 0;

    let mut saw_dot = false;
    let mut saw_digit = false;
    let mut negative = false;
    let mut saw_sign = false;

    let mut iter = s.trim().chars();
    while let Some(c) = iter.next() {
        match c {
            '-' | '+' if saw_sign || saw_digit || saw_dot => {
                return Err(ParseDecimalError::SyntaxError)
            }
            '-' => {
                negative = true;
                saw_sign = true;
            }
            '+' => {
                saw_sign = true;
            }
            '0'..='9' => {
                saw_digit = true;
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add((c as u8 - b'0') as i128))
                    .ok_or(ParseDecimalError::OutOfRange)?;
                if saw_dot {
                    scale += 1;
                }
            }
            '.' => {
                if saw_dot {
                    return Err(ParseDecimalError::SyntaxError);
                }
                saw_dot = true;
            }
            'e' | 'E' => {
                if !saw_digit {
                    return Err(ParseDecimalError::SyntaxError);
                }
                let e: i32 = iter
                    .as_str()
                    .parse()
                    .map_err(|_| ParseDecimalError::SyntaxError)?;
                scale = scale.checked_sub(e).ok_or(ParseDecimalError::OutOfRange)?;
                break;
            }
            _ => return Err(ParseDecimalError::SyntaxError),
        }
    }
    if !saw_digit {
        return Err(ParseDecimalError::SyntaxError);
    }

    // A negative scale (literal exponent pointing left of the decimal point)
    // folds into the unscaled value; a positive one must fit the envelope.
    if scale < 0 {
        let factor = checked_pow10(scale.unsigned_abs()).ok_or(ParseDecimalError::OutOfRange)?;
        value = value
            .checked_mul(factor)
            .ok_or(ParseDecimalError::OutOfRange)?;
        scale = 0;
    }
    if scale > 38 || digit_count(value) > 38 {
        return Err(ParseDecimalError::OutOfRange);
    }

    Ok((if negative { -value } else { value }, scale as u8))
}

/// Writes `value * 10**-scale` to `f` with exactly `scale` digits after the
/// decimal point.
pub(crate) fn display_decimal(value: i128, scale: usize, f: &mut fmt::Formatter) -> fmt::Result {
    let mut buf = SmallVec::<[u8; 64]>::new();
    write!(&mut buf, "{:01$}", value.unsigned_abs(), scale + 1).unwrap();
    let split = buf.len() - scale;
    // SAFETY: `buf` contains only ASCII characters.
    let s = unsafe { str::from_utf8_unchecked(&buf) };
    let (integer, fraction) = s.split_at(split);
    let sign = if value < 0 { "-" } else { "" };
    write!(f, "{sign}{integer}")?;
    if !fraction.is_empty() {
        write!(f, ".{fraction}")?;
    }
    Ok(())
}

/// Compares `a * 10**-scale_a` with `b * 10**-scale_b` without widening
/// beyond `i128`.  The wider-scaled operand is reduced by division, and the
/// discarded remainder breaks exact ties.
pub(crate) fn compare_scaled(a: i128, scale_a: u8, b: i128, scale_b: u8) -> Ordering {
    match scale_a.cmp(&scale_b) {
        Ordering::Equal => a.cmp(&b),
        Ordering::Less => compare_reduced(a, b, pow10((scale_b - scale_a) as usize)),
        Ordering::Greater => compare_reduced(b, a, pow10((scale_a - scale_b) as usize)).reverse(),
    }
}

/// Compares `a * factor` with `b` as `a` vs `b / factor`, using the
/// remainder of the division to order exact ties.
fn compare_reduced(a: i128, b: i128, factor: i128) -> Ordering {
    let quotient = b / factor;
    let remainder = b % factor;
    match a.cmp(&quotient) {
        Ordering::Equal => 0.cmp(&remainder),
        ordering => ordering,
    }
}

#[cfg(test)]
mod test {
    use super::{compare_scaled, digit_count, div_round_half_up, parse_decimal, ParseDecimalError};
    use std::cmp::Ordering;

    #[test]
    fn parse() {
        for (s, expect) in [
            ("0", Ok((0, 0))),
            ("0.", Ok((0, 0))),
            (".0", Ok((0, 1))),
            ("-0", Ok((0, 0))),
            ("+0", Ok((0, 0))),
            ("--0", Err(ParseDecimalError::SyntaxError)),
            ("-+0", Err(ParseDecimalError::SyntaxError)),
            ("0x", Err(ParseDecimalError::SyntaxError)),
            ("", Err(ParseDecimalError::SyntaxError)),
            (".", Err(ParseDecimalError::SyntaxError)),
            ("1.23", Ok((123, 2))),
            ("-1.23", Ok((-123, 2))),
            ("+1.23", Ok((123, 2))),
            ("12345.6", Ok((123456, 1))),
            ("1.449", Ok((1449, 3))),
            ("123e2", Ok((12300, 0))),
            ("123e-2", Ok((123, 2))),
            ("1e40", Err(ParseDecimalError::OutOfRange)),
            (
                "99999999999999999999999999999999999999",
                Ok((99999999999999999999999999999999999999, 0)),
            ),
            (
                "999999999999999999999999999999999999999",
                Err(ParseDecimalError::OutOfRange),
            ),
        ] {
            assert_eq!(parse_decimal(s), expect, "literal {s:?}");
        }
    }

    #[test]
    fn digits() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(-10), 2);
        assert_eq!(digit_count(123456), 6);
    }

    #[test]
    fn rounding() {
        assert_eq!(div_round_half_up(14, 10), 1);
        assert_eq!(div_round_half_up(15, 10), 2);
        assert_eq!(div_round_half_up(25, 10), 3);
        assert_eq!(div_round_half_up(-15, 10), -2);
        assert_eq!(div_round_half_up(-14, 10), -1);
        assert_eq!(div_round_half_up(1449, 100), 14);
    }

    #[test]
    fn scaled_comparison() {
        assert_eq!(compare_scaled(123, 2, 1230, 3), Ordering::Equal);
        assert_eq!(compare_scaled(123, 2, 1231, 3), Ordering::Less);
        assert_eq!(compare_scaled(1231, 3, 123, 2), Ordering::Greater);
        assert_eq!(compare_scaled(-123, 2, -1230, 3), Ordering::Equal);
        assert_eq!(compare_scaled(-123, 2, -1231, 3), Ordering::Greater);
        assert_eq!(compare_scaled(1, 0, 15, 1), Ordering::Less);
        assert_eq!(compare_scaled(2, 0, 15, 1), Ordering::Greater);
    }
}
