use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Write as _},
    hash::{Hash, Hasher},
    ops::{Add, Div, Mul, Neg, Rem, Sub},
    str::FromStr,
};

use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use smallstr::SmallString;

use crate::{
    checked_pow10, compare_scaled, digit_count, display_decimal, div_round_half_up, parse_decimal,
    pow10, DecimalError, ParseDecimalError,
};

/// Largest supported precision.  `10**38 <= 2**127 - 1 < 10**39`, so every
/// legal unscaled value fits in an `i128`.
pub const MAX_PRECISION: u8 = 38;

/// Largest precision whose unscaled values fit in an `i64`.  Values up to
/// this precision are "short" decimals.
pub const MAX_SHORT_PRECISION: u8 = 18;

/// Signed decimal number with runtime precision and scale.
///
/// A `Decimal` with precision `P` and scale `S` represents
/// `unscaled * 10**-S` where `|unscaled| < 10**P`.  The table below shows the
/// maximum value for a few combinations; the minimum is always the negation
/// of the maximum:
///
/// |        Type     |                                      Maximum Value |
/// |:----------------|---------------------------------------------------:|
/// | `DECIMAL(5, 2)` | `                                           999.99` |
/// | `DECIMAL(18, 0)`| `                               999,999,999,999,999,999` |
/// | `DECIMAL(38, 5)`| `  999,999,999,999,999,999,999,999,999,999,999.99999` |
///
/// Equality and ordering compare numeric values, so `1.40` at scale 2 equals
/// `1.4` at scale 1; precision and scale are not part of equality.
#[derive(Copy, Clone)]
pub struct Decimal {
    unscaled: i128,
    precision: u8,
    scale: u8,
}

impl Decimal {
    /// Zero as `DECIMAL(1, 0)`.
    pub const ZERO: Self = Self {
        unscaled: 0,
        precision: 1,
        scale: 0,
    };

    /// Creates a decimal representing `unscaled * 10**-scale` with the given
    /// declared precision.
    pub fn new(unscaled: i128, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        Self::check_type(precision, scale)?;
        if digit_count(unscaled) > precision {
            return Err(DecimalError::UnscaledOutOfRange {
                unscaled,
                precision,
            });
        }
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }

    fn check_type(precision: u8, scale: u8) -> Result<(), DecimalError> {
        if precision == 0 || precision > MAX_PRECISION {
            return Err(DecimalError::PrecisionOutOfRange(precision));
        }
        if scale > precision {
            return Err(DecimalError::ScaleOutOfRange { scale, precision });
        }
        Ok(())
    }

    /// The unscaled value; the represented number is
    /// `unscaled * 10**-scale()`.
    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    /// The declared precision, in `1..=38`.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// The declared scale, in `0..=precision`.
    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// True if this value is a short decimal (precision at most 18, unscaled
    /// value representable in an `i64`).
    pub fn is_short(&self) -> bool {
        self.precision <= MAX_SHORT_PRECISION
    }

    /// SQL rendering of this value's type, e.g. `DECIMAL(6, 1)`.
    pub fn sql_type(&self) -> String {
        format!("DECIMAL({}, {})", self.precision, self.scale)
    }

    fn cast_overflow(&self, target: String) -> DecimalError {
        DecimalError::CastOverflow {
            value: self.to_string(),
            source: self.sql_type(),
            target,
        }
    }

    /// Casts this value to `DECIMAL(precision, scale)`.
    ///
    /// The unscaled value is rescaled by `10**(scale - self.scale())`: an
    /// exact multiplication when the scale grows, a division rounding
    /// half-up (ties away from zero) when it shrinks.  The rescaled value
    /// must fit the target precision or the cast fails with an overflow
    /// error naming the source type, the target type, and the value.
    pub fn cast(&self, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        Self::check_type(precision, scale)?;
        let unscaled = self
            .rescale(scale)
            .filter(|v| digit_count(*v) <= precision)
            .ok_or_else(|| self.cast_overflow(format!("DECIMAL({precision}, {scale})")))?;
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }

    /// Returns the unscaled value rescaled from `self.scale` to `scale`, or
    /// `None` if the exact widening multiplication overflows `i128`.
    fn rescale(&self, scale: u8) -> Option<i128> {
        match scale.cmp(&self.scale) {
            Ordering::Equal => Some(self.unscaled),
            Ordering::Greater => self
                .unscaled
                .checked_mul(checked_pow10((scale - self.scale) as u32)?),
            Ordering::Less => Some(div_round_half_up(
                self.unscaled,
                pow10((self.scale - scale) as usize),
            )),
        }
    }

    /// Returns the absolute value.  This is an exact calculation that cannot
    /// overflow.
    pub fn abs(self) -> Self {
        Self {
            unscaled: self.unscaled.abs(),
            ..self
        }
    }

    /// Returns true if this value is negative, false if it is zero or
    /// positive.
    pub fn is_negative(&self) -> bool {
        self.unscaled < 0
    }

    /// Returns true if this value is zero.
    pub fn is_zero(&self) -> bool {
        self.unscaled == 0
    }

    /// Calculates `self + other` with the SQL result type
    /// (`s = max(s1, s2)`, `p = min(38, max(p1 - s1, p2 - s2) + s + 1)`), or
    /// an error if the result does not fit 38 digits.
    pub fn checked_add(&self, other: &Self) -> Result<Self, DecimalError> {
        let scale = self.scale.max(other.scale);
        let precision = add_precision(self, other, scale);
        let sum = self
            .rescale(scale)
            .zip(other.rescale(scale))
            .and_then(|(a, b)| a.checked_add(b))
            .ok_or(DecimalError::Overflow {
                operation: "addition",
            })?;
        Self::with_bounds(sum, precision, scale, "addition")
    }

    /// Calculates `self - other`; the result type matches
    /// [checked_add](Self::checked_add).
    pub fn checked_sub(&self, other: &Self) -> Result<Self, DecimalError> {
        let scale = self.scale.max(other.scale);
        let precision = add_precision(self, other, scale);
        let diff = self
            .rescale(scale)
            .zip(other.rescale(scale))
            .and_then(|(a, b)| a.checked_sub(b))
            .ok_or(DecimalError::Overflow {
                operation: "subtraction",
            })?;
        Self::with_bounds(diff, precision, scale, "subtraction")
    }

    /// Calculates `self * other` with the SQL result type
    /// (`s = s1 + s2`, `p = min(38, p1 + p2)`).  Short inputs may widen to a
    /// long result; a result beyond 38 digits (or a combined scale beyond
    /// 38) is an error.
    pub fn checked_mul(&self, other: &Self) -> Result<Self, DecimalError> {
        let scale = self.scale as u32 + other.scale as u32;
        if scale > MAX_PRECISION as u32 {
            return Err(DecimalError::ScaleOutOfRange {
                scale: scale.min(u8::MAX as u32) as u8,
                precision: MAX_PRECISION,
            });
        }
        let precision = (self.precision as u32 + other.precision as u32).min(38) as u8;
        let product =
            self.unscaled
                .checked_mul(other.unscaled)
                .ok_or(DecimalError::Overflow {
                    operation: "multiplication",
                })?;
        Self::with_bounds(product, precision, scale as u8, "multiplication")
    }

    /// Calculates `self / other`, rounding half-up to the result scale
    /// `max(s1, s2)` with precision `min(38, p1 + s2 + max(0, s2 - s1))`.
    pub fn checked_div(&self, other: &Self) -> Result<Self, DecimalError> {
        if other.unscaled == 0 {
            return Err(DecimalError::DivisionByZero);
        }
        let scale = self.scale.max(other.scale);
        let precision = (self.precision as u32
            + other.scale as u32
            + (other.scale as u32).saturating_sub(self.scale as u32))
        .min(38) as u8;

        // The quotient is computed at `scale + other.scale` digits in the
        // numerator so the `i128` division lands exactly on `scale`.
        let shift = (scale + other.scale - self.scale) as u32;
        let numerator = self
            .unscaled
            .checked_mul(checked_pow10(shift).ok_or(DecimalError::Overflow {
                operation: "division",
            })?)
            .ok_or(DecimalError::Overflow {
                operation: "division",
            })?;
        let quotient = div_round_half_up_signed(numerator, other.unscaled);
        Self::with_bounds(quotient, precision, scale, "division")
    }

    /// Calculates `self % other` at scale `max(s1, s2)`; the sign follows
    /// the dividend.
    pub fn checked_rem(&self, other: &Self) -> Result<Self, DecimalError> {
        if other.unscaled == 0 {
            return Err(DecimalError::DivisionByZero);
        }
        let scale = self.scale.max(other.scale);
        let precision = ((self.precision - self.scale)
            .min(other.precision - other.scale) as u32
            + scale as u32)
            .clamp(1, 38) as u8;
        let rem = self
            .rescale(scale)
            .zip(other.rescale(scale))
            .map(|(a, b)| a % b)
            .ok_or(DecimalError::Overflow {
                operation: "remainder",
            })?;
        Self::with_bounds(rem, precision, scale, "remainder")
    }

    fn with_bounds(
        unscaled: i128,
        precision: u8,
        scale: u8,
        operation: &'static str,
    ) -> Result<Self, DecimalError> {
        if digit_count(unscaled) > precision {
            return Err(DecimalError::Overflow { operation });
        }
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }

    /// Converts an `i64` to a decimal with scale 0 and the smallest
    /// sufficient precision.
    pub fn from_i64(value: i64) -> Self {
        Self {
            unscaled: value as i128,
            precision: digit_count(value as i128),
            scale: 0,
        }
    }

    /// Converts this value to an `i64`, rounding half-up at the decimal
    /// point.
    pub fn to_i64(&self) -> Result<i64, DecimalError> {
        let whole = div_round_half_up(self.unscaled, pow10(self.scale as usize));
        i64::try_from(whole).map_err(|_| self.cast_overflow("BIGINT".to_string()))
    }

    /// Converts this value to an `f64`.  Values beyond 15-16 significant
    /// digits lose precision, as with any binary double.
    pub fn to_f64(&self) -> f64 {
        self.unscaled as f64 / pow10(self.scale as usize) as f64
    }

    /// Converts `value` to `DECIMAL(precision, scale)`, rounding half-up at
    /// the target scale.
    pub fn from_f64(value: f64, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        Self::check_type(precision, scale)?;
        let overflow = || DecimalError::CastOverflow {
            value: value.to_string(),
            source: "DOUBLE".to_string(),
            target: format!("DECIMAL({precision}, {scale})"),
        };
        if !value.is_finite() {
            return Err(overflow());
        }
        // Shortest decimal rendering, truncated one guard digit past the
        // target scale.  Truncation (not rounding) keeps the half-up
        // decision of the final cast exact: the guard digit alone decides
        // which side of the halfway point the value lies on.
        let mut buf = SmallString::<[u8; 64]>::new();
        write!(&mut buf, "{value}").unwrap();
        if let Some(dot) = buf.find('.') {
            let keep = dot + scale as usize + 2;
            if buf.len() > keep {
                buf.truncate(keep);
            }
        }
        let parsed = Self::from_str(&buf).map_err(|_| overflow())?;
        parsed.cast(precision, scale).map_err(|_| overflow())
    }

    /// Converts this value to a boolean: zero is false, everything else is
    /// true.
    pub fn to_bool(&self) -> bool {
        self.unscaled != 0
    }

    /// Converts a boolean to `DECIMAL(1, 0)`.
    pub fn from_bool(value: bool) -> Self {
        Self {
            unscaled: value as i128,
            precision: 1,
            scale: 0,
        }
    }

    /// Parses `text` as `DECIMAL(precision, scale)`: a literal parse
    /// followed by a half-up cast.  Both malformed text and out-of-range
    /// values fail with a cast error naming the text.
    pub fn parse(text: &str, precision: u8, scale: u8) -> Result<Self, DecimalError> {
        Self::check_type(precision, scale)?;
        let overflow = || DecimalError::CastOverflow {
            value: text.to_string(),
            source: "VARCHAR".to_string(),
            target: format!("DECIMAL({precision}, {scale})"),
        };
        let parsed = Self::from_str(text).map_err(|_| overflow())?;
        parsed.cast(precision, scale).map_err(|_| overflow())
    }
}

/// Result precision of addition and subtraction.
fn add_precision(a: &Decimal, b: &Decimal, scale: u8) -> u8 {
    ((a.precision - a.scale).max(b.precision - b.scale) as u32 + scale as u32 + 1).min(38) as u8
}

/// Like [div_round_half_up], but accepts a divisor of either sign.
fn div_round_half_up_signed(value: i128, divisor: i128) -> i128 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    if remainder.unsigned_abs() * 2 >= divisor.unsigned_abs() {
        quotient + (value.signum() * divisor.signum())
    } else {
        quotient
    }
}

impl FromStr for Decimal {
    type Err = ParseDecimalError;

    /// Parses a decimal literal.  The precision and scale are derived from
    /// the literal itself: `12345.6` is `DECIMAL(6, 1)`, `0.05` is
    /// `DECIMAL(2, 2)`.  More than 38 significant digits is an error, never
    /// a rounding.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (unscaled, scale) = parse_decimal(s)?;
        let precision = digit_count(unscaled).max(scale);
        Ok(Self {
            unscaled,
            precision,
            scale,
        })
    }
}

impl Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_decimal(self.unscaled, self.scale as usize, f)
    }
}

impl Debug for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_decimal(self.unscaled, self.scale as usize, f)
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        compare_scaled(self.unscaled, self.scale, other.unscaled, other.scale)
    }
}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Equal values of different scales must hash alike, so hash the
        // canonical form with trailing decimal zeros stripped.
        let mut unscaled = self.unscaled;
        let mut scale = self.scale;
        while scale > 0 && unscaled % 10 == 0 {
            unscaled /= 10;
            scale -= 1;
        }
        unscaled.hash(state);
        scale.hash(state);
    }
}

impl Neg for Decimal {
    type Output = Self;

    /// Negation is exact and cannot overflow because the range is symmetric.
    fn neg(self) -> Self {
        Self {
            unscaled: -self.unscaled,
            ..self
        }
    }
}

macro_rules! checked_op {
    ($trait_name:ident, $method:ident, $checked:ident) => {
        impl $trait_name for Decimal {
            type Output = Self;

            /// # Panic
            ///
            /// Panics if the result is not representable; use the `checked_`
            /// form to handle overflow.
            fn $method(self, rhs: Self) -> Self {
                match self.$checked(&rhs) {
                    Ok(result) => result,
                    Err(error) => panic!("{error}"),
                }
            }
        }
    };
}

checked_op!(Add, add, checked_add);
checked_op!(Sub, sub, checked_sub);
checked_op!(Mul, mul, checked_mul);
checked_op!(Div, div, checked_div);
checked_op!(Rem, rem, checked_rem);

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        text.parse()
            .map_err(|e| D::Error::custom(format!("invalid decimal string '{text}': {e}")))
    }
}

#[cfg(test)]
mod test {
    use super::{Decimal, MAX_PRECISION};
    use crate::DecimalError;
    use proptest::prelude::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn literal_types() {
        for (s, precision, scale) in [
            ("12345.6", 6, 1),
            ("1.449", 4, 3),
            ("0.05", 2, 2),
            ("0", 1, 0),
            ("-12345.6", 6, 1),
            ("99999999999999999999", 20, 0),
        ] {
            let d = dec(s);
            assert_eq!((d.precision(), d.scale()), (precision, scale), "{s}");
            assert_eq!(d.is_short(), precision <= 18, "{s}");
        }
    }

    #[test]
    fn cast_rounds_half_up() {
        // The cast inspects the discarded digits as a whole, so 1.449 at
        // scale 1 is 1.4 (49 < 50), not the double-rounded 1.5.
        assert_eq!(dec("1.449").cast(2, 1).unwrap(), dec("1.4"));
        assert_eq!(dec("1.45").cast(2, 1).unwrap(), dec("1.5"));
        assert_eq!(dec("1.25").cast(2, 1).unwrap(), dec("1.3"));
        assert_eq!(dec("-1.25").cast(2, 1).unwrap(), dec("-1.3"));
        assert!("12:00".parse::<Decimal>().is_err());
    }

    #[test]
    fn cast_overflow() {
        let err = dec("12345.6").cast(4, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot cast DECIMAL(6, 1) '12345.6' to DECIMAL(4, 0)"
        );
        // Rounding happens before the bounds check: 9.95 -> scale 1 -> 10.0
        // needs three digits.
        assert!(dec("9.95").cast(2, 1).is_err());
        assert_eq!(dec("9.94").cast(2, 1).unwrap(), dec("9.9"));
    }

    #[test]
    fn cast_widening_is_exact() {
        let wide = dec("1.4").cast(38, 10).unwrap();
        assert_eq!(wide.unscaled(), 14_000_000_000);
        assert_eq!(wide.cast(2, 1).unwrap(), dec("1.4"));
        assert!(!wide.is_short());
    }

    #[test]
    fn short_long_transparent() {
        let short = dec("123.45");
        let long = short.cast(38, 2).unwrap();
        assert!(short.is_short());
        assert!(!long.is_short());
        assert_eq!(short, long);
        assert_eq!(long.cast(5, 2).unwrap(), short);
    }

    #[test]
    fn addition_promotes() {
        let sum = dec("99.9").checked_add(&dec("0.15")).unwrap();
        assert_eq!(sum, dec("100.05"));
        assert_eq!((sum.precision(), sum.scale()), (5, 2));

        // Short + short can widen to long.
        let a = Decimal::new(999_999_999_999_999_999, 18, 0).unwrap();
        let sum = a.checked_add(&a).unwrap();
        assert_eq!(sum.unscaled(), 1_999_999_999_999_999_998);
        assert_eq!(sum.precision(), 19);
        assert!(!sum.is_short());
    }

    #[test]
    fn multiplication_promotes() {
        let product = dec("1.5").checked_mul(&dec("2.05")).unwrap();
        assert_eq!(product, dec("3.075"));
        assert_eq!((product.precision(), product.scale()), (5, 3));

        let big = Decimal::new(pow38(), 38, 0).unwrap();
        assert_eq!(
            big.checked_mul(&Decimal::from_i64(10)),
            Err(DecimalError::Overflow {
                operation: "multiplication"
            })
        );
    }

    fn pow38() -> i128 {
        10i128.pow(37)
    }

    #[test]
    fn division_rounds_half_up() {
        assert_eq!(dec("1.0").checked_div(&dec("3.0")).unwrap(), dec("0.3"));
        assert_eq!(dec("1.0").checked_div(&dec("8.0")).unwrap(), dec("0.1"));
        assert_eq!(dec("7").checked_div(&dec("2")).unwrap(), dec("4"));
        assert_eq!(dec("-7").checked_div(&dec("2")).unwrap(), dec("-4"));
        assert_eq!(
            dec("1").checked_div(&Decimal::ZERO),
            Err(DecimalError::DivisionByZero)
        );
    }

    #[test]
    fn remainder() {
        assert_eq!(dec("7.5").checked_rem(&dec("2")).unwrap(), dec("1.5"));
        assert_eq!(dec("-7.5").checked_rem(&dec("2")).unwrap(), dec("-1.5"));
    }

    #[test]
    fn integer_conversions() {
        assert_eq!(dec("12.5").to_i64().unwrap(), 13);
        assert_eq!(dec("-12.5").to_i64().unwrap(), -13);
        assert_eq!(dec("12.4").to_i64().unwrap(), 12);
        assert_eq!(Decimal::from_i64(-42).to_string(), "-42");
        assert!(dec("99999999999999999999").to_i64().is_err());
    }

    #[test]
    fn double_conversions() {
        assert_eq!(Decimal::from_f64(1.449, 2, 1).unwrap(), dec("1.4"));
        assert_eq!(Decimal::from_f64(2.5, 2, 0).unwrap(), dec("3"));
        assert_eq!(dec("0.25").to_f64(), 0.25);
        assert!(Decimal::from_f64(f64::NAN, 4, 2).is_err());
        assert!(Decimal::from_f64(1e30, 4, 2).is_err());
    }

    #[test]
    fn varchar_conversions() {
        assert_eq!(Decimal::parse("1.449", 2, 1).unwrap(), dec("1.4"));
        let err = Decimal::parse("12345.6", 4, 0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot cast VARCHAR '12345.6' to DECIMAL(4, 0)"
        );
        assert!(Decimal::parse("abc", 4, 0).is_err());
    }

    #[test]
    fn display_keeps_scale() {
        assert_eq!(dec("1.40").to_string(), "1.40");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec("12345.6").to_string(), "12345.6");
        assert_eq!(dec("0").to_string(), "0");
    }

    #[test]
    fn equality_ignores_scale() {
        assert_eq!(dec("1.4"), dec("1.40"));
        assert_ne!(dec("1.4"), dec("1.41"));
        assert!(dec("1.4") < dec("1.41"));
        assert!(dec("-1.4") > dec("-1.41"));

        let hash = |d: &Decimal| {
            let mut hasher = DefaultHasher::new();
            d.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&dec("1.4")), hash(&dec("1.40")));
    }

    #[test]
    fn precision_bounds() {
        assert!(matches!(
            Decimal::new(1, 39, 0),
            Err(DecimalError::PrecisionOutOfRange(39))
        ));
        assert!(matches!(
            Decimal::new(1, 4, 5),
            Err(DecimalError::ScaleOutOfRange { .. })
        ));
        assert!(matches!(
            Decimal::new(100, 2, 0),
            Err(DecimalError::UnscaledOutOfRange { .. })
        ));
        assert_eq!(MAX_PRECISION, 38);
    }

    #[test]
    fn serde_round_trip() {
        let d = dec("-12345.60");
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(json, "\"-12345.60\"");
        let back: Decimal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, d);
        assert_eq!(back.scale(), 2);
    }

    proptest! {
        #[test]
        fn cast_then_widen_is_idempotent(unscaled in -999_999i128..=999_999, scale in 0u8..=6) {
            let value = Decimal::new(unscaled, 12, scale).unwrap();
            for target in 0..=scale {
                let narrowed = value.cast(12, target).unwrap();
                // Narrowing is idempotent and widening never recovers digits.
                prop_assert_eq!(narrowed.cast(12, target).unwrap(), narrowed);
                prop_assert_eq!(narrowed.cast(24, scale).unwrap(), narrowed);
            }
        }

        #[test]
        fn ordering_matches_f64(a in -99_999i128..=99_999, sa in 0u8..=4,
                                b in -99_999i128..=99_999, sb in 0u8..=4) {
            let da = Decimal::new(a, 10, sa).unwrap();
            let db = Decimal::new(b, 10, sb).unwrap();
            let fa = da.to_f64();
            let fb = db.to_f64();
            // Five significant digits are exact in an f64.
            prop_assert_eq!(da.cmp(&db), fa.partial_cmp(&fb).unwrap());
        }
    }
}
