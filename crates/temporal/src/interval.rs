//! Support for SQL interval types.
//! Intervals are differences between dates and/or times.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::{
    error::{SqlResult, SqlRuntimeError},
    some_function1,
};

/// A ShortInterval can express a difference between two [Time](crate::Time)
/// values, two [Date](crate::Date) values, or two
/// [Timestamp](crate::Timestamp) values.  The representation is a (positive
/// or negative) number of milliseconds.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ShortInterval {
    milliseconds: i64,
}

impl ShortInterval {
    /// Create a ShortInterval with a length specified in milliseconds.
    pub const fn new(milliseconds: i64) -> Self {
        Self { milliseconds }
    }

    /// An interval of `seconds` seconds.
    pub const fn seconds(seconds: i64) -> Self {
        Self::new(seconds * 1_000)
    }

    /// An interval of `minutes` minutes.
    pub const fn minutes(minutes: i64) -> Self {
        Self::new(minutes * 60_000)
    }

    /// An interval of `hours` hours.
    pub const fn hours(hours: i64) -> Self {
        Self::new(hours * 3_600_000)
    }

    /// An interval of `days` 24-hour days.
    pub const fn days(days: i64) -> Self {
        Self::new(days * 86_400_000)
    }

    /// Extract the length of the interval in milliseconds.  The result can
    /// be negative.
    pub fn milliseconds(&self) -> i64 {
        self.milliseconds
    }

    /// Extract the length of the interval in nanoseconds.  The granularity
    /// of the representation is milliseconds, so the result is always a
    /// multiple of one million.
    pub fn nanoseconds(&self) -> i64 {
        self.milliseconds * 1_000_000
    }
}

impl Neg for ShortInterval {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.milliseconds)
    }
}

impl Add for ShortInterval {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.milliseconds + rhs.milliseconds)
    }
}

impl Sub for ShortInterval {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.milliseconds - rhs.milliseconds)
    }
}

impl Mul<i64> for ShortInterval {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self {
        Self::new(self.milliseconds * rhs)
    }
}

/// A LongInterval expresses a difference between dates or timestamps in
/// whole calendar months.  Calendar arithmetic with a LongInterval is
/// month-aware (adding one month to January 31 yields February 28 or 29).
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct LongInterval {
    months: i32,
}

impl LongInterval {
    /// Create a LongInterval with a length specified in months.
    pub const fn new(months: i32) -> Self {
        Self { months }
    }

    /// An interval of `years` calendar years.
    pub const fn years(years: i32) -> Self {
        Self::new(years * 12)
    }

    /// Extract the length of the interval in months.  The result can be
    /// negative.
    pub fn months(&self) -> i32 {
        self.months
    }
}

impl Neg for LongInterval {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.months)
    }
}

impl Add for LongInterval {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.months + rhs.months)
    }
}

impl Sub for LongInterval {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.months - rhs.months)
    }
}

impl Mul<i32> for LongInterval {
    type Output = Self;

    fn mul(self, rhs: i32) -> Self {
        Self::new(self.months * rhs)
    }
}

/// Parses a duration string such as `"150ms"`, `"2.5m"` or `"1 h"` into a
/// millisecond interval.  The accepted units are `ns`, `us`, `ms`, `s`,
/// `m`, `h` and `d`; the numeric part may be fractional.  Sub-millisecond
/// results round half-up to whole milliseconds.
#[doc(hidden)]
pub fn parse_duration_(text: &str) -> SqlResult<ShortInterval> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SqlRuntimeError::from_string("duration is empty".to_string()));
    }
    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(digits_end);
    let value: f64 = number.parse().map_err(|_| {
        SqlRuntimeError::from_string(format!(
            "duration is not a valid data duration string: {text}"
        ))
    })?;
    let millis_per_unit = match unit.trim() {
        "ns" => 1e-6,
        "us" => 1e-3,
        "ms" => 1.0,
        "s" => 1_000.0,
        "m" => 60_000.0,
        "h" => 3_600_000.0,
        "d" => 86_400_000.0,
        unknown => {
            return Err(SqlRuntimeError::from_string(format!(
                "Unknown time unit: {unknown}"
            )))
        }
    };
    Ok(ShortInterval::new((value * millis_per_unit).round() as i64))
}

/// The length of an interval in milliseconds, as the SQL `to_milliseconds`
/// function reports it.
#[doc(hidden)]
pub fn to_milliseconds_(interval: ShortInterval) -> i64 {
    interval.milliseconds()
}

some_function1!(to_milliseconds, ShortInterval, i64);
