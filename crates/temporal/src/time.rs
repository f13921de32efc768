//! Support for the SQL TIME data type.
//!
//! A [Time] is a time of day stored as a count of picoseconds since
//! midnight, together with a declared precision in `0..=12` (the number of
//! significant fractional-second digits).  The stored count is always a
//! multiple of `10**(12 - precision)`: narrowing a value rounds it half-up
//! and zeroes the digits below the new precision, so the representation
//! carries trailing zero-padding rather than truncated storage.

use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, Sub},
};

use chrono::{NaiveTime, Timelike};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::{SqlResult, SqlRuntimeError},
    interval::ShortInterval,
};

/// The maximum number of fractional-second digits a TIME can declare.
pub const MAX_TIME_PRECISION: u8 = 12;

pub(crate) const PICOS_PER_MILLISECOND: u64 = 1_000_000_000;
pub(crate) const PICOS_PER_SECOND: u64 = 1_000_000_000_000;
pub(crate) const PICOS_PER_MINUTE: u64 = 60 * PICOS_PER_SECOND;
pub(crate) const PICOS_PER_HOUR: u64 = 3_600 * PICOS_PER_SECOND;
pub(crate) const PICOS_PER_DAY: u64 = 86_400 * PICOS_PER_SECOND;

/// Returns `10**(12 - precision)`, the picosecond weight of one unit in the
/// last declared digit.
pub(crate) const fn precision_factor(precision: u8) -> u64 {
    10u64.pow((MAX_TIME_PRECISION - precision) as u32)
}

pub(crate) fn check_precision(precision: u8) -> SqlResult<()> {
    if precision > MAX_TIME_PRECISION {
        return Err(SqlRuntimeError::from_string(format!(
            "TIME precision must be in range [0, 12]: {precision}"
        )));
    }
    Ok(())
}

/// A time of day at a declared precision.  The legal range is 00:00:00 to
/// 23:59:59.999999999999; times are always positive.
///
/// Equality, ordering, and hashing compare the stored picosecond count only;
/// the declared precision affects rendering and further rounding but not
/// identity.
#[derive(Clone, Copy)]
pub struct Time {
    picoseconds: u64,
    precision: u8,
}

impl Time {
    /// Midnight at precision 0.
    pub const MIDNIGHT: Time = Time {
        picoseconds: 0,
        precision: 0,
    };

    /// Creates a [Time] from a picosecond-of-day count and a declared
    /// precision.  The count must be in range and must not carry digits
    /// below the declared precision.
    pub fn new(picoseconds: u64, precision: u8) -> SqlResult<Self> {
        check_precision(precision)?;
        if picoseconds >= PICOS_PER_DAY {
            return Err(SqlRuntimeError::from_string(format!(
                "time-of-day value out of range: {picoseconds} picoseconds"
            )));
        }
        if picoseconds % precision_factor(precision) != 0 {
            return Err(SqlRuntimeError::from_string(format!(
                "time value {picoseconds} carries digits below precision {precision}"
            )));
        }
        Ok(Self {
            picoseconds,
            precision,
        })
    }

    /// Creates a [Time] from a full-precision picosecond-of-day count.
    pub fn from_picoseconds(picoseconds: u64) -> SqlResult<Self> {
        Self::new(picoseconds, MAX_TIME_PRECISION)
    }

    pub(crate) const fn new_unchecked(picoseconds: u64, precision: u8) -> Self {
        Self {
            picoseconds,
            precision,
        }
    }

    /// The number of picoseconds since midnight.
    pub fn picoseconds(&self) -> u64 {
        self.picoseconds
    }

    /// The declared precision, in `0..=12`.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Re-declares this value at `precision`, rounding if necessary.
    ///
    /// Widening is exact: the stored count is unchanged and only the
    /// declared precision grows, so digits discarded by an earlier rounding
    /// are never recovered.  Narrowing rounds half-up (ties toward the next
    /// whole unit) to a multiple of `10**(12 - precision)`.
    ///
    /// A rounding that crosses the day boundary wraps to 00:00:00 and
    /// reports `day_carry = true`; a bare TIME discards the carry
    /// ([cast_to_Time_Time]), while a containing timestamp must apply it as
    /// an extra day.
    pub fn round_to_precision(&self, precision: u8) -> SqlResult<(Time, bool)> {
        check_precision(precision)?;
        if precision >= self.precision {
            return Ok((
                Self {
                    picoseconds: self.picoseconds,
                    precision,
                },
                false,
            ));
        }
        let factor = precision_factor(precision);
        let rounded = (self.picoseconds + factor / 2) / factor * factor;
        if rounded >= PICOS_PER_DAY {
            Ok((Self::new_unchecked(0, precision), true))
        } else {
            Ok((Self::new_unchecked(rounded, precision), false))
        }
    }

    /// Creates a [Time] from broken-down fields.  `fraction` is a
    /// picosecond count below one second, already padded to the declared
    /// precision.
    pub fn from_hms_picos(
        hour: u32,
        minute: u32,
        second: u32,
        fraction: u64,
        precision: u8,
    ) -> SqlResult<Self> {
        if hour > 23 || minute > 59 || second > 59 || fraction >= PICOS_PER_SECOND {
            return Err(SqlRuntimeError::from_string(format!(
                "invalid time fields {hour:02}:{minute:02}:{second:02} (+{fraction} ps)"
            )));
        }
        Self::new(
            hour as u64 * PICOS_PER_HOUR
                + minute as u64 * PICOS_PER_MINUTE
                + second as u64 * PICOS_PER_SECOND
                + fraction,
            precision,
        )
    }

    /// The hour of the day, `0..=23`.
    pub fn hour(&self) -> u32 {
        (self.picoseconds / PICOS_PER_HOUR) as u32
    }

    /// The minute of the hour, `0..=59`.
    pub fn minute(&self) -> u32 {
        (self.picoseconds % PICOS_PER_HOUR / PICOS_PER_MINUTE) as u32
    }

    /// The second of the minute, `0..=59`.
    pub fn second(&self) -> u32 {
        (self.picoseconds % PICOS_PER_MINUTE / PICOS_PER_SECOND) as u32
    }

    /// The sub-second part in picoseconds, `0..10**12`.
    pub fn fraction_picos(&self) -> u64 {
        self.picoseconds % PICOS_PER_SECOND
    }

    /// The combined seconds-and-milliseconds field, as SQL `EXTRACT`
    /// reports it: `second * 1000 + millisecond`.
    pub fn millisecond_of_minute(&self) -> u32 {
        (self.picoseconds % PICOS_PER_MINUTE / PICOS_PER_MILLISECOND) as u32
    }

    /// Converts to a chrono [NaiveTime], truncating below nanoseconds.
    pub fn to_naive_time(&self) -> NaiveTime {
        NaiveTime::from_num_seconds_from_midnight_opt(
            (self.picoseconds / PICOS_PER_SECOND) as u32,
            (self.fraction_picos() / 1_000) as u32,
        )
        .unwrap()
    }

    /// Creates a [Time] from a chrono [NaiveTime] at nanosecond precision.
    pub fn from_naive_time(time: NaiveTime) -> Self {
        // Leap-second nanoseconds (>= 10**9) fold into the last second.
        let nanos = time.nanosecond().min(999_999_999) as u64;
        Self::new_unchecked(
            time.num_seconds_from_midnight() as u64 * PICOS_PER_SECOND + nanos * 1_000,
            9,
        )
    }

    /// Parses a TIME literal: `HH:MM`, `HH:MM:SS` or `HH:MM:SS.fffff`, with
    /// up to twelve fraction digits.  The parsed precision is the number of
    /// fraction digits written.
    pub fn parse(text: &str) -> SqlResult<Self> {
        Self::parse_inner(text.trim()).ok_or_else(|| {
            SqlRuntimeError::from_string(format!("Value cannot be cast to time: '{text}'"))
        })
    }

    fn parse_inner(text: &str) -> Option<Self> {
        let mut fields = text.split(':');
        let hour: u32 = parse_field(fields.next()?, 2)?;
        let minute: u32 = parse_field(fields.next()?, 2)?;
        let (second, fraction, precision) = match fields.next() {
            None => (0, 0, 0),
            Some(second_text) => {
                let (whole, fraction_text) = match second_text.split_once('.') {
                    None => (second_text, ""),
                    Some((whole, fraction)) => (whole, fraction),
                };
                let second = parse_field(whole, 2)?;
                if fraction_text.len() > MAX_TIME_PRECISION as usize {
                    return None;
                }
                let mut picos = 0u64;
                for c in fraction_text.chars() {
                    picos = picos * 10 + c.to_digit(10)? as u64;
                }
                picos *= precision_factor(fraction_text.len() as u8);
                (second, picos, fraction_text.len() as u8)
            }
        };
        if fields.next().is_some() {
            return None;
        }
        Self::from_hms_picos(hour, minute, second, fraction, precision).ok()
    }
}

fn parse_field(text: &str, max_len: usize) -> Option<u32> {
    if text.is_empty() || text.len() > max_len || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

impl Display for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}",
            self.hour(),
            self.minute(),
            self.second()
        )?;
        if self.precision > 0 {
            let digits = self.fraction_picos() / precision_factor(self.precision);
            write!(f, ".{:0width$}", digits, width = self.precision as usize)?;
        }
        Ok(())
    }
}

impl Debug for Time {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::MIDNIGHT
    }
}

impl PartialEq for Time {
    fn eq(&self, other: &Self) -> bool {
        self.picoseconds == other.picoseconds
    }
}

impl Eq for Time {}

impl PartialOrd for Time {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Time {
    fn cmp(&self, other: &Self) -> Ordering {
        self.picoseconds.cmp(&other.picoseconds)
    }
}

impl Hash for Time {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.picoseconds.hash(state);
    }
}

impl Add<ShortInterval> for Time {
    type Output = Self;

    /// Adds an interval, wrapping modulo 24 hours.  The result precision is
    /// at least 3 (the interval granularity is milliseconds).
    fn add(self, rhs: ShortInterval) -> Self {
        let precision = self.precision.max(3);
        let delta = rhs.milliseconds() as i128 * PICOS_PER_MILLISECOND as i128;
        let wrapped = (self.picoseconds as i128 + delta).rem_euclid(PICOS_PER_DAY as i128);
        Self::new_unchecked(wrapped as u64, precision)
    }
}

impl Sub<ShortInterval> for Time {
    type Output = Self;

    fn sub(self, rhs: ShortInterval) -> Self {
        self + ShortInterval::new(-rhs.milliseconds())
    }
}

impl Serialize for Time {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialize a time from the `HH:MM:SS.fff` format.
impl<'de> Deserialize<'de> for Time {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        Time::parse(&text).map_err(|e| D::Error::custom(e.message()))
    }
}

/// Casts a TIME to a different precision, discarding any day carry produced
/// by rounding near midnight (the carry is surfaced only through timestamp
/// casts).
#[doc(hidden)]
pub fn cast_to_Time_Time(value: Time, precision: u8) -> SqlResult<Time> {
    Ok(value.round_to_precision(precision)?.0)
}

/// Parses a TIME literal at the given target precision.
#[doc(hidden)]
pub fn cast_to_Time_s(value: &str, precision: u8) -> SqlResult<Time> {
    cast_to_Time_Time(Time::parse(value)?, precision)
}
