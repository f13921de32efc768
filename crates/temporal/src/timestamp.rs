//! Support for the SQL TIMESTAMP data type.

use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    ops::{Add, Sub},
};

use chrono::NaiveDateTime;
use num_traits::PrimInt;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    date::Date,
    error::{SqlResult, SqlRuntimeError},
    interval::ShortInterval,
    time::{Time, PICOS_PER_DAY, PICOS_PER_MILLISECOND, PICOS_PER_SECOND},
};

/// A date and a time of day without timezone information, at a declared
/// precision in `0..=12`.
///
/// The representation composes a [Date] (epoch day count) with a [Time]
/// (picosecond of day); the declared precision lives in the time component.
/// Rounding the precision delegates to the time-of-day rounding and applies
/// its day carry, so `23:59:59.9` rounded to precision 0 rolls the date
/// forward one day — the cross-component contract that the bare TIME cast
/// deliberately drops.
#[derive(Default, Clone, Copy)]
pub struct Timestamp {
    days: i32,
    time: Time,
}

impl Timestamp {
    /// Creates a [Timestamp] from a date and a time of day.
    pub const fn new(date: Date, time: Time) -> Self {
        Self {
            days: date.days(),
            time,
        }
    }

    /// Get the [Date] part of a [Timestamp].
    pub fn date(&self) -> Date {
        Date::new(self.days)
    }

    /// Get the time-of-day part of a [Timestamp].
    pub fn time(&self) -> Time {
        self.time
    }

    /// The declared precision, in `0..=12`.
    pub fn precision(&self) -> u8 {
        self.time.precision()
    }

    /// Re-declares this value at `precision`.  Narrowing rounds the time of
    /// day half-up; a rounding that wraps past midnight carries into the
    /// date.
    pub fn round_to_precision(&self, precision: u8) -> SqlResult<Self> {
        let (time, day_carry) = self.time.round_to_precision(precision)?;
        Ok(Self {
            days: self.days + day_carry as i32,
            time,
        })
    }

    /// Replaces the date component, keeping the time of day.
    pub fn with_date(&self, date: Date) -> Self {
        Self {
            days: date.days(),
            time: self.time,
        }
    }

    /// Shifts this timestamp by a whole number of seconds, carrying across
    /// day boundaries.  Sub-second digits and precision are unchanged.
    pub(crate) fn add_seconds(&self, seconds: i64) -> Self {
        let total = self.days as i64 * 86_400 + self.time.picoseconds() as i64 / PICOS_PER_SECOND as i64
            + seconds;
        let days = total.div_euclid(86_400);
        let second_of_day = total.rem_euclid(86_400) as u64;
        Self {
            days: days as i32,
            time: Time::new_unchecked(
                second_of_day * PICOS_PER_SECOND + self.time.fraction_picos(),
                self.precision(),
            ),
        }
    }

    /// Shifts this timestamp by a picosecond delta, carrying across day
    /// boundaries.  The result precision is unchanged; callers are expected
    /// to shift by multiples of the precision factor.
    pub(crate) fn add_picos(&self, delta: i128) -> Self {
        let total = self.days as i128 * PICOS_PER_DAY as i128 + self.time.picoseconds() as i128 + delta;
        let days = total.div_euclid(PICOS_PER_DAY as i128);
        let picos = total.rem_euclid(PICOS_PER_DAY as i128);
        Self {
            days: days as i32,
            time: Time::new_unchecked(picos as u64, self.precision()),
        }
    }

    /// Picoseconds since the epoch, exact for the full representable range.
    pub(crate) fn epoch_picos(&self) -> i128 {
        self.days as i128 * PICOS_PER_DAY as i128 + self.time.picoseconds() as i128
    }

    /// Milliseconds since the epoch, truncated toward negative infinity.
    pub fn epoch_millis(&self) -> i64 {
        self.days as i64 * 86_400_000 + (self.time.picoseconds() / PICOS_PER_MILLISECOND) as i64
    }

    /// Creates a [Timestamp] from a number of milliseconds since the epoch,
    /// at precision 3.
    pub fn from_epoch_millis(milliseconds: i64) -> Self {
        let days = milliseconds.div_euclid(86_400_000);
        let millis_of_day = milliseconds.rem_euclid(86_400_000) as u64;
        Self {
            days: days as i32,
            time: Time::new_unchecked(millis_of_day * PICOS_PER_MILLISECOND, 3),
        }
    }

    /// Creates a [Timestamp] from a number of nanoseconds since the epoch,
    /// at precision 9.
    pub fn from_epoch_nanos(nanoseconds: i64) -> Self {
        const NANOS_PER_DAY: i64 = 86_400_000_000_000;
        let days = nanoseconds.div_euclid(NANOS_PER_DAY);
        let nanos_of_day = nanoseconds.rem_euclid(NANOS_PER_DAY) as u64;
        Self {
            days: days as i32,
            time: Time::new_unchecked(nanos_of_day * 1_000, 9),
        }
    }

    /// Converts to a chrono [NaiveDateTime], truncating below nanoseconds.
    pub fn to_naive_date_time(&self) -> NaiveDateTime {
        self.date().to_naive_date().and_time(self.time.to_naive_time())
    }

    /// Creates a [Timestamp] from a chrono [NaiveDateTime] at nanosecond
    /// precision.
    pub fn from_naive_date_time(value: NaiveDateTime) -> Self {
        Self {
            days: Date::from_naive_date(value.date()).days(),
            time: Time::from_naive_time(value.time()),
        }
    }

    /// Parses a TIMESTAMP literal: a date, a space or `T`, and a time, e.g.
    /// `2023-09-28 12:34:56.789`.  The parsed precision is the number of
    /// fraction digits written.
    pub fn parse(text: &str) -> SqlResult<Self> {
        let trimmed = text.trim();
        let error = || {
            SqlRuntimeError::from_string(format!("Value cannot be cast to timestamp: '{text}'"))
        };
        let split = trimmed
            .char_indices()
            .find(|(_, c)| *c == ' ' || *c == 'T')
            .map(|(i, _)| i)
            .ok_or_else(error)?;
        let date = Date::parse(&trimmed[..split]).map_err(|_| error())?;
        let time = Time::parse(&trimmed[split + 1..]).map_err(|_| error())?;
        Ok(Self::new(date, time))
    }
}

impl<T> From<T> for Timestamp
where
    i64: From<T>,
    T: PrimInt,
{
    /// Convert a value expressing a number of milliseconds since the Unix
    /// epoch (January 1st, 1970) into a [Timestamp].
    fn from(value: T) -> Self {
        Self::from_epoch_millis(i64::from(value))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date(), self.time)
    }
}

impl Debug for Timestamp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.days, self.time).cmp(&(other.days, other.time))
    }
}

impl Hash for Timestamp {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.days.hash(state);
        self.time.hash(state);
    }
}

impl Add<ShortInterval> for Timestamp {
    type Output = Self;

    fn add(self, rhs: ShortInterval) -> Self {
        let widened = Self {
            days: self.days,
            time: Time::new_unchecked(self.time.picoseconds(), self.precision().max(3)),
        };
        widened.add_picos(rhs.milliseconds() as i128 * PICOS_PER_MILLISECOND as i128)
    }
}

impl Sub<ShortInterval> for Timestamp {
    type Output = Self;

    fn sub(self, rhs: ShortInterval) -> Self {
        self + ShortInterval::new(-rhs.milliseconds())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialize a timestamp from the `YYYY-MM-DD HH:MM:SS.fff` format.
impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(|e| D::Error::custom(e.message()))
    }
}

/// Casts a TIMESTAMP to a different precision, applying the day carry when
/// the time-of-day rounding wraps past midnight.
#[doc(hidden)]
pub fn cast_to_Timestamp_Timestamp(value: Timestamp, precision: u8) -> SqlResult<Timestamp> {
    value.round_to_precision(precision)
}

/// Parses a TIMESTAMP literal at the given target precision.
#[doc(hidden)]
pub fn cast_to_Timestamp_s(value: &str, precision: u8) -> SqlResult<Timestamp> {
    cast_to_Timestamp_Timestamp(Timestamp::parse(value)?, precision)
}

/// Converts a TIMESTAMP to a DATE, discarding the time of day.
#[doc(hidden)]
pub fn cast_to_Date_Timestamp(value: Timestamp) -> Date {
    value.date()
}

/// Converts a DATE to a TIMESTAMP at midnight, precision 0.
#[doc(hidden)]
pub fn cast_to_Timestamp_Date(value: Date) -> Timestamp {
    Timestamp::new(value, Time::MIDNIGHT)
}

#[cfg(test)]
mod test {
    use super::{cast_to_Timestamp_Timestamp, Timestamp};
    use crate::interval::ShortInterval;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn parse_literal() {
        assert_eq!(ts("2023-09-28 12:34:56.5").to_string(), "2023-09-28 12:34:56.5");
        assert_eq!(ts("2023-09-28T12:34:56").to_string(), "2023-09-28 12:34:56");
        assert_eq!(ts("1969-12-31 23:00:00").date().days(), -1);
        assert!(Timestamp::parse("2023-09-28").is_err());
        assert!(Timestamp::parse("2023-09-28 12:34:56.1234567890123").is_err());
    }

    #[test]
    fn rounding_carries_into_date() {
        let rounded = cast_to_Timestamp_Timestamp(ts("2023-09-28 23:59:59.999999999999"), 0).unwrap();
        assert_eq!(rounded, ts("2023-09-29 00:00:00"));

        let rounded = cast_to_Timestamp_Timestamp(ts("2023-12-31 23:59:59.5"), 0).unwrap();
        assert_eq!(rounded, ts("2024-01-01 00:00:00"));

        let unrounded = cast_to_Timestamp_Timestamp(ts("2023-12-31 23:59:59.4"), 0).unwrap();
        assert_eq!(unrounded, ts("2023-12-31 23:59:59"));
    }

    #[test]
    fn epoch_conversions() {
        assert_eq!(ts("1970-01-01 00:00:00").epoch_millis(), 0);
        assert_eq!(ts("1969-12-31 23:59:59").epoch_millis(), -1_000);
        assert_eq!(
            Timestamp::from_epoch_millis(1_529_501_823_000).to_string(),
            "2018-06-20 13:37:03.000"
        );
        assert_eq!(
            Timestamp::from_epoch_nanos(-1).to_string(),
            "1969-12-31 23:59:59.999999999"
        );
    }

    #[test]
    fn interval_arithmetic_crosses_days() {
        assert_eq!(
            ts("2023-09-28 23:30:00") + ShortInterval::hours(1),
            ts("2023-09-29 00:30:00")
        );
        assert_eq!(
            ts("2023-09-28 00:30:00") - ShortInterval::hours(1),
            ts("2023-09-27 23:30:00")
        );
    }

    #[test]
    fn serde_round_trip() {
        let t = ts("2018-06-20 13:37:03.123");
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "\"2018-06-20 13:37:03.123\"");
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), t);
    }
}
