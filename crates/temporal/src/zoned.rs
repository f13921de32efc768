//! Time-zone-carrying temporal values.
//!
//! A [TimestampWithTimeZone] stores a UTC instant plus a zone identifier;
//! the zone drives display and field extraction but is not part of
//! equality.  A [TimeWithTimeZone] carries a fixed UTC offset only, because
//! a time of day without a date cannot resolve daylight-saving rules.

use std::{
    cmp::Ordering,
    fmt::{self, Debug, Display, Formatter},
    hash::{Hash, Hasher},
    str::FromStr,
};

use chrono::{Duration, LocalResult, Offset, TimeZone as _};
use chrono_tz::Tz;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::{
    error::{SqlResult, SqlRuntimeError},
    time::{Time, PICOS_PER_DAY, PICOS_PER_SECOND},
    timestamp::Timestamp,
};

const MAX_OFFSET_SECONDS: i32 = 14 * 3_600;

/// A time zone identifier: a fixed UTC offset or a named IANA zone.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeZoneId {
    /// A fixed offset east of UTC, in seconds.
    Offset(i32),
    /// A named zone with daylight-saving rules.
    Named(Tz),
}

impl TimeZoneId {
    /// UTC as a named zone.
    pub const UTC: TimeZoneId = TimeZoneId::Named(Tz::UTC);

    /// The offset from UTC in force at `instant` (a UTC timestamp), in
    /// seconds east.
    pub fn offset_at(&self, instant: &Timestamp) -> i32 {
        match self {
            TimeZoneId::Offset(seconds) => *seconds,
            TimeZoneId::Named(tz) => tz
                .offset_from_utc_datetime(&instant.to_naive_date_time())
                .fix()
                .local_minus_utc(),
        }
    }
}

impl FromStr for TimeZoneId {
    type Err = Box<SqlRuntimeError>;

    /// Parses `+08:00`-style fixed offsets and IANA zone names such as
    /// `America/New_York` or `UTC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let error = || SqlRuntimeError::from_string(format!("'{text}' is not a valid time zone"));
        if let Some(rest) = text.strip_prefix(['+', '-']) {
            let (hours, minutes) = rest.split_once(':').ok_or_else(error)?;
            let hours: i32 = hours.parse().map_err(|_| error())?;
            let minutes: i32 = minutes.parse().map_err(|_| error())?;
            if hours > 14 || minutes > 59 {
                return Err(error());
            }
            let magnitude = hours * 3_600 + minutes * 60;
            if magnitude > MAX_OFFSET_SECONDS {
                return Err(error());
            }
            let sign = if text.starts_with('-') { -1 } else { 1 };
            Ok(TimeZoneId::Offset(sign * magnitude))
        } else {
            Ok(TimeZoneId::Named(text.parse().map_err(|_| error())?))
        }
    }
}

impl Display for TimeZoneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TimeZoneId::Offset(seconds) => write_offset(f, *seconds),
            TimeZoneId::Named(tz) => write!(f, "{}", tz.name()),
        }
    }
}

impl Debug for TimeZoneId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

fn write_offset(f: &mut Formatter<'_>, seconds: i32) -> fmt::Result {
    let sign = if seconds < 0 { '-' } else { '+' };
    let magnitude = seconds.unsigned_abs();
    write!(f, "{}{:02}:{:02}", sign, magnitude / 3_600, magnitude % 3_600 / 60)
}

/// A time of day with a fixed UTC offset, at a declared precision.
///
/// Equality and ordering compare the UTC-normalized picosecond of day, so
/// `10:00:00+02:00` equals `08:00:00+00:00`.
#[derive(Clone, Copy)]
pub struct TimeWithTimeZone {
    time: Time,
    offset_seconds: i32,
}

impl TimeWithTimeZone {
    /// Creates a zoned time from a wall-clock time and an offset east of
    /// UTC in seconds.
    pub fn new(time: Time, offset_seconds: i32) -> SqlResult<Self> {
        if offset_seconds.abs() > MAX_OFFSET_SECONDS {
            return Err(SqlRuntimeError::from_string(format!(
                "invalid time zone offset: {offset_seconds} seconds"
            )));
        }
        Ok(Self {
            time,
            offset_seconds,
        })
    }

    /// The wall-clock time in the carried offset.
    pub fn time(&self) -> Time {
        self.time
    }

    /// The offset east of UTC, in seconds.
    pub fn offset_seconds(&self) -> i32 {
        self.offset_seconds
    }

    /// The declared precision, in `0..=12`.
    pub fn precision(&self) -> u8 {
        self.time.precision()
    }

    /// Re-expresses the same instant at a different offset.  Precision is
    /// preserved.
    pub fn at_offset(&self, offset_seconds: i32) -> SqlResult<Self> {
        let shift = (offset_seconds - self.offset_seconds) as i128 * PICOS_PER_SECOND as i128;
        let picos =
            (self.time.picoseconds() as i128 + shift).rem_euclid(PICOS_PER_DAY as i128) as u64;
        Self::new(Time::new_unchecked(picos, self.precision()), offset_seconds)
    }

    /// Re-declares the precision, rounding the wall-clock time half-up.
    /// The day carry has nowhere to go in a time-of-day value and wraps.
    pub fn round_to_precision(&self, precision: u8) -> SqlResult<Self> {
        let (time, _) = self.time.round_to_precision(precision)?;
        Self::new(time, self.offset_seconds)
    }

    fn utc_picos(&self) -> u64 {
        (self.time.picoseconds() as i128 - self.offset_seconds as i128 * PICOS_PER_SECOND as i128)
            .rem_euclid(PICOS_PER_DAY as i128) as u64
    }
}

impl Display for TimeWithTimeZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.time)?;
        write_offset(f, self.offset_seconds)
    }
}

impl Debug for TimeWithTimeZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl PartialEq for TimeWithTimeZone {
    fn eq(&self, other: &Self) -> bool {
        self.utc_picos() == other.utc_picos()
    }
}

impl Eq for TimeWithTimeZone {}

impl PartialOrd for TimeWithTimeZone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeWithTimeZone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.utc_picos().cmp(&other.utc_picos())
    }
}

impl Hash for TimeWithTimeZone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.utc_picos().hash(state);
    }
}

/// A timestamp with a time zone: a UTC instant plus the zone used for
/// display and field extraction.
///
/// Equality and ordering compare instants only.
#[derive(Clone, Copy)]
pub struct TimestampWithTimeZone {
    // UTC instant
    timestamp: Timestamp,
    zone: TimeZoneId,
}

impl TimestampWithTimeZone {
    /// Creates a zoned timestamp from a UTC instant and a zone.
    pub const fn from_utc(timestamp: Timestamp, zone: TimeZoneId) -> Self {
        Self { timestamp, zone }
    }

    /// Interprets `local` as a wall-clock reading in `zone` and resolves it
    /// to an instant (the SQL `with_timezone` function).
    ///
    /// During a backward transition the earlier of the two candidate
    /// instants is chosen; a reading inside a spring-forward gap resolves
    /// through the offset in force before the transition.
    pub fn from_local(local: Timestamp, zone: TimeZoneId) -> Self {
        let offset = match zone {
            TimeZoneId::Offset(seconds) => seconds,
            TimeZoneId::Named(tz) => {
                let naive = local.to_naive_date_time();
                match tz.from_local_datetime(&naive) {
                    LocalResult::Single(dt) => dt.offset().fix().local_minus_utc(),
                    LocalResult::Ambiguous(earliest, _) => earliest.offset().fix().local_minus_utc(),
                    LocalResult::None => {
                        let before = naive - Duration::days(1);
                        tz.offset_from_utc_datetime(&before).fix().local_minus_utc()
                    }
                }
            }
        };
        Self {
            timestamp: local.add_seconds(-offset as i64),
            zone,
        }
    }

    /// The UTC instant.
    pub fn utc_timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// The carried zone.
    pub fn zone(&self) -> TimeZoneId {
        self.zone
    }

    /// The declared precision, in `0..=12`.
    pub fn precision(&self) -> u8 {
        self.timestamp.precision()
    }

    /// The offset from UTC in force at this instant, in seconds east.
    pub fn offset_seconds(&self) -> i32 {
        self.zone.offset_at(&self.timestamp)
    }

    /// The wall-clock reading of this instant in the carried zone.
    pub fn local_timestamp(&self) -> Timestamp {
        self.timestamp.add_seconds(self.offset_seconds() as i64)
    }

    /// Re-expresses this instant in another zone (the SQL `AT TIME ZONE`
    /// operator).  The instant and the precision are preserved; only the
    /// wall-clock rendering changes.
    pub fn at_time_zone(&self, zone: TimeZoneId) -> Self {
        Self {
            timestamp: self.timestamp,
            zone,
        }
    }

    /// Re-declares the precision, rounding the instant half-up.
    pub fn round_to_precision(&self, precision: u8) -> SqlResult<Self> {
        Ok(Self {
            timestamp: self.timestamp.round_to_precision(precision)?,
            zone: self.zone,
        })
    }
}

impl Display for TimestampWithTimeZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.local_timestamp(), self.zone)
    }
}

impl Debug for TimestampWithTimeZone {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl PartialEq for TimestampWithTimeZone {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp
    }
}

impl Eq for TimestampWithTimeZone {}

impl PartialOrd for TimestampWithTimeZone {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimestampWithTimeZone {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

impl Hash for TimestampWithTimeZone {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.timestamp.hash(state);
    }
}

impl Serialize for TimestampWithTimeZone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialize a zoned timestamp from the
/// `YYYY-MM-DD HH:MM:SS.fff <zone>` format.
impl<'de> Deserialize<'de> for TimestampWithTimeZone {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        let (datetime, zone) = text
            .trim()
            .rsplit_once(' ')
            .ok_or_else(|| D::Error::custom(format!("invalid zoned timestamp '{text}'")))?;
        let local = Timestamp::parse(datetime).map_err(|e| D::Error::custom(e.message()))?;
        let zone: TimeZoneId = zone.parse().map_err(|e: Box<SqlRuntimeError>| {
            D::Error::custom(e.message().to_string())
        })?;
        Ok(Self::from_local(local, zone))
    }
}

/// The SQL `with_timezone(timestamp, zone)` function: attaches a zone to a
/// naive timestamp, interpreting it as wall clock in that zone.
#[doc(hidden)]
pub fn with_timezone__(timestamp: Timestamp, zone: &str) -> SqlResult<TimestampWithTimeZone> {
    Ok(TimestampWithTimeZone::from_local(timestamp, zone.parse()?))
}

/// The SQL `AT TIME ZONE` operator on a zoned timestamp.
#[doc(hidden)]
pub fn at_timezone__(
    value: TimestampWithTimeZone,
    zone: &str,
) -> SqlResult<TimestampWithTimeZone> {
    Ok(value.at_time_zone(zone.parse()?))
}
