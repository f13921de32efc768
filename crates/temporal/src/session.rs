//! The session clock surface: `CURRENT_DATE`, `CURRENT_TIME`, `LOCALTIME`,
//! `LOCALTIMESTAMP` and `CURRENT_TIMESTAMP`.
//!
//! SQL requires every reading of the clock within one query to observe the
//! same instant, so the instant is captured once in a [Session] handle and
//! passed explicitly; there is no process-wide singleton.

use chrono::Utc;

use crate::{
    date::Date,
    error::SqlResult,
    time::Time,
    timestamp::Timestamp,
    zoned::{TimeZoneId, TimeWithTimeZone, TimestampWithTimeZone},
};

/// The temporal context of one query: the query start instant and the
/// session time zone.
#[derive(Clone, Copy, Debug)]
pub struct Session {
    start: TimestampWithTimeZone,
}

impl Session {
    /// Creates a session pinned to an explicit start instant.  Tests use
    /// this to make the clock functions deterministic.
    pub const fn with_start(start: TimestampWithTimeZone) -> Self {
        Self { start }
    }

    /// Creates a session reading the system clock, in the given zone.  The
    /// captured instant has millisecond precision, matching the engine's
    /// wall clock granularity.
    pub fn now(zone: TimeZoneId) -> Self {
        let instant = Timestamp::from_epoch_millis(Utc::now().timestamp_millis());
        Self {
            start: TimestampWithTimeZone::from_utc(instant, zone),
        }
    }

    /// The query start instant.
    pub fn start(&self) -> TimestampWithTimeZone {
        self.start
    }

    /// `CURRENT_DATE`: the date at query start, in the session zone.
    pub fn current_date(&self) -> Date {
        self.start.local_timestamp().date()
    }

    /// `CURRENT_TIME`: the time of day at query start, with the session
    /// zone's offset.
    pub fn current_time(&self) -> SqlResult<TimeWithTimeZone> {
        TimeWithTimeZone::new(
            self.start.local_timestamp().time(),
            self.start.offset_seconds(),
        )
    }

    /// `LOCALTIME`: the wall-clock time of day at query start.
    pub fn localtime(&self) -> Time {
        self.start.local_timestamp().time()
    }

    /// `LOCALTIMESTAMP`: the wall-clock timestamp at query start, at the
    /// requested precision.
    pub fn localtimestamp(&self, precision: u8) -> SqlResult<Timestamp> {
        self.start.local_timestamp().round_to_precision(precision)
    }

    /// `CURRENT_TIMESTAMP`: the query start instant with the session zone,
    /// at the requested precision.
    pub fn current_timestamp(&self, precision: u8) -> SqlResult<TimestampWithTimeZone> {
        self.start.round_to_precision(precision)
    }
}

#[cfg(test)]
mod test {
    use super::Session;
    use crate::{
        timestamp::Timestamp,
        zoned::{TimeZoneId, TimestampWithTimeZone},
    };

    fn session() -> Session {
        let start = TimestampWithTimeZone::from_utc(
            Timestamp::parse("2023-09-28 22:15:30.123").unwrap(),
            "+05:30".parse().unwrap(),
        );
        Session::with_start(start)
    }

    #[test]
    fn clock_functions_share_the_start_instant() {
        let session = session();
        // 22:15 UTC is 03:45 the next day at +05:30.
        assert_eq!(session.current_date().to_string(), "2023-09-29");
        assert_eq!(session.localtime().to_string(), "03:45:30.123");
        assert_eq!(
            session.localtimestamp(3).unwrap().to_string(),
            "2023-09-29 03:45:30.123"
        );
        assert_eq!(
            session.localtimestamp(0).unwrap().to_string(),
            "2023-09-29 03:45:30"
        );
        assert_eq!(
            session.current_time().unwrap().to_string(),
            "03:45:30.123 +05:30"
        );
        assert_eq!(
            session.current_timestamp(3).unwrap().to_string(),
            "2023-09-29 03:45:30.123 +05:30"
        );
    }

    #[test]
    fn now_is_well_formed() {
        let session = Session::now(TimeZoneId::UTC);
        assert_eq!(session.start().precision(), 3);
        assert!(session.current_date().days() > 19_000);
    }
}
