//! Support for the SQL DATE data type.

use std::fmt::{self, Debug, Formatter};

use chrono::{Datelike, Days, NaiveDate};
use num_traits::PrimInt;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{SqlResult, SqlRuntimeError};

/// A date in the Gregorian calendar, stored as a day count since the Unix
/// epoch (January 1, 1970).  The range of legal dates is 0001-01-01 to
/// 9999-12-31.
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    // since unix epoch
    days: i32,
}

impl Date {
    /// Create a [Date] from a number of days since the Unix epoch (January
    /// 1st, 1970).
    pub const fn new(days: i32) -> Self {
        Self { days }
    }

    /// Create a [Date] from a chrono [NaiveDate].
    pub fn from_naive_date(date: NaiveDate) -> Self {
        Self {
            days: (date - NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).num_days() as i32,
        }
    }

    /// The number of days in this [Date] since the Unix epoch (January 1,
    /// 1970).  The result is negative for dates before 1970.
    pub const fn days(&self) -> i32 {
        self.days
    }

    /// Convert a [Date] to a chrono [NaiveDate].
    pub fn to_naive_date(&self) -> NaiveDate {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        if self.days >= 0 {
            epoch.checked_add_days(Days::new(self.days as u64)).unwrap()
        } else {
            epoch
                .checked_sub_days(Days::new(self.days.unsigned_abs() as u64))
                .unwrap()
        }
    }

    /// The calendar year.
    pub fn year(&self) -> i32 {
        self.to_naive_date().year()
    }

    /// The calendar month, `1..=12`.
    pub fn month(&self) -> u32 {
        self.to_naive_date().month()
    }

    /// The day of the month, `1..=31`.
    pub fn day(&self) -> u32 {
        self.to_naive_date().day()
    }

    /// Parses a DATE literal in the `YYYY-MM-DD` format.
    pub fn parse(text: &str) -> SqlResult<Self> {
        match NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
            Ok(date) => Ok(Self::from_naive_date(date)),
            Err(e) => Err(SqlRuntimeError::from_string(format!(
                "Value cannot be cast to date: '{text}': {e}"
            ))),
        }
    }
}

impl<T> From<T> for Date
where
    i32: From<T>,
    T: PrimInt,
{
    /// Convert an integer representing the number of days since the Unix
    /// epoch (January 1st, 1970) to a [Date].
    fn from(value: T) -> Self {
        Self {
            days: i32::from(value),
        }
    }
}

impl Debug for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.to_naive_date().fmt(f)
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_naive_date().format("%Y-%m-%d"))
    }
}

impl Serialize for Date {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserialize a date from the `YYYY-MM-DD` format.
impl<'de> Deserialize<'de> for Date {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text: std::borrow::Cow<'de, str> = Deserialize::deserialize(deserializer)?;
        Date::parse(&text).map_err(|e| D::Error::custom(e.message()))
    }
}
