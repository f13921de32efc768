//! The temporal arithmetic engine: `date_add`, `date_diff`, `date_trunc`,
//! `extract` and friends, dispatched on lower-case unit names.

use std::str::FromStr;

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::{
    date::Date,
    error::{SqlResult, SqlRuntimeError},
    some_polymorphic_function1, some_polymorphic_function2,
    time::{Time, PICOS_PER_HOUR, PICOS_PER_MILLISECOND, PICOS_PER_MINUTE, PICOS_PER_SECOND},
    timestamp::Timestamp,
    zoned::TimestampWithTimeZone,
};

const PICOS_PER_DAY_I128: i128 = 86_400_000_000_000_000;

/// A date/time unit or extraction field, parsed from its lower-case SQL
/// name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateTimeUnit {
    /// `millisecond`
    Millisecond,
    /// `second`
    Second,
    /// `minute`
    Minute,
    /// `hour`
    Hour,
    /// `day` / `day_of_month`
    Day,
    /// `week` / `week_of_year`
    Week,
    /// `month`
    Month,
    /// `quarter`
    Quarter,
    /// `year`
    Year,
    /// `day_of_week` / `dow`
    DayOfWeek,
    /// `day_of_year` / `doy`
    DayOfYear,
    /// `year_of_week` / `yow`
    YearOfWeek,
    /// `timezone_hour`
    TimezoneHour,
    /// `timezone_minute`
    TimezoneMinute,
}

impl FromStr for DateTimeUnit {
    type Err = Box<SqlRuntimeError>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "millisecond" => Self::Millisecond,
            "second" => Self::Second,
            "minute" => Self::Minute,
            "hour" => Self::Hour,
            "day" | "day_of_month" => Self::Day,
            "week" | "week_of_year" => Self::Week,
            "month" => Self::Month,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            "day_of_week" | "dow" => Self::DayOfWeek,
            "day_of_year" | "doy" => Self::DayOfYear,
            "year_of_week" | "yow" => Self::YearOfWeek,
            "timezone_hour" => Self::TimezoneHour,
            "timezone_minute" => Self::TimezoneMinute,
            other => {
                return Err(SqlRuntimeError::from_string(format!(
                    "'{other}' is not a valid date/time unit"
                )))
            }
        })
    }
}

impl std::fmt::Display for DateTimeUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Millisecond => "millisecond",
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
            Self::DayOfWeek => "day_of_week",
            Self::DayOfYear => "day_of_year",
            Self::YearOfWeek => "year_of_week",
            Self::TimezoneHour => "timezone_hour",
            Self::TimezoneMinute => "timezone_minute",
        })
    }
}

impl DateTimeUnit {
    /// The fixed length of this unit in picoseconds, for units no coarser
    /// than a 24-hour day.
    fn picoseconds(&self) -> Option<i128> {
        Some(match self {
            Self::Millisecond => PICOS_PER_MILLISECOND as i128,
            Self::Second => PICOS_PER_SECOND as i128,
            Self::Minute => PICOS_PER_MINUTE as i128,
            Self::Hour => PICOS_PER_HOUR as i128,
            Self::Day => PICOS_PER_DAY_I128,
            Self::Week => 7 * PICOS_PER_DAY_I128,
            _ => return None,
        })
    }

    fn invalid_for(&self, type_name: &str) -> Box<SqlRuntimeError> {
        SqlRuntimeError::from_string(format!("'{self}' is not a valid {type_name} field"))
    }
}

//////////////////////////// date_trunc

#[doc(hidden)]
pub fn date_trunc_millisecond_Time(value: Time) -> Time {
    trunc_time_to(value, PICOS_PER_MILLISECOND)
}

#[doc(hidden)]
pub fn date_trunc_second_Time(value: Time) -> Time {
    trunc_time_to(value, PICOS_PER_SECOND)
}

#[doc(hidden)]
pub fn date_trunc_minute_Time(value: Time) -> Time {
    trunc_time_to(value, PICOS_PER_MINUTE)
}

#[doc(hidden)]
pub fn date_trunc_hour_Time(value: Time) -> Time {
    trunc_time_to(value, PICOS_PER_HOUR)
}

/// Zeroes every digit finer than `unit_picos` while keeping the declared
/// precision.
fn trunc_time_to(value: Time, unit_picos: u64) -> Time {
    Time::new(
        value.picoseconds() / unit_picos * unit_picos,
        value.precision(),
    )
    .unwrap()
}

some_polymorphic_function1!(date_trunc_millisecond, Time, Time, Time);
some_polymorphic_function1!(date_trunc_second, Time, Time, Time);
some_polymorphic_function1!(date_trunc_minute, Time, Time, Time);
some_polymorphic_function1!(date_trunc_hour, Time, Time, Time);

/// `date_trunc(unit, time)`: zeroes all fields finer than `unit`.  The
/// declared precision is preserved.
pub fn date_trunc_Time(unit: &str, value: Time) -> SqlResult<Time> {
    let unit: DateTimeUnit = unit.parse()?;
    match unit {
        DateTimeUnit::Millisecond => Ok(date_trunc_millisecond_Time(value)),
        DateTimeUnit::Second => Ok(date_trunc_second_Time(value)),
        DateTimeUnit::Minute => Ok(date_trunc_minute_Time(value)),
        DateTimeUnit::Hour => Ok(date_trunc_hour_Time(value)),
        _ => Err(unit.invalid_for("TIME")),
    }
}

#[doc(hidden)]
pub fn date_trunc_day_Date(value: Date) -> Date {
    value
}

#[doc(hidden)]
pub fn date_trunc_week_Date(value: Date) -> Date {
    let naive = value.to_naive_date();
    let days_from_monday = naive.weekday().num_days_from_monday() as u64;
    Date::from_naive_date(naive - Days::new(days_from_monday))
}

#[doc(hidden)]
pub fn date_trunc_month_Date(value: Date) -> Date {
    let naive = value.to_naive_date();
    Date::from_naive_date(NaiveDate::from_ymd_opt(naive.year(), naive.month(), 1).unwrap())
}

#[doc(hidden)]
pub fn date_trunc_quarter_Date(value: Date) -> Date {
    let naive = value.to_naive_date();
    let month = naive.month0() / 3 * 3 + 1;
    Date::from_naive_date(NaiveDate::from_ymd_opt(naive.year(), month, 1).unwrap())
}

#[doc(hidden)]
pub fn date_trunc_year_Date(value: Date) -> Date {
    let naive = value.to_naive_date();
    Date::from_naive_date(NaiveDate::from_ymd_opt(naive.year(), 1, 1).unwrap())
}

some_polymorphic_function1!(date_trunc_day, Date, Date, Date);
some_polymorphic_function1!(date_trunc_week, Date, Date, Date);
some_polymorphic_function1!(date_trunc_month, Date, Date, Date);
some_polymorphic_function1!(date_trunc_quarter, Date, Date, Date);
some_polymorphic_function1!(date_trunc_year, Date, Date, Date);

/// `date_trunc(unit, date)`.
pub fn date_trunc_Date(unit: &str, value: Date) -> SqlResult<Date> {
    let unit: DateTimeUnit = unit.parse()?;
    match unit {
        DateTimeUnit::Day => Ok(date_trunc_day_Date(value)),
        DateTimeUnit::Week => Ok(date_trunc_week_Date(value)),
        DateTimeUnit::Month => Ok(date_trunc_month_Date(value)),
        DateTimeUnit::Quarter => Ok(date_trunc_quarter_Date(value)),
        DateTimeUnit::Year => Ok(date_trunc_year_Date(value)),
        _ => Err(unit.invalid_for("DATE")),
    }
}

/// `date_trunc(unit, timestamp)`.
pub fn date_trunc_Timestamp(unit: &str, value: Timestamp) -> SqlResult<Timestamp> {
    let parsed: DateTimeUnit = unit.parse()?;
    match parsed {
        DateTimeUnit::Millisecond | DateTimeUnit::Second | DateTimeUnit::Minute | DateTimeUnit::Hour => {
            Ok(Timestamp::new(value.date(), date_trunc_Time(unit, value.time())?))
        }
        DateTimeUnit::Day | DateTimeUnit::Week | DateTimeUnit::Month | DateTimeUnit::Quarter
        | DateTimeUnit::Year => {
            let date = date_trunc_Date(unit, value.date())?;
            let midnight = Time::new(0, value.precision()).unwrap();
            Ok(Timestamp::new(date, midnight))
        }
        _ => Err(parsed.invalid_for("TIMESTAMP")),
    }
}

//////////////////////////// date_add

/// `date_add(unit, n, time)`: adds `n` units, wrapping modulo 24 hours.
/// The intermediate arithmetic is 128-bit, so any `i64` count wraps
/// correctly instead of overflowing.  Units of a whole day and coarser have
/// no sub-day component and leave the value unchanged.
pub fn date_add_Time(unit: &str, count: i64, value: Time) -> SqlResult<Time> {
    let unit: DateTimeUnit = unit.parse()?;
    let Some(unit_picos) = unit.picoseconds() else {
        // Calendar units shift the date only; modulo 24h they are no-ops.
        return match unit {
            DateTimeUnit::Month | DateTimeUnit::Quarter | DateTimeUnit::Year => Ok(value),
            _ => Err(unit.invalid_for("TIME")),
        };
    };
    let delta = count as i128 * unit_picos;
    let wrapped = (value.picoseconds() as i128 + delta).rem_euclid(PICOS_PER_DAY_I128);
    // The millisecond grain is the finest addressable unit, so the result
    // stays aligned to any precision of at least 3.
    Time::new(wrapped as u64, value.precision().max(3))
}

/// `date_add(unit, n, date)`.
pub fn date_add_Date(unit: &str, count: i64, value: Date) -> SqlResult<Date> {
    let unit: DateTimeUnit = unit.parse()?;
    let error = || {
        SqlRuntimeError::from_string(format!("date out of range: {value:?} + {count} {unit}"))
    };
    let add_months = |months: i64| -> SqlResult<Date> {
        let naive = value.to_naive_date();
        let result = if months >= 0 {
            naive.checked_add_months(Months::new(u32::try_from(months).map_err(|_| error())?))
        } else {
            naive.checked_sub_months(Months::new(
                u32::try_from(-months).map_err(|_| error())?,
            ))
        };
        Ok(Date::from_naive_date(result.ok_or_else(error)?))
    };
    match unit {
        DateTimeUnit::Day => Ok(Date::new(
            i32::try_from(value.days() as i64 + count).map_err(|_| error())?,
        )),
        DateTimeUnit::Week => Ok(Date::new(
            i32::try_from(value.days() as i64 + count * 7).map_err(|_| error())?,
        )),
        DateTimeUnit::Month => add_months(count),
        DateTimeUnit::Quarter => add_months(count * 3),
        DateTimeUnit::Year => add_months(count * 12),
        _ => Err(unit.invalid_for("DATE")),
    }
}

/// `date_add(unit, n, timestamp)`: sub-day units shift the instant with day
/// carry; calendar units shift the date month-aware, clamping the day of
/// month (Jan 31 + 1 month = Feb 28/29).
pub fn date_add_Timestamp(unit: &str, count: i64, value: Timestamp) -> SqlResult<Timestamp> {
    let parsed: DateTimeUnit = unit.parse()?;
    match parsed {
        DateTimeUnit::Millisecond | DateTimeUnit::Second | DateTimeUnit::Minute | DateTimeUnit::Hour => {
            // The millisecond grain needs at least three fraction digits.
            let precision = match parsed {
                DateTimeUnit::Millisecond => value.precision().max(3),
                _ => value.precision(),
            };
            let widened = value.round_to_precision(precision)?;
            Ok(widened.add_picos(count as i128 * parsed.picoseconds().unwrap()))
        }
        DateTimeUnit::Day | DateTimeUnit::Week | DateTimeUnit::Month | DateTimeUnit::Quarter
        | DateTimeUnit::Year => Ok(value.with_date(date_add_Date(unit, count, value.date())?)),
        _ => Err(parsed.invalid_for("TIMESTAMP")),
    }
}

//////////////////////////// date_diff

/// `date_diff(unit, start, end)` on times: the number of whole units
/// between the operands, truncated toward zero.  Digits below the coarser
/// operand's representable precision are discarded, not rounded.
pub fn date_diff_Time(unit: &str, start: Time, end: Time) -> SqlResult<i64> {
    let unit: DateTimeUnit = unit.parse()?;
    let unit_picos = unit
        .picoseconds()
        .filter(|_| matches!(unit, DateTimeUnit::Millisecond | DateTimeUnit::Second | DateTimeUnit::Minute | DateTimeUnit::Hour))
        .ok_or_else(|| unit.invalid_for("TIME"))?;
    let delta = end.picoseconds() as i128 - start.picoseconds() as i128;
    Ok((delta / unit_picos) as i64)
}

/// `date_diff(unit, start, end)` on dates.
pub fn date_diff_Date(unit: &str, start: Date, end: Date) -> SqlResult<i64> {
    let unit: DateTimeUnit = unit.parse()?;
    match unit {
        DateTimeUnit::Day => Ok(end.days() as i64 - start.days() as i64),
        DateTimeUnit::Week => Ok((end.days() as i64 - start.days() as i64) / 7),
        DateTimeUnit::Month => Ok(months_between(start, end)),
        DateTimeUnit::Quarter => Ok(months_between(start, end) / 3),
        DateTimeUnit::Year => Ok(months_between(start, end) / 12),
        _ => Err(unit.invalid_for("DATE")),
    }
}

/// `date_diff(unit, start, end)` on timestamps.
pub fn date_diff_Timestamp(unit: &str, start: Timestamp, end: Timestamp) -> SqlResult<i64> {
    let parsed: DateTimeUnit = unit.parse()?;
    if let Some(unit_picos) = parsed.picoseconds() {
        let delta = end.epoch_picos() - start.epoch_picos();
        return Ok((delta / unit_picos) as i64);
    }
    let months = months_between_timestamps(start, end);
    match parsed {
        DateTimeUnit::Month => Ok(months),
        DateTimeUnit::Quarter => Ok(months / 3),
        DateTimeUnit::Year => Ok(months / 12),
        _ => Err(parsed.invalid_for("TIMESTAMP")),
    }
}

/// The number of full calendar months from `start` to `end` (negative when
/// `end` precedes `start`).
fn months_between(start: Date, end: Date) -> i64 {
    months_between_timestamps(
        Timestamp::new(start, Time::MIDNIGHT),
        Timestamp::new(end, Time::MIDNIGHT),
    )
}

fn months_between_timestamps(start: Timestamp, end: Timestamp) -> i64 {
    let (earlier, later, sign) = if start <= end {
        (start, end, 1)
    } else {
        (end, start, -1)
    };
    let e = earlier.date().to_naive_date();
    let l = later.date().to_naive_date();
    let mut months =
        (l.year() as i64 - e.year() as i64) * 12 + (l.month() as i64 - e.month() as i64);
    // The last month only counts once fully elapsed.
    if (l.day(), later.time()) < (e.day(), earlier.time()) {
        months -= 1;
    }
    sign * months
}

//////////////////////////// extract

#[doc(hidden)]
pub fn extract_hour_Time(value: Time) -> i64 {
    value.hour() as i64
}

#[doc(hidden)]
pub fn extract_minute_Time(value: Time) -> i64 {
    value.minute() as i64
}

#[doc(hidden)]
pub fn extract_second_Time(value: Time) -> i64 {
    value.second() as i64
}

#[doc(hidden)]
pub fn extract_millisecond_Time(value: Time) -> i64 {
    value.millisecond_of_minute() as i64
}

some_polymorphic_function1!(extract_hour, Time, Time, i64);
some_polymorphic_function1!(extract_minute, Time, Time, i64);
some_polymorphic_function1!(extract_second, Time, Time, i64);
some_polymorphic_function1!(extract_millisecond, Time, Time, i64);

/// `extract(field, time)`.
pub fn extract_Time(field: &str, value: Time) -> SqlResult<i64> {
    let unit: DateTimeUnit = field.parse()?;
    match unit {
        DateTimeUnit::Hour => Ok(extract_hour_Time(value)),
        DateTimeUnit::Minute => Ok(extract_minute_Time(value)),
        DateTimeUnit::Second => Ok(extract_second_Time(value)),
        DateTimeUnit::Millisecond => Ok(extract_millisecond_Time(value)),
        _ => Err(unit.invalid_for("TIME")),
    }
}

#[doc(hidden)]
pub fn extract_year_Date(value: Date) -> i64 {
    value.to_naive_date().year() as i64
}

#[doc(hidden)]
pub fn extract_quarter_Date(value: Date) -> i64 {
    (value.to_naive_date().month0() / 3 + 1) as i64
}

#[doc(hidden)]
pub fn extract_month_Date(value: Date) -> i64 {
    value.to_naive_date().month() as i64
}

#[doc(hidden)]
pub fn extract_week_Date(value: Date) -> i64 {
    value.to_naive_date().iso_week().week() as i64
}

#[doc(hidden)]
pub fn extract_day_Date(value: Date) -> i64 {
    value.to_naive_date().day() as i64
}

#[doc(hidden)]
pub fn extract_dow_Date(value: Date) -> i64 {
    // ISO numbering: Monday is 1, Sunday is 7.
    value.to_naive_date().weekday().num_days_from_monday() as i64 + 1
}

#[doc(hidden)]
pub fn extract_doy_Date(value: Date) -> i64 {
    value.to_naive_date().ordinal() as i64
}

#[doc(hidden)]
pub fn extract_yow_Date(value: Date) -> i64 {
    value.to_naive_date().iso_week().year() as i64
}

some_polymorphic_function1!(extract_year, Date, Date, i64);
some_polymorphic_function1!(extract_quarter, Date, Date, i64);
some_polymorphic_function1!(extract_month, Date, Date, i64);
some_polymorphic_function1!(extract_week, Date, Date, i64);
some_polymorphic_function1!(extract_day, Date, Date, i64);
some_polymorphic_function1!(extract_dow, Date, Date, i64);
some_polymorphic_function1!(extract_doy, Date, Date, i64);
some_polymorphic_function1!(extract_yow, Date, Date, i64);

/// `extract(field, date)`.
pub fn extract_Date(field: &str, value: Date) -> SqlResult<i64> {
    let unit: DateTimeUnit = field.parse()?;
    match unit {
        DateTimeUnit::Year => Ok(extract_year_Date(value)),
        DateTimeUnit::Quarter => Ok(extract_quarter_Date(value)),
        DateTimeUnit::Month => Ok(extract_month_Date(value)),
        DateTimeUnit::Week => Ok(extract_week_Date(value)),
        DateTimeUnit::Day => Ok(extract_day_Date(value)),
        DateTimeUnit::DayOfWeek => Ok(extract_dow_Date(value)),
        DateTimeUnit::DayOfYear => Ok(extract_doy_Date(value)),
        DateTimeUnit::YearOfWeek => Ok(extract_yow_Date(value)),
        _ => Err(unit.invalid_for("DATE")),
    }
}

/// `extract(field, timestamp)`.
pub fn extract_Timestamp(field: &str, value: Timestamp) -> SqlResult<i64> {
    let unit: DateTimeUnit = field.parse()?;
    match unit {
        DateTimeUnit::Hour | DateTimeUnit::Minute | DateTimeUnit::Second
        | DateTimeUnit::Millisecond => extract_Time(field, value.time()),
        DateTimeUnit::TimezoneHour | DateTimeUnit::TimezoneMinute => {
            Err(unit.invalid_for("TIMESTAMP"))
        }
        _ => extract_Date(field, value.date()),
    }
}

/// `extract(field, timestamp with time zone)`: fields are taken from the
/// wall clock in the carried zone; `timezone_hour`/`timezone_minute` report
/// the offset in force.
pub fn extract_TimestampWithTimeZone(
    field: &str,
    value: TimestampWithTimeZone,
) -> SqlResult<i64> {
    let unit: DateTimeUnit = field.parse()?;
    match unit {
        DateTimeUnit::TimezoneHour => Ok(value.offset_seconds() as i64 / 3_600),
        DateTimeUnit::TimezoneMinute => Ok(value.offset_seconds() as i64 % 3_600 / 60),
        _ => extract_Timestamp(field, value.local_timestamp()),
    }
}

//////////////////////////// named helpers

#[doc(hidden)]
pub fn last_day_of_month_Date(value: Date) -> Date {
    let naive = value.to_naive_date();
    let first = NaiveDate::from_ymd_opt(naive.year(), naive.month(), 1).unwrap();
    let next = first.checked_add_months(Months::new(1)).unwrap();
    Date::from_naive_date(next - Days::new(1))
}

#[doc(hidden)]
pub fn last_day_of_month_Timestamp(value: Timestamp) -> Date {
    last_day_of_month_Date(value.date())
}

some_polymorphic_function1!(last_day_of_month, Date, Date, Date);
some_polymorphic_function1!(last_day_of_month, Timestamp, Timestamp, Date);

#[doc(hidden)]
pub fn datediff_day_Date_Date(left: Date, right: Date) -> i32 {
    left.days() - right.days()
}

some_polymorphic_function2!(datediff_day, Date, Date, Date, Date, i32);

#[doc(hidden)]
pub fn year_of_week_Date(value: Date) -> i64 {
    extract_yow_Date(value)
}

#[doc(hidden)]
pub fn year_of_week_Timestamp(value: Timestamp) -> i64 {
    extract_yow_Date(value.date())
}

some_polymorphic_function1!(year_of_week, Date, Date, i64);
some_polymorphic_function1!(year_of_week, Timestamp, Timestamp, i64);

#[cfg(test)]
mod test {
    use super::{
        date_add_Date, date_add_Time, date_add_Timestamp, date_diff_Date, date_diff_Time,
        date_diff_Timestamp, date_trunc_Date, date_trunc_Time, date_trunc_Timestamp,
        extract_Date, extract_Time, extract_Timestamp, extract_TimestampWithTimeZone,
        last_day_of_month_Date, year_of_week_Date,
    };
    use crate::{date::Date, time::Time, timestamp::Timestamp, zoned::with_timezone__};

    fn time(s: &str) -> Time {
        Time::parse(s).unwrap()
    }

    fn date(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn trunc_time_keeps_precision() {
        let truncated = date_trunc_Time("millisecond", time("12:34:56.111222333444")).unwrap();
        assert_eq!(truncated.to_string(), "12:34:56.111000000000");
        assert_eq!(truncated.precision(), 12);
        assert_eq!(
            date_trunc_Time("hour", time("12:34:56.5")).unwrap().to_string(),
            "12:00:00.0"
        );
        assert!(date_trunc_Time("day", time("12:00:00")).is_err());
        assert!(date_trunc_Time("parsec", time("12:00:00")).is_err());
    }

    #[test]
    fn trunc_timestamp_and_date() {
        assert_eq!(
            date_trunc_Timestamp("day", ts("2023-09-28 12:34:56.5")).unwrap(),
            ts("2023-09-28 00:00:00")
        );
        assert_eq!(
            date_trunc_Timestamp("quarter", ts("2023-08-15 10:00:00")).unwrap(),
            ts("2023-07-01 00:00:00")
        );
        assert_eq!(
            date_trunc_Timestamp("minute", ts("2023-09-28 12:34:56")).unwrap(),
            ts("2023-09-28 12:34:00")
        );
        // 2023-09-28 is a Thursday; the week starts Monday the 25th.
        assert_eq!(date_trunc_Date("week", date("2023-09-28")).unwrap(), date("2023-09-25"));
        assert_eq!(date_trunc_Date("year", date("2023-09-28")).unwrap(), date("2023-01-01"));
    }

    #[test]
    fn add_time_wraps() {
        assert_eq!(
            date_add_Time("hour", 25, time("23:00:00")).unwrap(),
            time("00:00:00")
        );
        assert_eq!(
            date_add_Time("millisecond", -1, time("00:00:00")).unwrap(),
            time("23:59:59.999")
        );
        // A count whose picosecond total overflows 64 bits still wraps.
        let huge = date_add_Time("second", i64::MAX, time("12:00:00")).unwrap();
        assert_eq!(huge.picoseconds() % 1_000_000_000, 0);
        // Whole-day and calendar units are no-ops modulo 24h.
        assert_eq!(date_add_Time("day", 5, time("12:00:00")).unwrap(), time("12:00:00"));
        assert_eq!(date_add_Time("month", 2, time("12:00:00")).unwrap(), time("12:00:00"));
    }

    #[test]
    fn add_timestamp_calendar_aware() {
        assert_eq!(
            date_add_Timestamp("month", 1, ts("2023-01-31 10:00:00")).unwrap(),
            ts("2023-02-28 10:00:00")
        );
        assert_eq!(
            date_add_Timestamp("month", 1, ts("2024-01-31 10:00:00")).unwrap(),
            ts("2024-02-29 10:00:00")
        );
        assert_eq!(
            date_add_Timestamp("year", -1, ts("2024-02-29 10:00:00")).unwrap(),
            ts("2023-02-28 10:00:00")
        );
        assert_eq!(
            date_add_Timestamp("hour", 14, ts("2023-09-28 23:00:00")).unwrap(),
            ts("2023-09-29 13:00:00")
        );
        assert_eq!(
            date_add_Date("quarter", 2, date("2023-01-15")).unwrap(),
            date("2023-07-15")
        );
    }

    #[test]
    fn diff_truncates_toward_zero() {
        assert_eq!(
            date_diff_Time(
                "millisecond",
                time("12:34:55.111111111111"),
                time("12:34:56.222222222222")
            )
            .unwrap(),
            1111
        );
        assert_eq!(
            date_diff_Time("second", time("12:00:00.9"), time("12:00:02.1")).unwrap(),
            1
        );
        assert_eq!(
            date_diff_Time("second", time("12:00:02.1"), time("12:00:00.9")).unwrap(),
            -1
        );
        assert_eq!(date_diff_Time("hour", time("01:00:00"), time("23:30:00")).unwrap(), 22);
    }

    #[test]
    fn diff_calendar_units() {
        assert_eq!(
            date_diff_Timestamp("month", ts("2023-01-31 10:00:00"), ts("2023-02-28 09:00:00"))
                .unwrap(),
            0
        );
        assert_eq!(
            date_diff_Timestamp("month", ts("2023-01-31 10:00:00"), ts("2023-03-01 10:00:00"))
                .unwrap(),
            1
        );
        assert_eq!(
            date_diff_Timestamp("year", ts("2020-06-01 00:00:00"), ts("2023-05-31 00:00:00"))
                .unwrap(),
            2
        );
        assert_eq!(date_diff_Date("day", date("2023-09-01"), date("2023-09-28")).unwrap(), 27);
        assert_eq!(date_diff_Date("week", date("2023-09-01"), date("2023-09-28")).unwrap(), 3);
        assert_eq!(
            date_diff_Timestamp("month", ts("2023-03-01 10:00:00"), ts("2023-01-31 10:00:00"))
                .unwrap(),
            -1
        );
    }

    #[test]
    fn extraction() {
        assert_eq!(extract_Time("hour", time("12:34:56.789")).unwrap(), 12);
        assert_eq!(extract_Time("millisecond", time("12:34:56.789")).unwrap(), 56_789);
        // 2023-09-28 is a Thursday, ISO day 4.
        assert_eq!(extract_Date("day_of_week", date("2023-09-28")).unwrap(), 4);
        assert_eq!(extract_Date("dow", date("2023-09-28")).unwrap(), 4);
        assert_eq!(extract_Date("doy", date("2023-01-10")).unwrap(), 10);
        assert_eq!(extract_Timestamp("quarter", ts("2023-08-15 00:00:00")).unwrap(), 3);
        // 2021-01-01 belongs to ISO week 53 of 2020.
        assert_eq!(extract_Date("year_of_week", date("2021-01-01")).unwrap(), 2020);
        assert_eq!(extract_Date("yow", date("2021-01-01")).unwrap(), 2020);
        assert_eq!(year_of_week_Date(date("2021-01-01")), 2020);
        assert!(extract_Date("hour", date("2023-09-28")).is_err());
        assert!(extract_Time("century", time("12:00:00")).is_err());
    }

    #[test]
    fn zoned_extraction() {
        let zoned = with_timezone__(ts("2023-01-01 12:00:00"), "-05:30").unwrap();
        assert_eq!(extract_TimestampWithTimeZone("timezone_hour", zoned).unwrap(), -5);
        assert_eq!(extract_TimestampWithTimeZone("timezone_minute", zoned).unwrap(), -30);
        assert_eq!(extract_TimestampWithTimeZone("hour", zoned).unwrap(), 12);
    }

    #[test]
    fn month_ends() {
        assert_eq!(last_day_of_month_Date(date("2024-02-10")), date("2024-02-29"));
        assert_eq!(last_day_of_month_Date(date("2023-02-10")), date("2023-02-28"));
        assert_eq!(last_day_of_month_Date(date("2023-12-31")), date("2023-12-31"));
    }
}
