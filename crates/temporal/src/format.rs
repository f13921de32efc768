//! Pattern-driven temporal parsing and formatting: the MySQL `%`-directive
//! functions (`date_format`, `date_parse`), the Joda-style functions
//! (`format_datetime`, `parse_datetime`), ISO-8601 conversions, and unix
//! epoch conversions.

use chrono::format::{parse as chrono_parse, Parsed, StrftimeItems};
use chrono::NaiveDate;

use crate::{
    date::Date,
    error::{SqlResult, SqlRuntimeError},
    some_function1, some_polymorphic_function1,
    time::Time,
    timestamp::Timestamp,
    zoned::{TimeZoneId, TimestampWithTimeZone},
};

//////////////////////////// MySQL %-directive patterns

/// Translates a MySQL date pattern to a chrono strftime pattern.
///
/// The directives `%D %U %u %V %w %X` exist in MySQL but are deliberately
/// not supported here; each fails with an error naming the directive.
/// Unknown directives pass through as literal text, as MySQL does.
fn mysql_to_chrono(format: &str) -> SqlResult<String> {
    let mut out = String::with_capacity(format.len() + 8);
    let mut chars = format.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let Some(spec) = chars.next() else {
            out.push('%');
            break;
        };
        match spec {
            'a' => out.push_str("%a"),
            'b' => out.push_str("%b"),
            'c' => out.push_str("%-m"),
            'd' => out.push_str("%d"),
            'e' => out.push_str("%-d"),
            // MySQL `%f` is always microseconds (6 digits).
            'f' => out.push_str("%6f"),
            'H' => out.push_str("%H"),
            'h' | 'I' => out.push_str("%I"),
            'i' => out.push_str("%M"),
            'j' => out.push_str("%j"),
            'k' => out.push_str("%-H"),
            'l' => out.push_str("%-I"),
            'M' => out.push_str("%B"),
            'm' => out.push_str("%m"),
            'p' => out.push_str("%p"),
            'r' => out.push_str("%I:%M:%S %p"),
            'S' | 's' => out.push_str("%S"),
            'T' => out.push_str("%H:%M:%S"),
            'v' => out.push_str("%V"),
            'W' => out.push_str("%A"),
            'x' => out.push_str("%G"),
            'Y' => out.push_str("%Y"),
            'y' => out.push_str("%y"),
            '%' => out.push_str("%%"),
            'D' | 'U' | 'u' | 'V' | 'w' | 'X' => {
                return Err(SqlRuntimeError::from_string(format!(
                    "%{spec} not supported in date format string"
                )))
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// The SQL `date_format(timestamp, format)` function, using MySQL
/// `%`-directives.
#[doc(hidden)]
pub fn date_format__(value: Timestamp, format: &str) -> SqlResult<String> {
    let pattern = mysql_to_chrono(format)?;
    Ok(value.to_naive_date_time().format(&pattern).to_string())
}

/// The SQL `date_parse(text, format)` function, using MySQL
/// `%`-directives.  Missing fields default to 1970-01-01 00:00:00; the
/// result has precision 3.
#[doc(hidden)]
pub fn date_parse__(text: &str, format: &str) -> SqlResult<Timestamp> {
    let pattern = mysql_to_chrono(format)?;
    let parsed = parse_with_pattern(text, &pattern, format)?;
    resolve_parsed(&parsed, text)?.round_to_precision(3)
}

fn parse_with_pattern(text: &str, pattern: &str, original: &str) -> SqlResult<Parsed> {
    let mut parsed = Parsed::new();
    chrono_parse(&mut parsed, text, StrftimeItems::new(pattern)).map_err(|e| {
        SqlRuntimeError::from_string(format!(
            "'{text}' could not be parsed with format '{original}': {e}"
        ))
    })?;
    Ok(parsed)
}

/// Assembles a [Timestamp] from whatever fields a pattern supplied,
/// defaulting the rest to the epoch.
fn resolve_parsed(parsed: &Parsed, text: &str) -> SqlResult<Timestamp> {
    let error = |what: &str| {
        SqlRuntimeError::from_string(format!("invalid {what} in date/time value '{text}'"))
    };
    let year = parsed.year().unwrap_or(1970);
    let date = match (parsed.month(), parsed.day(), parsed.ordinal()) {
        (None, None, Some(ordinal)) => {
            NaiveDate::from_yo_opt(year, ordinal).ok_or_else(|| error("day of year"))?
        }
        (month, day, _) => NaiveDate::from_ymd_opt(year, month.unwrap_or(1), day.unwrap_or(1))
            .ok_or_else(|| error("date"))?,
    };
    let hour = match (parsed.hour_div_12(), parsed.hour_mod_12()) {
        (Some(half_day), Some(hour)) => half_day * 12 + hour,
        (None, Some(hour)) => hour,
        _ => 0,
    };
    let fraction_picos = parsed.nanosecond().unwrap_or(0) as u64 * 1_000;
    let time = Time::from_hms_picos(
        hour,
        parsed.minute().unwrap_or(0),
        parsed.second().unwrap_or(0).min(59),
        fraction_picos,
        9,
    )
    .map_err(|_| error("time"))?;
    Ok(Timestamp::new(Date::from_naive_date(date), time))
}

//////////////////////////// Joda-style patterns

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DateTimeToken {
    Year(usize),
    MonthNumber,
    MonthAbbreviation,
    MonthName,
    DayOfMonth,
    Hour24,
    Hour12,
    Minute,
    Second,
    Fraction(usize),
    HalfDay,
    DayAbbreviation,
    DayName,
    OffsetNumeric,
    OffsetColon,
    Literal(char),
}

fn invalid_datetime_format(format: &str) -> Box<SqlRuntimeError> {
    SqlRuntimeError::from_string(format!("Invalid date/time format: '{format}'"))
}

/// Compiles a Joda-style pattern (`yyyy-MM-dd HH:mm:ss.SSS`) into a token
/// list.  Runs of the same pattern letter form one token; text inside
/// single quotes is literal; an unrecognized pattern letter is an error
/// naming the format.
fn compile_datetime_format(format: &str) -> SqlResult<Vec<DateTimeToken>> {
    let chars: Vec<char> = format.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            // Quoted literal; '' is an escaped quote.
            i += 1;
            let mut closed = false;
            while i < chars.len() {
                if chars[i] == '\'' {
                    if chars.get(i + 1) == Some(&'\'') {
                        out.push(DateTimeToken::Literal('\''));
                        i += 2;
                        continue;
                    }
                    closed = true;
                    i += 1;
                    break;
                }
                out.push(DateTimeToken::Literal(chars[i]));
                i += 1;
            }
            if !closed {
                return Err(invalid_datetime_format(format));
            }
            continue;
        }
        if !c.is_ascii_alphabetic() {
            out.push(DateTimeToken::Literal(c));
            i += 1;
            continue;
        }
        let run = chars[i..].iter().take_while(|x| **x == c).count();
        let token = match (c, run) {
            ('y', len) => DateTimeToken::Year(len),
            ('M', 1) | ('M', 2) => DateTimeToken::MonthNumber,
            ('M', 3) => DateTimeToken::MonthAbbreviation,
            ('M', _) => DateTimeToken::MonthName,
            ('d', _) => DateTimeToken::DayOfMonth,
            ('H', _) => DateTimeToken::Hour24,
            ('h', _) => DateTimeToken::Hour12,
            ('m', _) => DateTimeToken::Minute,
            ('s', _) => DateTimeToken::Second,
            ('S', len) => DateTimeToken::Fraction(len.min(9)),
            ('a', _) => DateTimeToken::HalfDay,
            ('E', len) if len <= 3 => DateTimeToken::DayAbbreviation,
            ('E', _) => DateTimeToken::DayName,
            ('Z', 1) => DateTimeToken::OffsetNumeric,
            ('Z', _) => DateTimeToken::OffsetColon,
            _ => return Err(invalid_datetime_format(format)),
        };
        out.push(token);
        i += run;
    }
    Ok(out)
}

/// Renders a token list as a chrono strftime pattern, shared by the format
/// and parse paths.
fn datetime_tokens_to_chrono(tokens: &[DateTimeToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        match token {
            DateTimeToken::Year(len) if *len <= 2 => out.push_str("%y"),
            DateTimeToken::Year(_) => out.push_str("%Y"),
            DateTimeToken::MonthNumber => out.push_str("%m"),
            DateTimeToken::MonthAbbreviation => out.push_str("%b"),
            DateTimeToken::MonthName => out.push_str("%B"),
            DateTimeToken::DayOfMonth => out.push_str("%d"),
            DateTimeToken::Hour24 => out.push_str("%H"),
            DateTimeToken::Hour12 => out.push_str("%I"),
            DateTimeToken::Minute => out.push_str("%M"),
            DateTimeToken::Second => out.push_str("%S"),
            DateTimeToken::Fraction(len) => {
                let fixed = if *len <= 3 { 3 } else if *len <= 6 { 6 } else { 9 };
                out.push_str(&format!("%{fixed}f"));
            }
            DateTimeToken::HalfDay => out.push_str("%p"),
            DateTimeToken::DayAbbreviation => out.push_str("%a"),
            DateTimeToken::DayName => out.push_str("%A"),
            DateTimeToken::OffsetNumeric => out.push_str("%z"),
            DateTimeToken::OffsetColon => out.push_str("%:z"),
            DateTimeToken::Literal('%') => out.push_str("%%"),
            DateTimeToken::Literal(c) => out.push(*c),
        }
    }
    out
}

/// The SQL `format_datetime(timestamp, format)` function, using Joda-style
/// pattern letters.
#[doc(hidden)]
pub fn format_datetime__(value: Timestamp, format: &str) -> SqlResult<String> {
    let tokens = compile_datetime_format(format)?;
    let pattern = datetime_tokens_to_chrono(&tokens);
    Ok(value.to_naive_date_time().format(&pattern).to_string())
}

/// The SQL `parse_datetime(text, format)` function.  A pattern with an
/// offset token yields that fixed offset; otherwise the reading is taken as
/// UTC.
#[doc(hidden)]
pub fn parse_datetime__(text: &str, format: &str) -> SqlResult<TimestampWithTimeZone> {
    let tokens = compile_datetime_format(format)?;
    let pattern = datetime_tokens_to_chrono(&tokens);
    let parsed = parse_with_pattern(text, &pattern, format)?;
    let local = resolve_parsed(&parsed, text)?.round_to_precision(3)?;
    let zone = TimeZoneId::Offset(parsed.offset().unwrap_or(0));
    Ok(TimestampWithTimeZone::from_local(local, zone))
}

//////////////////////////// ISO 8601

#[doc(hidden)]
pub fn to_iso8601_Date(value: Date) -> String {
    value.to_string()
}

#[doc(hidden)]
pub fn to_iso8601_Timestamp(value: Timestamp) -> String {
    format!("{}T{}", value.date(), value.time())
}

#[doc(hidden)]
pub fn to_iso8601_TimestampWithTimeZone(value: TimestampWithTimeZone) -> String {
    let local = value.local_timestamp();
    let offset = value.offset_seconds();
    let sign = if offset < 0 { '-' } else { '+' };
    let magnitude = offset.unsigned_abs();
    format!(
        "{}T{}{}{:02}:{:02}",
        local.date(),
        local.time(),
        sign,
        magnitude / 3_600,
        magnitude % 3_600 / 60
    )
}

#[doc(hidden)]
pub fn from_iso8601_date_(text: &str) -> SqlResult<Date> {
    Date::parse(text)
}

some_polymorphic_function1!(to_iso8601, Date, Date, String);
some_polymorphic_function1!(to_iso8601, Timestamp, Timestamp, String);
some_polymorphic_function1!(
    to_iso8601,
    TimestampWithTimeZone,
    TimestampWithTimeZone,
    String
);

/// Parses an ISO-8601 timestamp with an optional `Z` or `±HH:MM` suffix.
/// Without a suffix the reading is taken as UTC.
#[doc(hidden)]
pub fn from_iso8601_timestamp_(text: &str) -> SqlResult<TimestampWithTimeZone> {
    let trimmed = text.trim();
    let error = || {
        SqlRuntimeError::from_string(format!("Value cannot be cast to timestamp: '{text}'"))
    };
    let (datetime, zone) = if let Some(rest) = trimmed.strip_suffix(['Z', 'z']) {
        (rest, TimeZoneId::Offset(0))
    } else if let Some(sign_position) = trimmed.rfind(['+', '-']).filter(|p| *p > 10) {
        let offset: TimeZoneId = trimmed[sign_position..].parse().map_err(|_| error())?;
        (&trimmed[..sign_position], offset)
    } else {
        (trimmed, TimeZoneId::Offset(0))
    };
    let local = Timestamp::parse(datetime).map_err(|_| error())?;
    Ok(TimestampWithTimeZone::from_local(local, zone))
}

/// Like [from_iso8601_timestamp_] but rounds the result to nanosecond
/// precision (9 digits).
#[doc(hidden)]
pub fn from_iso8601_timestamp_nanos_(text: &str) -> SqlResult<TimestampWithTimeZone> {
    from_iso8601_timestamp_(text)?.round_to_precision(9)
}

//////////////////////////// unix epoch

/// The SQL `from_unixtime(seconds)` function: seconds (possibly
/// fractional) since the epoch to a timestamp with precision 3.
#[doc(hidden)]
pub fn from_unixtime_(seconds: f64) -> Timestamp {
    Timestamp::from_epoch_millis((seconds * 1_000.0).round() as i64)
}

/// The SQL `from_unixtime_nanos(nanos)` function: whole nanoseconds since
/// the epoch to a timestamp with precision 9.
#[doc(hidden)]
pub fn from_unixtime_nanos_(nanoseconds: i64) -> Timestamp {
    Timestamp::from_epoch_nanos(nanoseconds)
}

/// The SQL `to_unixtime(timestamp)` function: fractional seconds since the
/// epoch.
#[doc(hidden)]
pub fn to_unixtime_(value: Timestamp) -> f64 {
    // Whole seconds and the fraction are each exact in an f64; summing them
    // avoids the rounding error of a single picosecond-scale division.
    let whole = value.epoch_millis().div_euclid(1_000);
    let fraction = value.time().fraction_picos();
    whole as f64 + fraction as f64 / 1e12
}

some_function1!(from_unixtime, f64, Timestamp);
some_function1!(from_unixtime_nanos, i64, Timestamp);
some_function1!(to_unixtime, Timestamp, f64);
