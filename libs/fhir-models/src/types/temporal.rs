//! Partial-precision temporal values for `date`, `dateTime`, `instant` and
//! `time`.

use crate::error::{Error, Result};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A `date`: year, year-month or full date precision. No time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DateValue {
    Year(i32),
    YearMonth(i32, u32),
    Date(NaiveDate),
}

/// A `dateTime`: any `date` precision, or a full timestamp with a zone offset.
///
/// Timestamps compare by local time and offset, so `10:00Z` and
/// `12:00+02:00` are different values.
#[derive(Debug, Clone, Copy)]
pub enum DateTimeValue {
    Year(i32),
    YearMonth(i32, u32),
    Date(NaiveDate),
    DateTime(chrono::DateTime<FixedOffset>),
}

impl PartialEq for DateTimeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (DateTimeValue::Year(a), DateTimeValue::Year(b)) => a == b,
            (DateTimeValue::YearMonth(a, m), DateTimeValue::YearMonth(b, n)) => (a, m) == (b, n),
            (DateTimeValue::Date(a), DateTimeValue::Date(b)) => a == b,
            (DateTimeValue::DateTime(a), DateTimeValue::DateTime(b)) => {
                zoned_key(a) == zoned_key(b)
            }
            _ => false,
        }
    }
}

impl Eq for DateTimeValue {}

impl Hash for DateTimeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            DateTimeValue::Year(year) => year.hash(state),
            DateTimeValue::YearMonth(year, month) => (year, month).hash(state),
            DateTimeValue::Date(date) => date.hash(state),
            DateTimeValue::DateTime(value) => zoned_key(value).hash(state),
        }
    }
}

/// Local wall time plus offset seconds. chrono's own equality only compares
/// the instant.
pub(crate) fn zoned_key(value: &chrono::DateTime<FixedOffset>) -> (NaiveDateTime, i32) {
    (value.naive_local(), value.offset().local_minus_utc())
}

fn parse_year(s: &str) -> Option<i32> {
    if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok().filter(|year| *year >= 1)
    } else {
        None
    }
}

fn parse_partial_date(s: &str) -> Option<DateValue> {
    match s.len() {
        4 => parse_year(s).map(DateValue::Year),
        7 => {
            let (year, month) = s.split_once('-')?;
            let year = parse_year(year)?;
            if month.len() != 2 || !month.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let month: u32 = month.parse().ok()?;
            (1..=12)
                .contains(&month)
                .then_some(DateValue::YearMonth(year, month))
        }
        10 => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .map(DateValue::Date),
        _ => None,
    }
}

impl FromStr for DateValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_partial_date(s).ok_or_else(|| Error::parse("date", s))
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateValue::Year(year) => write!(f, "{:04}", year),
            DateValue::YearMonth(year, month) => write!(f, "{:04}-{:02}", year, month),
            DateValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Date(date)
    }
}

impl FromStr for DateTimeValue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.contains('T') {
            return chrono::DateTime::parse_from_rfc3339(s)
                .map(DateTimeValue::DateTime)
                .map_err(|_| Error::parse("dateTime", s));
        }
        parse_partial_date(s)
            .map(DateTimeValue::from)
            .ok_or_else(|| Error::parse("dateTime", s))
    }
}

impl fmt::Display for DateTimeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeValue::Year(year) => write!(f, "{:04}", year),
            DateTimeValue::YearMonth(year, month) => write!(f, "{:04}-{:02}", year, month),
            DateTimeValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            DateTimeValue::DateTime(value) => f.write_str(&format_instant(value)),
        }
    }
}

impl From<DateValue> for DateTimeValue {
    fn from(date: DateValue) -> Self {
        match date {
            DateValue::Year(year) => DateTimeValue::Year(year),
            DateValue::YearMonth(year, month) => DateTimeValue::YearMonth(year, month),
            DateValue::Date(date) => DateTimeValue::Date(date),
        }
    }
}

impl From<NaiveDate> for DateTimeValue {
    fn from(date: NaiveDate) -> Self {
        DateTimeValue::Date(date)
    }
}

impl From<chrono::DateTime<FixedOffset>> for DateTimeValue {
    fn from(value: chrono::DateTime<FixedOffset>) -> Self {
        DateTimeValue::DateTime(value)
    }
}

impl From<chrono::DateTime<Utc>> for DateTimeValue {
    fn from(value: chrono::DateTime<Utc>) -> Self {
        DateTimeValue::DateTime(value.into())
    }
}

/// Parse an `instant`: a full timestamp with seconds and a zone offset.
pub fn parse_instant(s: &str) -> Result<chrono::DateTime<FixedOffset>> {
    chrono::DateTime::parse_from_rfc3339(s).map_err(|_| Error::parse("instant", s))
}

pub fn format_instant(value: &chrono::DateTime<FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Parse a `time` (`hh:mm:ss` with optional fraction).
pub fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M:%S%.f").map_err(|_| Error::parse("time", s))
}

pub fn format_time(value: &NaiveTime) -> String {
    value.format("%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_dates() {
        assert_eq!("2020".parse::<DateValue>().unwrap(), DateValue::Year(2020));
        assert_eq!(
            "2020-02".parse::<DateValue>().unwrap(),
            DateValue::YearMonth(2020, 2)
        );
        assert_eq!("2020-02".parse::<DateValue>().unwrap().to_string(), "2020-02");
        assert!("2020-13".parse::<DateValue>().is_err());
        assert!("2020-02-30".parse::<DateValue>().is_err());
        assert!("20".parse::<DateValue>().is_err());
    }

    #[test]
    fn date_times_require_zone_when_time_present() {
        let value: DateTimeValue = "2015-02-07T13:28:17-05:00".parse().unwrap();
        assert!(matches!(value, DateTimeValue::DateTime(_)));
        assert_eq!(value.to_string(), "2015-02-07T13:28:17-05:00");
        assert!("2015-02-07T13:28:17".parse::<DateTimeValue>().is_err());
        assert_eq!(
            "2015-02-07".parse::<DateTimeValue>().unwrap(),
            DateTimeValue::Date(NaiveDate::from_ymd_opt(2015, 2, 7).unwrap())
        );
    }

    #[test]
    fn timestamps_with_different_offsets_differ() {
        let utc: DateTimeValue = "2020-01-01T10:00:00Z".parse().unwrap();
        let shifted: DateTimeValue = "2020-01-01T12:00:00+02:00".parse().unwrap();
        assert_ne!(utc, shifted);

        let again: DateTimeValue = "2020-01-01T10:00:00+00:00".parse().unwrap();
        assert_eq!(utc, again);
        assert_ne!(DateTimeValue::Year(2020), DateTimeValue::YearMonth(2020, 1));
    }

    #[test]
    fn year_zero_is_not_a_date() {
        assert!("0000".parse::<DateValue>().is_err());
        assert!("0000-05".parse::<DateTimeValue>().is_err());
    }

    #[test]
    fn instants_normalize_utc_to_z() {
        let instant = parse_instant("2021-06-01T10:00:00.5+00:00").unwrap();
        assert_eq!(format_instant(&instant), "2021-06-01T10:00:00.500Z");
        assert!(parse_instant("2021-06-01").is_err());
    }

    #[test]
    fn times() {
        let time = parse_time("08:30:00").unwrap();
        assert_eq!(format_time(&time), "08:30:00");
        assert!(parse_time("25:00:00").is_err());
    }
}
