//! CF-convention time decoding.
//!
//! Handles `<unit> since <reference>` axes on calendars that coincide with
//! the proleptic Gregorian calendar. Model calendars such as `noleap` or
//! `360_day` return [`NetCdfError::UnsupportedCalendar`] so callers can fall
//! back to a cruder day-offset interpretation.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{NetCdfError, NetCdfResult};

/// Calendars whose dates are real Gregorian dates.
const GREGORIAN_CALENDARS: &[&str] = &["standard", "gregorian", "proleptic_gregorian"];

/// Unit of a CF time offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "days" | "day" | "d" => Some(TimeUnit::Days),
            "hours" | "hour" | "hrs" | "hr" | "h" => Some(TimeUnit::Hours),
            "minutes" | "minute" | "mins" | "min" => Some(TimeUnit::Minutes),
            "seconds" | "second" | "secs" | "sec" | "s" => Some(TimeUnit::Seconds),
            _ => None,
        }
    }

    pub fn seconds(&self) -> f64 {
        match self {
            TimeUnit::Days => 86_400.0,
            TimeUnit::Hours => 3_600.0,
            TimeUnit::Minutes => 60.0,
            TimeUnit::Seconds => 1.0,
        }
    }
}

/// Parsed `units` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    pub unit: TimeUnit,
    pub reference: NaiveDateTime,
}

/// Parse `days since 1850-01-01 00:00:00` style units.
pub fn parse_units(units: &str) -> NetCdfResult<TimeUnits> {
    let invalid = || NetCdfError::InvalidTime(format!("unrecognized time units '{}'", units));

    let lower = units.trim().to_lowercase();
    let (unit, reference) = lower.split_once(" since ").ok_or_else(invalid)?;
    let unit = TimeUnit::parse(unit.trim()).ok_or_else(invalid)?;
    let reference = parse_reference(reference.trim()).ok_or_else(invalid)?;

    Ok(TimeUnits { unit, reference })
}

fn parse_reference(s: &str) -> Option<NaiveDateTime> {
    let mut parts = s.split(|c: char| c == 'T' || c == 't' || c.is_whitespace());
    let date = parse_loose_date(parts.next()?)?;
    let time = parts
        .find(|p| !p.is_empty())
        .and_then(parse_loose_time)
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

/// Accepts `1850-1-1` as well as `1850-01-01`.
fn parse_loose_date(s: &str) -> Option<NaiveDate> {
    let mut fields = s.splitn(3, '-');
    let year = fields.next()?.parse().ok()?;
    let month = fields.next()?.parse().ok()?;
    let day = fields.next()?.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_loose_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim_end_matches(|c: char| c == 'z' || c == 'Z');
    let mut fields = s.split(':');
    let hour = fields.next()?.parse().ok()?;
    let minute = fields.next().map_or(Some(0), |m| m.parse().ok())?;
    let second: f64 = fields.next().map_or(Some(0.0), |v| v.parse().ok())?;
    NaiveTime::from_hms_opt(hour, minute, second.trunc() as u32)
}

fn check_calendar(calendar: Option<&str>) -> NetCdfResult<()> {
    match calendar {
        None => Ok(()),
        Some(c) if GREGORIAN_CALENDARS.contains(&c.trim().to_lowercase().as_str()) => Ok(()),
        Some(c) => Err(NetCdfError::UnsupportedCalendar(c.to_string())),
    }
}

/// Decode offsets into calendar dates.
///
/// Each instant is truncated to its date, so a mid-day stamp such as
/// `0.5 days since 2035-01-01` maps to 2035-01-01.
pub fn decode(values: &[f64], units: &str, calendar: Option<&str>) -> NetCdfResult<Vec<NaiveDate>> {
    check_calendar(calendar)?;
    let parsed = parse_units(units)?;
    let scale = parsed.unit.seconds();

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(NetCdfError::InvalidTime(format!("non-finite offset {}", v)));
            }
            let millis = (v * scale * 1000.0).round() as i64;
            parsed
                .reference
                .checked_add_signed(Duration::milliseconds(millis))
                .map(|dt| dt.date())
                .ok_or_else(|| NetCdfError::InvalidTime(format!("offset {} out of range", v)))
        })
        .collect()
}

/// Interpret offsets as whole days after the reference date, ignoring the
/// calendar attribute. Only valid for `days since` units.
pub fn days_since_dates(values: &[f64], units: &str) -> NetCdfResult<Vec<NaiveDate>> {
    let parsed = parse_units(units)?;
    if parsed.unit != TimeUnit::Days {
        return Err(NetCdfError::InvalidTime(format!(
            "'{}' is not a days-since axis",
            units
        )));
    }
    let base = parsed.reference.date();

    values
        .iter()
        .map(|&v| {
            if !v.is_finite() {
                return Err(NetCdfError::InvalidTime(format!("non-finite offset {}", v)));
            }
            base.checked_add_signed(Duration::days(v.floor() as i64))
                .ok_or_else(|| NetCdfError::InvalidTime(format!("offset {} out of range", v)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_units_variants() {
        let u = parse_units("days since 1850-01-01").unwrap();
        assert_eq!(u.unit, TimeUnit::Days);
        assert_eq!(u.reference.date(), ymd(1850, 1, 1));

        let u = parse_units("hours since 2015-1-1 12:00:00").unwrap();
        assert_eq!(u.unit, TimeUnit::Hours);
        assert_eq!(u.reference.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());

        let u = parse_units("Seconds since 2000-01-01T00:00:00Z").unwrap();
        assert_eq!(u.unit, TimeUnit::Seconds);

        assert!(parse_units("fortnights since 2000-01-01").is_err());
        assert!(parse_units("days after 2000-01-01").is_err());
    }

    #[test]
    fn test_decode_standard_calendar() {
        let dates = decode(&[0.5, 1.5, 59.5], "days since 2036-01-01", Some("standard")).unwrap();
        assert_eq!(dates, vec![ymd(2036, 1, 1), ymd(2036, 1, 2), ymd(2036, 2, 29)]);
    }

    #[test]
    fn test_decode_hours() {
        let dates = decode(&[0.0, 24.0, 36.0], "hours since 2035-12-31", None).unwrap();
        assert_eq!(dates, vec![ymd(2035, 12, 31), ymd(2036, 1, 1), ymd(2036, 1, 1)]);
    }

    #[test]
    fn test_decode_rejects_model_calendars() {
        let err = decode(&[0.0], "days since 2035-01-01", Some("noleap")).unwrap_err();
        assert!(matches!(err, NetCdfError::UnsupportedCalendar(_)));
        let err = decode(&[0.0], "days since 2035-01-01", Some("360_day")).unwrap_err();
        assert!(matches!(err, NetCdfError::UnsupportedCalendar(_)));
    }

    #[test]
    fn test_days_since_ignores_calendar() {
        let dates = days_since_dates(&[0.5, 365.5], "days since 2035-01-01").unwrap();
        assert_eq!(dates, vec![ymd(2035, 1, 1), ymd(2036, 1, 1)]);
        assert!(days_since_dates(&[0.0], "hours since 2035-01-01").is_err());
    }

    #[test]
    fn test_non_finite_offsets_fail() {
        assert!(decode(&[f64::NAN], "days since 2035-01-01", None).is_err());
        assert!(days_since_dates(&[f64::INFINITY], "days since 2035-01-01").is_err());
    }
}
