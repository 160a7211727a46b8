//! Calendar helpers for daily climate series.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{MetError, MetResult};

/// Proleptic Gregorian leap year rule.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of calendar days in `year` (365 or 366).
pub fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) {
        366
    } else {
        365
    }
}

/// One-based day of year.
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// December 31 of the year containing `date`.
pub fn year_end(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap_or(date)
}

/// `count` consecutive days starting at `start`.
pub fn consecutive_days(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}

/// Parse a `YYYY-MM-DD` date, tolerating a trailing time component.
pub fn parse_date(s: &str) -> MetResult<NaiveDate> {
    let trimmed = s.trim();
    let date_part = trimmed
        .split(|c| c == 'T' || c == ' ')
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|e| MetError::InvalidDate(format!("{}: {}", s, e)))
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> MetResult<Self> {
        if end < start {
            return Err(MetError::InvalidDate(format!(
                "span end {} precedes start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Span covering every date given, with the final year completed
    /// through December 31.
    ///
    /// Returns `None` for an empty input.
    pub fn covering<I>(dates: I) -> Option<Self>
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let mut min: Option<NaiveDate> = None;
        let mut max: Option<NaiveDate> = None;
        for d in dates {
            min = Some(min.map_or(d, |m| m.min(d)));
            max = Some(max.map_or(d, |m| m.max(d)));
        }
        let start = min?;
        let end = year_end(max?);
        Some(Self { start, end })
    }

    /// Number of days in the span, both ends included.
    pub fn len(&self) -> usize {
        ((self.end - self.start).num_days() + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Position of `date` within the span.
    pub fn offset_of(&self, date: NaiveDate) -> Option<usize> {
        if self.contains(date) {
            Some((date - self.start).num_days() as usize)
        } else {
            None
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    /// Calendar-exact day count for every year touched by the span,
    /// assuming each year is complete.
    pub fn expected_full_year_days(&self) -> usize {
        (self.start.year()..=self.end.year())
            .map(|y| days_in_year(y) as usize)
            .sum()
    }
}

/// Add whole days to a date, saturating at chrono's supported range.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_leap_years() {
        assert!(is_leap_year(2024));
        assert!(is_leap_year(2000));
        assert!(!is_leap_year(2100));
        assert!(!is_leap_year(2035));
        assert_eq!(days_in_year(2036), 366);
        assert_eq!(days_in_year(2037), 365);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(day_of_year(ymd(2024, 12, 31)), 366);
        assert_eq!(day_of_year(ymd(2023, 12, 31)), 365);
        assert_eq!(day_of_year(ymd(2023, 1, 1)), 1);
    }

    #[test]
    fn test_covering_extends_to_year_end() {
        let span = DateSpan::covering(vec![ymd(2035, 3, 1), ymd(2036, 6, 30), ymd(2035, 1, 1)])
            .unwrap();
        assert_eq!(span.start, ymd(2035, 1, 1));
        assert_eq!(span.end, ymd(2036, 12, 31));
        assert_eq!(span.len(), 365 + 366);
        assert_eq!(span.expected_full_year_days(), 365 + 366);
    }

    #[test]
    fn test_covering_empty() {
        assert!(DateSpan::covering(Vec::new()).is_none());
    }

    #[test]
    fn test_consecutive_days_leap() {
        let days = consecutive_days(ymd(2028, 1, 1), 366);
        assert_eq!(days.len(), 366);
        assert_eq!(days[59], ymd(2028, 2, 29));
        assert_eq!(days[365], ymd(2028, 12, 31));
    }

    #[test]
    fn test_parse_date_variants() {
        assert_eq!(parse_date("2035-01-02").unwrap(), ymd(2035, 1, 2));
        assert_eq!(parse_date("2035-01-02 00:00:00").unwrap(), ymd(2035, 1, 2));
        assert_eq!(parse_date("2035-01-02T12:00:00").unwrap(), ymd(2035, 1, 2));
        assert!(parse_date("02/01/2035").is_err());
    }

    #[test]
    fn test_span_offsets() {
        let span = DateSpan::new(ymd(2035, 1, 1), ymd(2035, 1, 10)).unwrap();
        assert_eq!(span.offset_of(ymd(2035, 1, 5)), Some(4));
        assert_eq!(span.offset_of(ymd(2035, 2, 1)), None);
        assert_eq!(span.days().count(), 10);
        assert!(DateSpan::new(ymd(2035, 1, 2), ymd(2035, 1, 1)).is_err());
    }
}
