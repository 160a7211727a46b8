//! Calendar coverage tests for multi-year daily spans.

use chrono::NaiveDate;
use met_common::{days_in_year, DateSpan, GridCoordinate, MetError};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// DateSpan coverage
// ============================================================================

#[test]
fn test_span_over_leap_cycle_is_calendar_exact() {
    let span = DateSpan::covering(vec![ymd(2035, 1, 1), ymd(2040, 12, 31)]).unwrap();
    let expected: usize = (2035..=2040).map(|y| days_in_year(y) as usize).sum();
    assert_eq!(span.len(), expected);
    assert_eq!(span.days().count(), expected);
    assert_eq!(span.len(), 6 * 365 + 2);
}

#[test]
fn test_span_partial_final_year_is_completed() {
    let span = DateSpan::covering(vec![ymd(2036, 1, 1), ymd(2036, 2, 29)]).unwrap();
    assert_eq!(span.end, ymd(2036, 12, 31));
    assert_eq!(span.len(), 366);
}

#[test]
fn test_span_days_are_unique_and_ordered() {
    let span = DateSpan::covering(vec![ymd(2099, 11, 1), ymd(2100, 3, 1)]).unwrap();
    let days: Vec<_> = span.days().collect();
    assert!(days.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
    // 2100 is not a leap year
    assert_eq!(days.len(), 30 + 31 + 365);
    assert!(NaiveDate::from_ymd_opt(2100, 2, 29).is_none());
}

// ============================================================================
// Coordinate validation
// ============================================================================

#[test]
fn test_invalid_coordinates_are_fatal() {
    for (lat, lon) in [(-90.5, 0.0), (0.0, 181.0), (f64::NAN, 0.0)] {
        let err = GridCoordinate::new(lat, lon).unwrap_err();
        assert!(err.is_fatal(), "{:?} should be fatal", err);
    }
    assert!(matches!(
        GridCoordinate::new(100.0, 0.0),
        Err(MetError::InvalidLatitude(_))
    ));
}
