//! Generators for synthetic daily climate series.
//!
//! Values are deterministic so tests can assert on exact numbers.

use chrono::{Datelike, NaiveDate};

/// `count` consecutive dates from `start`.
pub fn daily_dates(start: NaiveDate, count: usize) -> Vec<NaiveDate> {
    start.iter_days().take(count).collect()
}

/// Every date of the given years, inclusive.
pub fn dates_for_years(first: i32, last: i32) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(first, 1, 1).expect("valid start year");
    let end = NaiveDate::from_ymd_opt(last, 12, 31).expect("valid end year");
    start.iter_days().take_while(|d| *d <= end).collect()
}

/// Southern-hemisphere seasonal temperature in degrees C.
///
/// Peaks in mid January at `mean + half_range`, troughs in mid July.
pub fn seasonal_temperature(dates: &[NaiveDate], mean: f64, half_range: f64) -> Vec<f64> {
    dates
        .iter()
        .map(|d| {
            let phase = (d.ordinal0() as f64 - 15.0) / 365.25 * std::f64::consts::TAU;
            mean + half_range * phase.cos()
        })
        .collect()
}

/// Rain on a fixed cycle: `amount` mm every `every` days, zero otherwise.
pub fn periodic_rain(count: usize, every: usize, amount: f64) -> Vec<f64> {
    (0..count)
        .map(|i| if every > 0 && i % every == 0 { amount } else { 0.0 })
        .collect()
}

/// Constant series.
pub fn constant_series(count: usize, value: f64) -> Vec<f64> {
    vec![value; count]
}

/// Copy of `values` with NaN at the given positions.
pub fn with_gaps(values: &[f64], gaps: &[usize]) -> Vec<f64> {
    let mut out = values.to_vec();
    for &i in gaps {
        if i < out.len() {
            out[i] = f64::NAN;
        }
    }
    out
}

/// Index of each date relative to 1850-01-01, plus half a day.
pub fn days_since_1850(dates: &[NaiveDate]) -> Vec<f64> {
    let epoch = NaiveDate::from_ymd_opt(1850, 1, 1).expect("valid epoch");
    dates
        .iter()
        .map(|d| (*d - epoch).num_days() as f64 + 0.5)
        .collect()
}
