//! Time axis resolution for one source file.
//!
//! Strategies are tried in a fixed order and the first that produces dates
//! wins. The result is then fitted to exactly the number of extracted values.

use std::path::Path;

use chrono::NaiveDate;
use met_common::{add_days, consecutive_days};
use netcdf_parser::cf_time;
use netcdf_parser::TimeAxisInfo;
use tracing::{debug, warn};

use crate::metadata::extract_year_from_filename;

/// Named ways of dating a file's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeAxisStrategy {
    /// CF-decoded time coordinate whose length matches the data
    DecodedCf,
    /// `days since <date>` offsets applied by hand when CF decoding fails
    DaysSinceOffset,
    /// Consecutive days from January 1 of a year found in the file name
    FilenameYear,
    /// Consecutive days from January 1 of the configured fallback year
    FallbackYear,
}

/// Everything a strategy may look at.
#[derive(Debug, Clone, Copy)]
pub struct TimeAxisContext<'a> {
    pub path: &'a Path,
    pub axis: Option<&'a TimeAxisInfo>,
    pub value_count: usize,
    pub fallback_year: i32,
}

/// Dates chosen for a file and the strategy that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDates {
    pub strategy: TimeAxisStrategy,
    pub dates: Vec<NaiveDate>,
}

impl TimeAxisStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [TimeAxisStrategy; 4] = [
        TimeAxisStrategy::DecodedCf,
        TimeAxisStrategy::DaysSinceOffset,
        TimeAxisStrategy::FilenameYear,
        TimeAxisStrategy::FallbackYear,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TimeAxisStrategy::DecodedCf => "decoded-cf",
            TimeAxisStrategy::DaysSinceOffset => "days-since-offset",
            TimeAxisStrategy::FilenameYear => "filename-year",
            TimeAxisStrategy::FallbackYear => "fallback-year",
        }
    }

    /// Dates for the file, or the reason this strategy does not apply.
    pub fn attempt(&self, ctx: &TimeAxisContext<'_>) -> Result<Vec<NaiveDate>, String> {
        match self {
            TimeAxisStrategy::DecodedCf => {
                let axis = ctx.axis.ok_or("no time coordinate")?;
                let units = axis.units.as_deref().ok_or("time coordinate has no units")?;
                let dates = cf_time::decode(&axis.values, units, axis.calendar.as_deref())
                    .map_err(|e| e.to_string())?;
                if dates.len() != ctx.value_count {
                    return Err(format!(
                        "{} time steps for {} values",
                        dates.len(),
                        ctx.value_count
                    ));
                }
                Ok(dates)
            }
            TimeAxisStrategy::DaysSinceOffset => {
                let axis = ctx.axis.ok_or("no time coordinate")?;
                let units = axis.units.as_deref().ok_or("time coordinate has no units")?;
                if !units.to_lowercase().contains("days since") {
                    return Err(format!("units '{}' are not days since", units));
                }
                if cf_time::decode(&axis.values, units, axis.calendar.as_deref()).is_ok() {
                    return Err("CF decoding succeeded; offsets not needed".to_string());
                }
                cf_time::days_since_dates(&axis.values, units).map_err(|e| e.to_string())
            }
            TimeAxisStrategy::FilenameYear => {
                let year = extract_year_from_filename(ctx.path)
                    .ok_or("no year between 2000 and 2100 in file name")?;
                january_first(year).map(|start| consecutive_days(start, ctx.value_count))
            }
            TimeAxisStrategy::FallbackYear => january_first(ctx.fallback_year)
                .map(|start| consecutive_days(start, ctx.value_count)),
        }
    }
}

fn january_first(year: i32) -> Result<NaiveDate, String> {
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(|| format!("year {} out of range", year))
}

/// Trim `dates` to `count`, or extend with consecutive days after the last.
pub fn fit_to_count(mut dates: Vec<NaiveDate>, count: usize) -> Vec<NaiveDate> {
    if dates.len() >= count {
        dates.truncate(count);
        return dates;
    }
    let mut next = dates.last().and_then(|d| add_days(*d, 1));
    while dates.len() < count {
        match next {
            Some(d) => {
                dates.push(d);
                next = add_days(d, 1);
            }
            None => break,
        }
    }
    dates
}

/// Pick dates for one file's values.
pub fn resolve_dates(ctx: &TimeAxisContext<'_>) -> ResolvedDates {
    for strategy in TimeAxisStrategy::ORDER {
        match strategy.attempt(ctx) {
            Ok(dates) if dates.is_empty() && ctx.value_count > 0 => {
                debug!(
                    path = ?ctx.path,
                    strategy = strategy.name(),
                    "Time axis strategy produced no dates"
                );
            }
            Ok(dates) => {
                if dates.len() != ctx.value_count {
                    warn!(
                        path = ?ctx.path,
                        strategy = strategy.name(),
                        dates = dates.len(),
                        values = ctx.value_count,
                        "Date count does not match value count, fitting"
                    );
                }
                if strategy == TimeAxisStrategy::FallbackYear {
                    warn!(
                        path = ?ctx.path,
                        year = ctx.fallback_year,
                        "No usable time axis or year in file name, assuming fallback year"
                    );
                }
                debug!(path = ?ctx.path, strategy = strategy.name(), "Resolved time axis");
                return ResolvedDates {
                    strategy,
                    dates: fit_to_count(dates, ctx.value_count),
                };
            }
            Err(reason) => {
                debug!(
                    path = ?ctx.path,
                    strategy = strategy.name(),
                    reason = %reason,
                    "Time axis strategy not applicable"
                );
            }
        }
    }

    // The fallback strategy only fails for a year chrono cannot represent.
    ResolvedDates {
        strategy: TimeAxisStrategy::FallbackYear,
        dates: Vec::new(),
    }
}
