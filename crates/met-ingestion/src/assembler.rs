//! Series Assembler: per-variable series to one complete daily table.
//!
//! The covering range runs from the earliest to the latest date of any input,
//! completed through December 31 of the final year. Every day in it appears
//! exactly once.

use chrono::{Datelike, NaiveDate};
use met_common::{ClimateVariable, DateSpan, REQUIRED_VARIABLES};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::derived::{
    mean_temperature, temperature_stats, vapor_pressure_hpa, TemperatureStats,
    HUMIDITY_DERIVED_CODE,
};
use crate::error::{IngestionError, Result};
use crate::series::DailySeries;

/// W/m2 averaged over a day to MJ/m2/day (86400 s / 1e6).
pub const RADIATION_W_TO_MJ: f64 = 0.0864;

/// One day of the merged table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetRow {
    pub date: NaiveDate,
    /// Radiation in MJ/m2/day, absent when no radiation series was supplied
    pub radn: Option<f64>,
    pub maxt: f64,
    pub mint: f64,
    pub rain: f64,
    /// Never computed by this pipeline
    pub evap: Option<f64>,
    /// Vapor pressure in hPa, absent when no humidity series was supplied
    pub vp: Option<f64>,
    pub code: Option<String>,
}

impl MetRow {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    pub fn day(&self) -> u32 {
        self.date.ordinal()
    }
}

/// The merged daily table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherTable {
    pub span: DateSpan,
    pub rows: Vec<MetRow>,
}

impl WeatherTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_vapor_pressure(&self) -> bool {
        self.rows.iter().any(|r| r.vp.is_some())
    }
}

/// Series available for assembly, keyed by role.
#[derive(Debug, Clone, Default)]
pub struct AssemblyInput {
    pub max_temperature: Option<DailySeries>,
    pub min_temperature: Option<DailySeries>,
    pub precipitation: Option<DailySeries>,
    pub radiation: Option<DailySeries>,
    pub relative_humidity: Option<DailySeries>,
}

impl AssemblyInput {
    pub fn insert(&mut self, variable: ClimateVariable, series: DailySeries) {
        let slot = match variable {
            ClimateVariable::MaxTemperature => &mut self.max_temperature,
            ClimateVariable::MinTemperature => &mut self.min_temperature,
            ClimateVariable::Precipitation => &mut self.precipitation,
            ClimateVariable::Radiation => &mut self.radiation,
            ClimateVariable::RelativeHumidity => &mut self.relative_humidity,
        };
        *slot = Some(series);
    }

    pub fn get(&self, variable: ClimateVariable) -> Option<&DailySeries> {
        match variable {
            ClimateVariable::MaxTemperature => self.max_temperature.as_ref(),
            ClimateVariable::MinTemperature => self.min_temperature.as_ref(),
            ClimateVariable::Precipitation => self.precipitation.as_ref(),
            ClimateVariable::Radiation => self.radiation.as_ref(),
            ClimateVariable::RelativeHumidity => self.relative_humidity.as_ref(),
        }
    }

    /// Ids of required variables with no (or an empty) series.
    pub fn missing_required(&self) -> Vec<String> {
        REQUIRED_VARIABLES
            .iter()
            .filter(|v| self.get(**v).map_or(true, |s| s.is_empty()))
            .map(|v| v.id().to_string())
            .collect()
    }

    fn all_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        ClimateVariable::ALL
            .iter()
            .filter_map(|v| self.get(*v))
            .flat_map(|s| s.dates())
    }
}

/// Values filled per column during assembly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FillReport {
    pub maxt: usize,
    pub mint: usize,
    pub rain: usize,
    pub radn: usize,
    pub humidity: usize,
    /// Leap days whose vapor pressure was copied from day 365
    pub leap_day_vp: usize,
    /// Rows left without vapor pressure although humidity was supplied
    pub vp_missing: usize,
}

/// Assembly output: the table plus header statistics.
#[derive(Debug, Clone)]
pub struct Assembly {
    pub table: WeatherTable,
    pub stats: TemperatureStats,
    pub fills: FillReport,
}

/// Replace NaN with the last finite value before it. Returns the count filled.
pub fn forward_fill(values: &mut [f64]) -> usize {
    let mut last: Option<f64> = None;
    let mut filled = 0;
    for v in values.iter_mut() {
        if v.is_finite() {
            last = Some(*v);
        } else if let Some(prev) = last {
            *v = prev;
            filled += 1;
        }
    }
    filled
}

/// Replace NaN with the next finite value after it. Returns the count filled.
pub fn backward_fill(values: &mut [f64]) -> usize {
    let mut next: Option<f64> = None;
    let mut filled = 0;
    for v in values.iter_mut().rev() {
        if v.is_finite() {
            next = Some(*v);
        } else if let Some(after) = next {
            *v = after;
            filled += 1;
        }
    }
    filled
}

/// Forward fill, backward fill, then zero whatever is left.
pub fn fill_gaps(values: &mut [f64]) -> usize {
    let mut filled = forward_fill(values) + backward_fill(values);
    for v in values.iter_mut().filter(|v| !v.is_finite()) {
        *v = 0.0;
        filled += 1;
    }
    filled
}

/// Copy day 365 into day 366 wherever day 366 is missing.
fn backfill_leap_days(dates: &[NaiveDate], values: &mut [f64]) -> usize {
    let mut filled = 0;
    for i in 1..values.len() {
        if dates[i].ordinal() == 366 && !values[i].is_finite() && dates[i - 1].ordinal() == 365 {
            values[i] = values[i - 1];
            if values[i].is_finite() {
                filled += 1;
            }
        }
    }
    filled
}

/// Merge, fill and convert the supplied series.
pub fn assemble(input: &AssemblyInput) -> Result<Assembly> {
    let missing = input.missing_required();
    if !missing.is_empty() {
        return Err(IngestionError::MissingRequiredVariables(missing));
    }

    let span = DateSpan::covering(input.all_dates()).ok_or_else(|| IngestionError::NoData {
        variable: "assembly".to_string(),
    })?;
    let dates: Vec<NaiveDate> = span.days().collect();

    let reindex = |v: ClimateVariable| input.get(v).map(|s| s.reindex(&span));
    let mut maxt = reindex(ClimateVariable::MaxTemperature).unwrap_or_default();
    let mut mint = reindex(ClimateVariable::MinTemperature).unwrap_or_default();
    let mut rain = reindex(ClimateVariable::Precipitation).unwrap_or_default();
    let mut radn = reindex(ClimateVariable::Radiation);
    let mut humidity = reindex(ClimateVariable::RelativeHumidity);

    // Header statistics use the data as extracted, before any filling
    let stats = temperature_stats(&dates, &maxt, &mint).ok_or_else(|| IngestionError::NoData {
        variable: "temperature".to_string(),
    })?;

    let mut fills = FillReport {
        maxt: fill_gaps(&mut maxt),
        mint: fill_gaps(&mut mint),
        rain: fill_gaps(&mut rain),
        ..FillReport::default()
    };

    if let Some(radn) = radn.as_mut() {
        fills.radn = fill_gaps(radn);
        for v in radn.iter_mut() {
            *v *= RADIATION_W_TO_MJ;
        }
    } else {
        warn!("No radiation series supplied; radn column left blank");
    }

    let vp: Option<Vec<f64>> = match humidity.as_mut() {
        Some(rh) => {
            if !rh.iter().any(|v| v.is_finite()) {
                warn!("Humidity series has no values; vapor pressure left blank");
            }
            fills.humidity = forward_fill(rh) + backward_fill(rh);
            let mut vp: Vec<f64> = rh
                .iter()
                .zip(maxt.iter().zip(&mint))
                .map(|(&rh, (&hi, &lo))| vapor_pressure_hpa(rh, mean_temperature(hi, lo)))
                .collect();
            fills.leap_day_vp = backfill_leap_days(&dates, &mut vp);
            fills.vp_missing = vp.iter().filter(|v| !v.is_finite()).count();
            Some(vp)
        }
        None => {
            warn!("No humidity series supplied; vapor pressure left blank");
            None
        }
    };

    let finite = |v: f64| if v.is_finite() { Some(v) } else { None };

    let rows = dates
        .iter()
        .enumerate()
        .map(|(i, &date)| {
            let vp = vp.as_ref().and_then(|v| finite(v[i]));
            MetRow {
                date,
                radn: radn.as_ref().and_then(|r| finite(r[i])),
                maxt: maxt[i],
                mint: mint[i],
                rain: rain[i],
                evap: None,
                vp,
                code: vp.map(|_| HUMIDITY_DERIVED_CODE.to_string()),
            }
        })
        .collect::<Vec<_>>();

    debug!(fills = ?fills, "Gap filling complete");
    info!(
        start = %span.start,
        end = %span.end,
        rows = rows.len(),
        tav = stats.tav,
        amp = stats.amp,
        "Assembled weather table"
    );

    Ok(Assembly {
        table: WeatherTable { span, rows },
        stats,
        fills,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use met_common::days_in_year;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(start: NaiveDate, values: &[f64]) -> DailySeries {
        DailySeries::from_points(start.iter_days().zip(values.iter().copied()).collect())
    }

    fn base_input(start: NaiveDate, n: usize) -> AssemblyInput {
        let mut input = AssemblyInput::default();
        input.insert(ClimateVariable::MaxTemperature, series(start, &vec![30.0; n]));
        input.insert(ClimateVariable::MinTemperature, series(start, &vec![20.0; n]));
        input.insert(ClimateVariable::Precipitation, series(start, &vec![1.5; n]));
        input
    }

    #[test]
    fn test_fill_helpers() {
        let mut v = vec![f64::NAN, 1.0, f64::NAN, f64::NAN, 4.0, f64::NAN];
        assert_eq!(forward_fill(&mut v), 3);
        assert_eq!(v[2], 1.0);
        assert_eq!(v[5], 4.0);
        assert!(v[0].is_nan());
        assert_eq!(backward_fill(&mut v), 1);
        assert_eq!(v[0], 1.0);

        let mut all_missing = vec![f64::NAN; 3];
        assert_eq!(fill_gaps(&mut all_missing), 3);
        assert_eq!(all_missing, vec![0.0; 3]);
    }

    #[test]
    fn test_missing_required_variables() {
        let mut input = AssemblyInput::default();
        input.insert(ClimateVariable::MaxTemperature, series(ymd(2035, 1, 1), &[30.0]));
        let err = assemble(&input).unwrap_err();
        match &err {
            IngestionError::MissingRequiredVariables(missing) => {
                assert_eq!(missing, &vec!["tasmin".to_string(), "pr".to_string()]);
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(err.is_not_found());
    }

    #[test]
    fn test_row_count_is_calendar_exact() {
        // Data stops mid-2036 (a leap year); the year is completed
        let input = base_input(ymd(2035, 1, 1), 400);
        let assembly = assemble(&input).unwrap();
        let expected = (days_in_year(2035) + days_in_year(2036)) as usize;
        assert_eq!(assembly.table.len(), expected);
        assert_eq!(assembly.table.rows.last().unwrap().date, ymd(2036, 12, 31));
        assert_eq!(assembly.table.rows.last().unwrap().day(), 366);
        let days: Vec<_> = assembly.table.rows.iter().map(|r| r.date).collect();
        assert!(days.windows(2).all(|w| (w[1] - w[0]).num_days() == 1));
    }

    #[test]
    fn test_gaps_are_filled_forward_then_backward() {
        let start = ymd(2035, 1, 1);
        let mut input = base_input(start, 365);
        input.insert(
            ClimateVariable::Precipitation,
            series(start, &[f64::NAN, 2.0, f64::NAN, 5.0]),
        );
        let assembly = assemble(&input).unwrap();
        let rain: Vec<f64> = assembly.table.rows.iter().map(|r| r.rain).collect();
        assert_eq!(&rain[..5], &[2.0, 2.0, 2.0, 5.0, 5.0]);
        assert_eq!(rain[364], 5.0);
    }

    #[test]
    fn test_radiation_conversion() {
        let start = ymd(2035, 1, 1);
        let mut input = base_input(start, 365);
        input.insert(ClimateVariable::Radiation, series(start, &vec![200.0; 365]));
        let assembly = assemble(&input).unwrap();
        let radn = assembly.table.rows[0].radn.unwrap();
        assert_eq!(radn, 200.0 * 0.0864);
        assert!((radn - 17.28).abs() < 1e-9);
    }

    #[test]
    fn test_blank_columns_without_optional_inputs() {
        let assembly = assemble(&base_input(ymd(2035, 1, 1), 365)).unwrap();
        assert!(assembly.table.rows.iter().all(|r| r.radn.is_none()));
        assert!(assembly.table.rows.iter().all(|r| r.vp.is_none() && r.code.is_none()));
        assert!(assembly.table.rows.iter().all(|r| r.evap.is_none()));
        assert!(!assembly.table.has_vapor_pressure());
    }

    #[test]
    fn test_vapor_pressure_from_humidity() {
        let start = ymd(2036, 1, 1);
        let mut input = base_input(start, 366);
        input.insert(ClimateVariable::RelativeHumidity, series(start, &vec![100.0; 365]));
        let assembly = assemble(&input).unwrap();

        let row = &assembly.table.rows[0];
        assert_eq!(row.vp, Some(vapor_pressure_hpa(100.0, 25.0)));
        assert_eq!(row.code.as_deref(), Some("222222"));

        // Day 366 had no humidity; filled forward from day 365
        let leap = &assembly.table.rows[365];
        assert_eq!(leap.day(), 366);
        assert_eq!(leap.vp, row.vp);
    }

    #[test]
    fn test_empty_humidity_leaves_rows_uncoded() {
        let start = ymd(2035, 1, 1);
        let mut input = base_input(start, 3);
        input.insert(ClimateVariable::RelativeHumidity, series(start, &[f64::NAN; 3]));
        let assembly = assemble(&input).unwrap();

        assert_eq!(assembly.fills.vp_missing, assembly.table.len());
        assert!(!assembly.table.has_vapor_pressure());
        assert!(assembly.table.rows.iter().all(|r| r.vp.is_none() && r.code.is_none()));
    }

    #[test]
    fn test_stats_use_unfilled_data() {
        let start = ymd(2035, 1, 1);
        let mut input = base_input(start, 365);
        let mut maxt = vec![30.0; 365];
        maxt[0] = f64::NAN;
        input.insert(ClimateVariable::MaxTemperature, series(start, &maxt));
        let assembly = assemble(&input).unwrap();
        assert_eq!(assembly.stats.tav, 25.0);
        assert_eq!(assembly.stats.amp, 0.0);
        assert_eq!(assembly.fills.maxt, 1);
    }

    #[test]
    fn test_leap_day_backfill() {
        let dates = vec![ymd(2036, 12, 30), ymd(2036, 12, 31)];
        let mut vp = vec![12.0, f64::NAN];
        assert_eq!(backfill_leap_days(&dates, &mut vp), 1);
        assert_eq!(vp[1], 12.0);

        let dates = vec![ymd(2035, 12, 30), ymd(2035, 12, 31)];
        let mut vp = vec![12.0, f64::NAN];
        assert_eq!(backfill_leap_days(&dates, &mut vp), 0);
        assert!(vp[1].is_nan());
    }
}
