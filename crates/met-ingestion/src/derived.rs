//! Derived Variable Calculator.
//!
//! Quantities APSIM needs that CMIP6 does not publish directly: daily mean
//! temperature, the `tav`/`amp` header statistics and vapor pressure from
//! relative humidity.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Source code written on rows whose vapor pressure was derived from humidity.
pub const HUMIDITY_DERIVED_CODE: &str = "222222";

/// Daily mean temperature, (max + min) / 2.
pub fn mean_temperature(maxt: f64, mint: f64) -> f64 {
    (maxt + mint) / 2.0
}

fn tetens_exponent(t: f64) -> f64 {
    17.27 * t / (t + 237.3)
}

/// Saturation vapor pressure in kPa at `t` degrees C (Tetens).
pub fn saturation_vapor_pressure(t: f64) -> f64 {
    0.611 * tetens_exponent(t).exp()
}

/// Actual vapor pressure in hPa from relative humidity (%) and mean
/// temperature (degrees C).
pub fn vapor_pressure_hpa(relative_humidity: f64, mean_temp: f64) -> f64 {
    relative_humidity / 100.0 * 10.0 * saturation_vapor_pressure(mean_temp)
}

/// Mean temperature of one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyMean {
    pub year: i32,
    pub month: u32,
    pub mean: f64,
}

/// Monthly means of the daily mean temperature, skipping days where either
/// extreme is missing.
pub fn monthly_means(dates: &[NaiveDate], maxt: &[f64], mint: &[f64]) -> Vec<MonthlyMean> {
    let mut sums: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
    for ((date, &hi), &lo) in dates.iter().zip(maxt).zip(mint) {
        let t = mean_temperature(hi, lo);
        if !t.is_finite() {
            continue;
        }
        let entry = sums.entry((date.year(), date.month())).or_insert((0.0, 0));
        entry.0 += t;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|((year, month), (sum, n))| MonthlyMean {
            year,
            month,
            mean: sum / n as f64,
        })
        .collect()
}

fn mean_of_month(monthly: &[MonthlyMean], month: u32) -> Option<f64> {
    let values: Vec<f64> = monthly
        .iter()
        .filter(|m| m.month == month)
        .map(|m| m.mean)
        .collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// `(mean January - mean July) / 2`. The sign follows the hemisphere and is
/// not normalised.
pub fn amplitude(monthly: &[MonthlyMean]) -> Option<f64> {
    let january = mean_of_month(monthly, 1)?;
    let july = mean_of_month(monthly, 7)?;
    Some((january - july) / 2.0)
}

/// MET header temperature statistics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStats {
    /// Mean of the daily mean temperature over the whole series
    pub tav: f64,
    /// Half the January-July difference of monthly means
    pub amp: f64,
}

/// Compute `tav` and `amp`. Returns `None` when no day has both extremes.
///
/// `amp` is 0.0 when the series contains no January or no July.
pub fn temperature_stats(dates: &[NaiveDate], maxt: &[f64], mint: &[f64]) -> Option<TemperatureStats> {
    let daily: Vec<f64> = maxt
        .iter()
        .zip(mint)
        .map(|(&hi, &lo)| mean_temperature(hi, lo))
        .filter(|t| t.is_finite())
        .collect();
    if daily.is_empty() {
        return None;
    }
    let tav = daily.iter().sum::<f64>() / daily.len() as f64;

    let monthly = monthly_means(dates, maxt, mint);
    let amp = amplitude(&monthly).unwrap_or(0.0);

    Some(TemperatureStats { tav, amp })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_vapor_pressure_at_saturation() {
        for t in [-5.0_f64, 0.0, 12.5, 30.0] {
            assert_eq!(vapor_pressure_hpa(100.0, t), 10.0 * saturation_vapor_pressure(t));
            let expected = 10.0 * 0.611 * (17.27 * t / (t + 237.3)).exp();
            assert!((vapor_pressure_hpa(100.0, t) - expected).abs() < 1e-12);
        }
        assert!((vapor_pressure_hpa(100.0, 0.0) - 6.11).abs() < 1e-12);
    }

    #[test]
    fn test_vapor_pressure_scales_with_humidity() {
        let full = vapor_pressure_hpa(100.0, 20.0);
        assert!((vapor_pressure_hpa(50.0, 20.0) - full / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_amplitude_from_monthly_means() {
        let mut monthly: Vec<MonthlyMean> = (1..=12)
            .map(|month| MonthlyMean {
                year: 2035,
                month,
                mean: 100.0 + month as f64,
            })
            .collect();
        monthly[0].mean = 28.0;
        monthly[6].mean = 12.0;
        assert_eq!(amplitude(&monthly), Some(8.0));
    }

    #[test]
    fn test_amplitude_sign_is_preserved() {
        let monthly = vec![
            MonthlyMean { year: 2035, month: 1, mean: 2.0 },
            MonthlyMean { year: 2035, month: 7, mean: 22.0 },
        ];
        assert_eq!(amplitude(&monthly), Some(-10.0));
    }

    #[test]
    fn test_amplitude_averages_across_years() {
        let monthly = vec![
            MonthlyMean { year: 2035, month: 1, mean: 26.0 },
            MonthlyMean { year: 2036, month: 1, mean: 30.0 },
            MonthlyMean { year: 2035, month: 7, mean: 12.0 },
        ];
        assert_eq!(amplitude(&monthly), Some(8.0));
        assert_eq!(amplitude(&monthly[..2]), None);
    }

    #[test]
    fn test_temperature_stats_skip_missing_days() {
        let dates = vec![ymd(2035, 1, 1), ymd(2035, 1, 2), ymd(2035, 7, 1)];
        let maxt = vec![30.0, f64::NAN, 16.0];
        let mint = vec![26.0, 20.0, 8.0];
        let stats = temperature_stats(&dates, &maxt, &mint).unwrap();
        assert_eq!(stats.tav, (28.0 + 12.0) / 2.0);
        assert_eq!(stats.amp, 8.0);
    }

    #[test]
    fn test_temperature_stats_empty() {
        assert!(temperature_stats(&[], &[], &[]).is_none());
        let stats = temperature_stats(&[ymd(2035, 3, 1)], &[20.0], &[10.0]).unwrap();
        assert_eq!(stats.amp, 0.0);
    }
}
