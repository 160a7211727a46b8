//! CSV forms of extracted series and of the assembled MET table.

use std::fs::File;
use std::path::Path;

use met_common::parse_date;
use tracing::info;

use crate::assembler::{MetRow, WeatherTable};
use crate::error::{IngestionError, Result};
use crate::series::DailySeries;

const SERIES_HEADER: [&str; 2] = ["date", "value"];
const MET_CSV_HEADER: [&str; 9] = ["year", "day", "radn", "maxt", "mint", "rain", "evap", "vp", "code"];

/// Write a raw series as `date,value` with six decimals.
pub fn write_series_csv(path: &Path, series: &DailySeries) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record(SERIES_HEADER)?;
    for (date, value) in series.points() {
        let value = if value.is_finite() {
            format!("{:.6}", value)
        } else {
            String::new()
        };
        wtr.write_record([date.format("%Y-%m-%d").to_string(), value])?;
    }
    wtr.flush()?;

    info!(path = ?path, rows = series.len(), "Wrote series CSV");
    Ok(())
}

/// Read a `date,value` CSV. Empty values load as NaN.
pub fn read_series_csv(path: &Path) -> Result<DailySeries> {
    let mut rdr = csv::Reader::from_path(path)?;

    let headers = rdr.headers()?.clone();
    let date_col = column(&headers, "date", path)?;
    let value_col = column(&headers, "value", path)?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let date = parse_date(record.get(date_col).unwrap_or("").trim())?;
        let raw = record.get(value_col).unwrap_or("").trim();
        let value = if raw.is_empty() {
            f64::NAN
        } else {
            raw.parse::<f64>().map_err(|_| {
                IngestionError::InvalidSeriesCsv(format!("{:?}: bad value '{}' on {}", path, raw, date))
            })?
        };
        points.push((date, value));
    }

    Ok(DailySeries::from_points(points))
}

fn column(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
        .ok_or_else(|| IngestionError::InvalidSeriesCsv(format!("{:?}: no '{}' column", path, name)))
}

fn one_decimal(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.1}", v),
        _ => String::new(),
    }
}

fn met_csv_record(row: &MetRow) -> [String; 9] {
    [
        row.year().to_string(),
        row.day().to_string(),
        one_decimal(row.radn),
        one_decimal(Some(row.maxt)),
        one_decimal(Some(row.mint)),
        one_decimal(Some(row.rain)),
        one_decimal(row.evap),
        one_decimal(row.vp),
        row.code.clone().unwrap_or_default(),
    ]
}

/// Write the MET table as CSV: same columns, no header commentary, absent
/// values as empty strings.
pub fn write_met_csv(path: &Path, table: &WeatherTable) -> Result<()> {
    let file = File::create(path)?;
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record(MET_CSV_HEADER)?;
    for row in &table.rows {
        wtr.write_record(met_csv_record(row))?;
    }
    wtr.flush()?;

    info!(path = ?path, rows = table.len(), "Wrote MET CSV");
    Ok(())
}
