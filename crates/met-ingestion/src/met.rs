//! APSIM MET document writer and reader.
//!
//! A MET file is a comment-heavy header followed by fixed-width daily rows:
//!
//! ```text
//! year  day radn  maxt   mint  rain  evap    vp   code
//! 2035    1   17.3   31.2   19.8    0.0          21.4 222222
//! ```
//!
//! Field positions (0-based, end exclusive): year 0..4, day 5..9, radn
//! 10..16, maxt 17..23, mint 24..30, rain 31..37, evap 38..44, vp 45..51,
//! code 52..58. Absent optional fields are six spaces.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use met_common::days_in_year;
use serde::Serialize;
use tracing::{info, warn};

use crate::assembler::{MetRow, WeatherTable};
use crate::derived::TemperatureStats;
use crate::error::{IngestionError, Result};

const BLANK_FIELD: &str = "      ";

const SILO_CODE_NOTES: &str = "\
!As evaporation is read at 9am, it has been shifted to day before
!ie The evaporation measured on 20 April is in row for 19 April
!The 6 digit code indicates the source of the 6 data columns
!0 actual observation, 1 actual observation composite station
!2 interpolated from daily observations
!3 interpolated from daily observations using anomaly interpolation method for CLIMARC data
!6 synthetic pan
!7 interpolated long term averages
!more detailed two digit codes are available in SILO's 'Standard' format files
!
!For further information see the documentation on the datadrill
!  http://www.longpaddock.qld.gov.au/silo
!
";

const COLUMN_NAMES: &str = "year  day radn  maxt   mint  rain  evap    vp   code";
const COLUMN_UNITS: &str = " ()   () (MJ/m^2) (oC)  (oC)  (mm)  (mm) (hPa)     ()";

/// Values rendered into the header block.
#[derive(Debug, Clone, PartialEq)]
pub struct MetHeader {
    pub latitude: f64,
    pub longitude: f64,
    pub stats: TemperatureStats,
    pub model: String,
    pub scenario: String,
    pub generated_on: NaiveDate,
}

impl MetHeader {
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("[weather.met.weather]\n");
        out.push_str("!Your Ref:  \"\n");
        out.push_str(&format!("latitude = {:.2}  (DECIMAL DEGREES)\n", self.latitude));
        out.push_str(&format!("longitude =  {:.2}  (DECIMAL DEGREES)\n", self.longitude));
        out.push_str(&format!(
            "tav = {:.2} (oC) ! Annual average ambient temperature.\n",
            self.stats.tav
        ));
        out.push_str(&format!(
            "amp = {:.2} (oC) ! Annual amplitude in mean monthly temperature.\n",
            self.stats.amp
        ));
        out.push_str(&format!(
            "!Data Extracted from CMIP6 {} {} dataset on {} for APSIM\n",
            self.model,
            self.scenario,
            self.generated_on.format("%Y%m%d")
        ));
        out.push_str(SILO_CODE_NOTES);
        out.push_str(COLUMN_NAMES);
        out.push('\n');
        out.push_str(COLUMN_UNITS);
        out.push('\n');
        out
    }
}

fn optional_field(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:6.1}", v),
        None => BLANK_FIELD.to_string(),
    }
}

fn required_field(value: f64) -> String {
    let v = if value.is_finite() { value } else { 0.0 };
    format!("{:6.1}", v)
}

/// One fixed-width data line, without the trailing newline.
pub fn format_row(row: &MetRow) -> String {
    let code = match &row.code {
        Some(code) => format!("{:>6}", code),
        None => BLANK_FIELD.to_string(),
    };
    format!(
        "{:4} {:4} {} {} {} {} {} {} {}",
        row.year(),
        row.day(),
        optional_field(row.radn),
        required_field(row.maxt),
        required_field(row.mint),
        required_field(row.rain),
        optional_field(row.evap),
        optional_field(row.vp),
        code
    )
}

/// Rows present versus the calendar expectation for the years they touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCountCheck {
    pub expected: usize,
    pub actual: usize,
    /// Years whose row count differs from 365/366, with the count found
    pub mismatched_years: Vec<(i32, usize)>,
}

impl DayCountCheck {
    pub fn is_consistent(&self) -> bool {
        self.expected == self.actual && self.mismatched_years.is_empty()
    }
}

/// Compare rows per year against 365/366.
pub fn check_day_counts<I>(years: I) -> DayCountCheck
where
    I: IntoIterator<Item = i32>,
{
    let mut per_year: BTreeMap<i32, usize> = BTreeMap::new();
    for year in years {
        *per_year.entry(year).or_insert(0) += 1;
    }
    let expected = per_year.keys().map(|y| days_in_year(*y) as usize).sum();
    let actual = per_year.values().sum();
    let mismatched_years = per_year
        .into_iter()
        .filter(|(year, n)| *n != days_in_year(*year) as usize)
        .collect();
    DayCountCheck {
        expected,
        actual,
        mismatched_years,
    }
}

/// Write the header and every row of `table`.
pub fn write_met<W: Write>(mut writer: W, header: &MetHeader, table: &WeatherTable) -> Result<()> {
    writer.write_all(header.render().as_bytes())?;
    for row in &table.rows {
        writeln!(writer, "{}", format_row(row))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write a MET file to `path` and report the day-count check.
///
/// A day-count mismatch is logged, never an error.
pub fn write_met_file(path: &Path, header: &MetHeader, table: &WeatherTable) -> Result<DayCountCheck> {
    let file = File::create(path)?;
    write_met(BufWriter::new(file), header, table)?;

    let check = check_day_counts(table.rows.iter().map(MetRow::year));
    if !check.is_consistent() {
        warn!(
            path = ?path,
            expected = check.expected,
            actual = check.actual,
            years = ?check.mismatched_years,
            "MET day count differs from calendar"
        );
    }
    info!(path = ?path, rows = table.len(), "Wrote MET file");
    Ok(check)
}

/// One parsed data line.
#[derive(Debug, Clone, PartialEq)]
pub struct MetRecord {
    pub year: i32,
    pub day: u32,
    pub radn: Option<f64>,
    pub maxt: Option<f64>,
    pub mint: Option<f64>,
    pub rain: Option<f64>,
    pub evap: Option<f64>,
    pub vp: Option<f64>,
    pub code: Option<String>,
}

/// A parsed MET document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetDocument {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tav: Option<f64>,
    pub amp: Option<f64>,
    pub records: Vec<MetRecord>,
}

impl MetDocument {
    pub fn day_count_check(&self) -> DayCountCheck {
        check_day_counts(self.records.iter().map(|r| r.year))
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.records
            .first()
            .and_then(|r| NaiveDate::from_yo_opt(r.year, r.day))
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.records
            .last()
            .and_then(|r| NaiveDate::from_yo_opt(r.year, r.day))
    }
}

fn field(line: &str, start: usize, end: usize) -> &str {
    let len = line.len();
    line.get(start.min(len)..end.min(len)).unwrap_or("").trim()
}

fn parse_number(text: &str, line_no: usize, name: &str) -> Result<Option<f64>> {
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<f64>().map(Some).map_err(|_| {
        IngestionError::InvalidMetFile(format!("line {}: bad {} value '{}'", line_no, name, text))
    })
}

fn parse_record(line: &str, line_no: usize) -> Result<MetRecord> {
    let year = field(line, 0, 4);
    let day = field(line, 5, 9);
    let year = year.parse::<i32>().map_err(|_| {
        IngestionError::InvalidMetFile(format!("line {}: bad year '{}'", line_no, year))
    })?;
    let day = day.parse::<u32>().map_err(|_| {
        IngestionError::InvalidMetFile(format!("line {}: bad day '{}'", line_no, day))
    })?;
    let code = field(line, 52, 58);

    Ok(MetRecord {
        year,
        day,
        radn: parse_number(field(line, 10, 16), line_no, "radn")?,
        maxt: parse_number(field(line, 17, 23), line_no, "maxt")?,
        mint: parse_number(field(line, 24, 30), line_no, "mint")?,
        rain: parse_number(field(line, 31, 37), line_no, "rain")?,
        evap: parse_number(field(line, 38, 44), line_no, "evap")?,
        vp: parse_number(field(line, 45, 51), line_no, "vp")?,
        code: (!code.is_empty()).then(|| code.to_string()),
    })
}

fn header_value(line: &str, key: &str) -> Option<f64> {
    let (name, rest) = line.split_once('=')?;
    if name.trim() != key {
        return None;
    }
    rest.split_whitespace().next()?.parse().ok()
}

/// Parse MET text. Header keys that are absent come back as `None`.
pub fn parse_met(text: &str) -> Result<MetDocument> {
    let mut doc = MetDocument::default();

    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('!') || trimmed.starts_with('[') {
            continue;
        }
        if trimmed.contains('=') {
            doc.latitude = doc.latitude.or_else(|| header_value(trimmed, "latitude"));
            doc.longitude = doc.longitude.or_else(|| header_value(trimmed, "longitude"));
            doc.tav = doc.tav.or_else(|| header_value(trimmed, "tav"));
            doc.amp = doc.amp.or_else(|| header_value(trimmed, "amp"));
            continue;
        }
        // Column name and unit rows
        if !trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            continue;
        }
        doc.records.push(parse_record(line, i + 1)?);
    }

    Ok(doc)
}

pub fn read_met_file(path: &Path) -> Result<MetDocument> {
    let text = std::fs::read_to_string(path)?;
    parse_met(&text)
}
