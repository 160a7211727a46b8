//! Metadata extraction from file names and output naming.

use std::path::Path;
use std::sync::OnceLock;

use met_common::GridCoordinate;
use regex::Regex;

/// Years accepted when inferring a file's year from its name.
pub const FILENAME_YEAR_RANGE: std::ops::RangeInclusive<i32> = 2000..=2100;

/// Detected file type based on extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Gridded NetCDF source
    NetCdf,
    /// APSIM MET document
    Met,
    /// Unknown format
    Unknown,
}

/// Detect file type from path.
pub fn detect_file_type(path: &Path) -> FileType {
    let lower = path.to_string_lossy().to_lowercase();

    if lower.ends_with(".nc") || lower.ends_with(".nc4") || lower.ends_with(".netcdf") {
        FileType::NetCdf
    } else if lower.ends_with(".met") {
        FileType::Met
    } else {
        FileType::Unknown
    }
}

fn four_digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{4}").expect("static regex"))
}

/// First non-overlapping four-digit run in the file name that falls in
/// [`FILENAME_YEAR_RANGE`].
///
/// `tasmax_day_ACCESS-CM2_ssp245_r1i1p1f1_gn_20350101-20351231.nc` yields 2035.
pub fn extract_year_from_filename(path: &Path) -> Option<i32> {
    let filename = path.file_name().and_then(|s| s.to_str())?;

    four_digit_runs()
        .find_iter(filename)
        .filter_map(|m| m.as_str().parse::<i32>().ok())
        .find(|year| FILENAME_YEAR_RANGE.contains(year))
}

/// Stem shared by the MET file, its CSV mirror and per-variable CSVs:
/// `{model}_{scenario}_{lat:.2}_{lon:.2}` with spaces in the model replaced.
pub fn output_stem(model: &str, scenario: &str, coordinate: &GridCoordinate) -> String {
    format!(
        "{}_{}_{}",
        model.replace(' ', "_"),
        scenario,
        coordinate.file_label()
    )
}

/// `{stem}_{variable}.csv`
pub fn variable_csv_name(stem: &str, variable: &str) -> String {
    format!("{}_{}.csv", stem, variable)
}

/// `{stem}.met`
pub fn met_file_name(stem: &str) -> String {
    format!("{}.met", stem)
}

/// `{stem}.csv`
pub fn met_csv_name(stem: &str) -> String {
    format!("{}.csv", stem)
}
