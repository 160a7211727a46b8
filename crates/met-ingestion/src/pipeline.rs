//! Run orchestration: one (model, scenario, coordinate) per run.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use met_common::{ClimateVariable, GridCoordinate};
use serde::Serialize;
use tracing::{info, warn};

use crate::assembler::{assemble, Assembly, AssemblyInput};
use crate::config::RunConfig;
use crate::error::{IngestionError, Result};
use crate::extractor::{extract_variable, ExtractOptions, SkippedFile};
use crate::met::{read_met_file, write_met_file, DayCountCheck, MetHeader};
use crate::metadata::{
    detect_file_type, met_csv_name, met_file_name, variable_csv_name, FileType,
};
use crate::series::DailySeries;
use crate::tabular::{read_series_csv, write_met_csv, write_series_csv};

/// Files written by a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunOutputs {
    pub met_file: PathBuf,
    pub met_csv: PathBuf,
    pub variable_csvs: Vec<PathBuf>,
}

/// What a run produced and what it had to skip.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub latitude: f64,
    pub longitude: f64,
    pub model: String,
    pub scenario: String,
    pub variables_extracted: Vec<String>,
    pub missing_variables: Vec<String>,
    /// Grid cell actually used, when extracted from NetCDF
    pub grid_cell: Option<GridCoordinate>,
    pub tav: f64,
    pub amp: f64,
    pub num_rows: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub day_count: DayCountCheck,
    pub skipped_files: Vec<SkippedFile>,
    pub warnings: Vec<String>,
    pub outputs: RunOutputs,
}

impl RunSummary {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        info!(path = ?path, "Wrote run summary");
        Ok(())
    }

    fn log(&self) {
        info!(
            model = %self.model,
            scenario = %self.scenario,
            latitude = self.latitude,
            longitude = self.longitude,
            variables = ?self.variables_extracted,
            rows = self.num_rows,
            start = %self.start_date,
            end = %self.end_date,
            tav = self.tav,
            amp = self.amp,
            skipped_files = self.skipped_files.len(),
            warnings = self.warnings.len(),
            "Run complete"
        );
    }
}

/// Builds MET files for one configured run.
///
/// Construction validates the configuration, so an out-of-range coordinate
/// fails before any file is touched.
#[derive(Debug, Clone)]
pub struct MetBuilder {
    config: RunConfig,
    coordinate: GridCoordinate,
    stem: String,
}

/// State gathered while collecting series, before assembly.
#[derive(Debug, Default)]
struct Collected {
    input: AssemblyInput,
    extracted: Vec<String>,
    missing: Vec<String>,
    grid_cell: Option<GridCoordinate>,
    skipped_files: Vec<SkippedFile>,
    warnings: Vec<String>,
    variable_csvs: Vec<PathBuf>,
}

impl Collected {
    fn accept(&mut self, variable: &str, series: DailySeries) {
        match ClimateVariable::from_id(variable) {
            Some(known) => self.input.insert(known, series),
            None => info!(variable = variable, "Variable takes no part in MET assembly"),
        }
        self.extracted.push(variable.to_string());
    }

    fn not_found(&mut self, variable: &str, error: &IngestionError) {
        warn!(variable = variable, error = %error, "Variable not available");
        self.warnings.push(format!("{}: {}", variable, error));
        self.missing.push(variable.to_string());
    }

    fn unreadable(&mut self, variable: &str, path: &Path, error: &IngestionError) {
        warn!(variable = variable, path = ?path, error = %error, "Skipping unreadable series CSV");
        self.warnings
            .push(format!("{}: skipped {:?}: {}", variable, path, error));
        self.skipped_files.push(SkippedFile {
            path: path.to_path_buf(),
            reason: error.to_string(),
        });
        self.missing.push(variable.to_string());
    }
}

impl MetBuilder {
    pub fn new(config: RunConfig) -> Result<Self> {
        let coordinate = config.validate()?;
        let stem = config.output_stem()?;
        Ok(Self {
            config,
            coordinate,
            stem,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Shared stem of every output file name.
    pub fn stem(&self) -> &str {
        &self.stem
    }

    fn output_path(&self, name: String) -> PathBuf {
        self.config.output_dir.join(name)
    }

    /// Extract every configured variable from NetCDF and write the MET file,
    /// its CSV mirror and one CSV per extracted variable.
    pub fn process_coordinate(&self, generated_on: NaiveDate) -> Result<RunSummary> {
        let data_dir = self.config.data_dir();
        info!(
            model = %self.config.model,
            scenario = %self.config.scenario,
            latitude = self.coordinate.latitude,
            longitude = self.coordinate.longitude,
            data_dir = ?data_dir,
            "Processing coordinate"
        );
        if !data_dir.is_dir() {
            return Err(IngestionError::DataDirectoryNotFound(data_dir));
        }
        fs::create_dir_all(&self.config.output_dir)?;

        let options = ExtractOptions::from_config(&self.config)?;
        let mut collected = Collected::default();

        for variable in &self.config.variables {
            let extraction = match extract_variable(&data_dir, variable, &options) {
                Ok(extraction) => extraction,
                Err(e) if e.is_not_found() => {
                    collected.not_found(variable, &e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !extraction.index.within_tolerance {
                collected.warnings.push(format!(
                    "{}: nearest grid cell ({:.4}, {:.4}) is {:.4} degrees from the requested point",
                    variable,
                    extraction.index.actual_lat,
                    extraction.index.actual_lon,
                    extraction.index.distance()
                ));
            }
            for skipped in &extraction.skipped_files {
                collected
                    .warnings
                    .push(format!("{}: skipped {:?}: {}", variable, skipped.path, skipped.reason));
            }
            collected.grid_cell.get_or_insert(extraction.index.actual_coordinate());
            collected.skipped_files.extend(extraction.skipped_files);

            let csv_path = self.output_path(variable_csv_name(&self.stem, variable));
            write_series_csv(&csv_path, &extraction.series)?;
            collected.variable_csvs.push(csv_path);

            collected.accept(variable, extraction.series);
        }

        self.finish(collected, generated_on)
    }

    /// Assemble a MET file from per-variable CSVs written by an earlier run.
    pub fn convert_from_csv(&self, input_dir: &Path, generated_on: NaiveDate) -> Result<RunSummary> {
        info!(input_dir = ?input_dir, stem = %self.stem, "Converting series CSVs");
        if !input_dir.is_dir() {
            return Err(IngestionError::DataDirectoryNotFound(input_dir.to_path_buf()));
        }
        fs::create_dir_all(&self.config.output_dir)?;

        let mut collected = Collected::default();
        for variable in &self.config.variables {
            let path = input_dir.join(variable_csv_name(&self.stem, variable));
            if !path.is_file() {
                let err = IngestionError::NoFilesFound {
                    variable: variable.clone(),
                    dir: input_dir.to_path_buf(),
                };
                collected.not_found(variable, &err);
                continue;
            }
            let series = match read_series_csv(&path) {
                Ok(series) => series,
                Err(e) => {
                    collected.unreadable(variable, &path, &e);
                    continue;
                }
            };
            if series.is_empty() {
                let err = IngestionError::NoData {
                    variable: variable.clone(),
                };
                collected.not_found(variable, &err);
                continue;
            }
            info!(variable = %variable, path = ?path, days = series.len(), "Loaded series CSV");
            collected.accept(variable, series);
        }

        self.finish(collected, generated_on)
    }

    fn finish(&self, mut collected: Collected, generated_on: NaiveDate) -> Result<RunSummary> {
        let Assembly { table, stats, fills } = assemble(&collected.input)?;

        if collected.input.radiation.is_none() {
            collected
                .warnings
                .push("no radiation series; radn left blank".to_string());
        }
        if collected.input.relative_humidity.is_none() {
            collected
                .warnings
                .push("no humidity series; vapor pressure left blank".to_string());
        } else if fills.vp_missing > 0 {
            collected.warnings.push(format!(
                "{} days without humidity; vapor pressure left blank",
                fills.vp_missing
            ));
        }

        let header = MetHeader {
            latitude: self.coordinate.latitude,
            longitude: self.coordinate.longitude,
            stats,
            model: self.config.model.clone(),
            scenario: self.config.scenario.clone(),
            generated_on,
        };

        let met_file = self.output_path(met_file_name(&self.stem));
        let day_count = write_met_file(&met_file, &header, &table)?;
        if !day_count.is_consistent() {
            collected.warnings.push(format!(
                "MET day count {} differs from calendar expectation {}",
                day_count.actual, day_count.expected
            ));
        }
        let met_csv = self.output_path(met_csv_name(&self.stem));
        write_met_csv(&met_csv, &table)?;

        let summary = RunSummary {
            latitude: self.coordinate.latitude,
            longitude: self.coordinate.longitude,
            model: self.config.model.clone(),
            scenario: self.config.scenario.clone(),
            variables_extracted: collected.extracted,
            missing_variables: collected.missing,
            grid_cell: collected.grid_cell,
            tav: stats.tav,
            amp: stats.amp,
            num_rows: table.len(),
            start_date: table.span.start,
            end_date: table.span.end,
            day_count,
            skipped_files: collected.skipped_files,
            warnings: collected.warnings,
            outputs: RunOutputs {
                met_file,
                met_csv,
                variable_csvs: collected.variable_csvs,
            },
        };
        summary.log();
        Ok(summary)
    }
}

/// Header values and row statistics of an existing MET file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetInspection {
    pub path: PathBuf,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub tav: Option<f64>,
    pub amp: Option<f64>,
    pub num_rows: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub day_count: DayCountCheck,
    pub rows_with_vapor_pressure: usize,
}

/// Parse a MET file and summarise it.
pub fn inspect_met(path: &Path) -> Result<MetInspection> {
    if detect_file_type(path) != FileType::Met {
        return Err(IngestionError::InvalidMetFile(format!(
            "{:?} does not have a .met extension",
            path
        )));
    }
    let doc = read_met_file(path)?;
    let day_count = doc.day_count_check();
    if !day_count.is_consistent() {
        warn!(
            path = ?path,
            expected = day_count.expected,
            actual = day_count.actual,
            "MET day count differs from calendar"
        );
    }
    Ok(MetInspection {
        path: path.to_path_buf(),
        latitude: doc.latitude,
        longitude: doc.longitude,
        tav: doc.tav,
        amp: doc.amp,
        num_rows: doc.records.len(),
        first_date: doc.first_date(),
        last_date: doc.last_date(),
        rows_with_vapor_pressure: doc.records.iter().filter(|r| r.vp.is_some()).count(),
        day_count,
    })
}
