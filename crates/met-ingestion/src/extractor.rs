//! Variable Extractor: one variable's daily series at one grid cell.
//!
//! Files are processed one at a time. The grid cell is resolved from the
//! first readable file and reused for every later file. A file that fails to
//! open or parse is logged and skipped; the series is built from whatever
//! files succeeded.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use met_common::{GridCoordinate, ResolvedIndex};
use netcdf_parser::{resolve_schema, GridSource, NetCdfGridFile};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::discovery::{discover_files, DiscoveryStrategy};
use crate::error::{IngestionError, Result};
use crate::locator::locate;
use crate::series::DailySeries;
use crate::time_axis::{resolve_dates, TimeAxisContext, TimeAxisStrategy};

/// Options shared by every file of an extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractOptions {
    pub target: GridCoordinate,
    pub tolerance: f64,
    pub fallback_year: i32,
}

impl ExtractOptions {
    pub fn from_config(config: &RunConfig) -> Result<Self> {
        Ok(Self {
            target: config.validate()?,
            tolerance: config.tolerance,
            fallback_year: config.fallback_year,
        })
    }
}

/// A file left out of a series and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of extracting one variable.
#[derive(Debug, Clone)]
pub struct VariableExtraction {
    pub variable: String,
    pub series: DailySeries,
    pub index: ResolvedIndex,
    pub discovery: DiscoveryStrategy,
    pub files_used: usize,
    pub skipped_files: Vec<SkippedFile>,
}

/// Resolve the grid cell for `target` from one file's axes.
pub fn resolve_index(
    source: &dyn GridSource,
    variable: &str,
    target: &GridCoordinate,
    tolerance: f64,
) -> Result<ResolvedIndex> {
    let schema = resolve_schema(source, variable)?;
    let lats = source.read_axis(&schema.lat_axis)?;
    let lons = source.read_axis(&schema.lon_axis)?;
    locate(&lats, &lons, target, tolerance)
}

/// Read one file's dated values at `index`.
pub fn read_fragment(
    source: &dyn GridSource,
    variable: &str,
    index: &ResolvedIndex,
    fallback_year: i32,
) -> Result<(Vec<(NaiveDate, f64)>, TimeAxisStrategy)> {
    let schema = resolve_schema(source, variable)?;
    let values = source.read_cell_series(
        &schema.field,
        &schema.lat_dim,
        &schema.lon_dim,
        index.lat_index,
        index.lon_index,
    )?;

    let axis = match &schema.time_axis {
        Some(name) => match source.time_axis(name) {
            Ok(axis) => Some(axis),
            Err(e) => {
                debug!(path = ?source.path(), error = %e, "Time coordinate unreadable");
                None
            }
        },
        None => None,
    };

    let resolved = resolve_dates(&TimeAxisContext {
        path: source.path(),
        axis: axis.as_ref(),
        value_count: values.len(),
        fallback_year,
    });

    let fragment = resolved.dates.into_iter().zip(values).collect();
    Ok((fragment, resolved.strategy))
}

/// Extract `variable` from an explicit list of files.
///
/// Returns the series, the resolved index and the files that were skipped.
pub fn extract_files(
    files: &[PathBuf],
    variable: &str,
    options: &ExtractOptions,
) -> Result<(DailySeries, ResolvedIndex, Vec<SkippedFile>)> {
    let mut index: Option<ResolvedIndex> = None;
    let mut fragments = Vec::with_capacity(files.len());
    let mut skipped = Vec::new();

    for path in files {
        match extract_one(path, variable, options, &mut index) {
            Ok((fragment, strategy)) => {
                debug!(
                    path = ?path,
                    variable = variable,
                    values = fragment.len(),
                    time_axis = strategy.name(),
                    "Extracted file"
                );
                fragments.push(fragment);
            }
            Err(e) => {
                warn!(path = ?path, variable = variable, error = %e, "Skipping file");
                skipped.push(SkippedFile {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let series = DailySeries::from_fragments(fragments);
    match index {
        Some(index) if !series.is_empty() => Ok((series, index, skipped)),
        _ => Err(IngestionError::NoData {
            variable: variable.to_string(),
        }),
    }
}

fn extract_one(
    path: &Path,
    variable: &str,
    options: &ExtractOptions,
    index: &mut Option<ResolvedIndex>,
) -> Result<(Vec<(NaiveDate, f64)>, TimeAxisStrategy)> {
    let file = NetCdfGridFile::open(path)?;
    let resolved = match index {
        Some(resolved) => *resolved,
        None => {
            let resolved = resolve_index(&file, variable, &options.target, options.tolerance)?;
            *index = Some(resolved);
            resolved
        }
    };
    read_fragment(&file, variable, &resolved, options.fallback_year)
}

/// Discover and extract `variable` under `dir`.
pub fn extract_variable(
    dir: &Path,
    variable: &str,
    options: &ExtractOptions,
) -> Result<VariableExtraction> {
    let discovery = discover_files(dir, variable)?;
    info!(
        variable = variable,
        strategy = discovery.strategy.name(),
        files = discovery.files.len(),
        "Discovered source files"
    );

    let (series, index, skipped_files) = extract_files(&discovery.files, variable, options)?;
    let files_used = discovery.files.len() - skipped_files.len();

    info!(
        variable = variable,
        days = series.len(),
        first = ?series.first_date(),
        last = ?series.last_date(),
        files_used,
        skipped = skipped_files.len(),
        "Extracted variable"
    );

    Ok(VariableExtraction {
        variable: variable.to_string(),
        series,
        index,
        discovery: discovery.strategy,
        files_used,
        skipped_files,
    })
}
