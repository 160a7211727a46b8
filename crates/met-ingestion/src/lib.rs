//! CMIP6 grid-cell extraction and APSIM MET assembly.
//!
//! # Architecture
//!
//! A run processes exactly one (model, scenario, coordinate) triple,
//! sequentially, one variable and one file at a time:
//!
//! - [`discovery`] finds the NetCDF files for a variable
//! - [`locator`] resolves the nearest grid cell, per axis
//! - [`time_axis`] dates each file's values
//! - [`extractor`] stitches per-file fragments into a [`DailySeries`]
//! - [`assembler`] merges series onto a complete daily calendar, filling gaps
//!   and deriving radiation and vapor pressure
//! - [`met`] and [`tabular`] render the MET document and its CSV forms
//!
//! [`MetBuilder`] ties these together for a [`RunConfig`].

pub mod assembler;
pub mod config;
pub mod derived;
pub mod discovery;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod met;
pub mod metadata;
pub mod pipeline;
pub mod series;
pub mod tabular;
pub mod time_axis;

// Re-exports
pub use assembler::{assemble, Assembly, AssemblyInput, MetRow, WeatherTable, RADIATION_W_TO_MJ};
pub use config::{default_variables, RunConfig, DEFAULT_FALLBACK_YEAR};
pub use derived::{temperature_stats, vapor_pressure_hpa, TemperatureStats, HUMIDITY_DERIVED_CODE};
pub use discovery::{discover_files, Discovery, DiscoveryStrategy};
pub use error::{IngestionError, Result};
pub use extractor::{extract_files, extract_variable, ExtractOptions, SkippedFile, VariableExtraction};
pub use locator::{locate, nearest_index};
pub use met::{parse_met, read_met_file, write_met_file, DayCountCheck, MetDocument, MetHeader, MetRecord};
pub use metadata::{detect_file_type, extract_year_from_filename, output_stem, FileType};
pub use pipeline::{inspect_met, MetBuilder, MetInspection, RunOutputs, RunSummary};
pub use series::DailySeries;
pub use time_axis::{resolve_dates, TimeAxisStrategy};
