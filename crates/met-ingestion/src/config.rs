//! Run configuration.
//!
//! A run extracts one (model, scenario, coordinate) triple. Everything a
//! component needs is carried on [`RunConfig`]; nothing is read from globals.

use std::path::PathBuf;

use met_common::{ClimateVariable, GridCoordinate, MetError, DEFAULT_TOLERANCE_DEG};
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, Result};
use crate::metadata::output_stem;

/// Year assumed for files whose time axis and filename give no usable date.
pub const DEFAULT_FALLBACK_YEAR: i32 = 2035;

/// Variables extracted when none are configured.
pub fn default_variables() -> Vec<String> {
    [
        ClimateVariable::MaxTemperature,
        ClimateVariable::MinTemperature,
        ClimateVariable::Precipitation,
        ClimateVariable::Radiation,
    ]
    .iter()
    .map(|v| v.id().to_string())
    .collect()
}

fn default_tolerance() -> f64 {
    DEFAULT_TOLERANCE_DEG
}

fn default_fallback_year() -> i32 {
    DEFAULT_FALLBACK_YEAR
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Parameters for one extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Climate model name, e.g. `ACCESS-CM2`
    pub model: String,
    /// Emissions scenario, e.g. `ssp245`
    pub scenario: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Variable ids to extract
    #[serde(default = "default_variables")]
    pub variables: Vec<String>,
    /// Maximum per-axis distance in degrees before a warning is logged
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Root holding one `{model} {scenario}` directory per run
    pub cmip6_base_dir: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_fallback_year")]
    pub fallback_year: i32,
}

impl RunConfig {
    pub fn new(
        model: impl Into<String>,
        scenario: impl Into<String>,
        latitude: f64,
        longitude: f64,
        cmip6_base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            scenario: scenario.into(),
            latitude,
            longitude,
            variables: default_variables(),
            tolerance: DEFAULT_TOLERANCE_DEG,
            cmip6_base_dir: cmip6_base_dir.into(),
            output_dir: default_output_dir(),
            fallback_year: DEFAULT_FALLBACK_YEAR,
        }
    }

    pub fn with_variables<S: AsRef<str>>(mut self, variables: &[S]) -> Self {
        self.variables = variables.iter().map(|v| v.as_ref().to_string()).collect();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Check every field; returns the validated coordinate.
    pub fn validate(&self) -> Result<GridCoordinate> {
        let coordinate = GridCoordinate::new(self.latitude, self.longitude)?;

        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(MetError::InvalidTolerance(self.tolerance).into());
        }
        if self.model.trim().is_empty() {
            return Err(IngestionError::InvalidConfig("model must not be empty".into()));
        }
        if self.scenario.trim().is_empty() {
            return Err(IngestionError::InvalidConfig(
                "scenario must not be empty".into(),
            ));
        }
        if self.variables.is_empty() {
            return Err(IngestionError::InvalidConfig(
                "at least one variable is required".into(),
            ));
        }
        if self.variables.iter().any(|v| v.trim().is_empty()) {
            return Err(IngestionError::InvalidConfig(
                "variable ids must not be empty".into(),
            ));
        }

        Ok(coordinate)
    }

    /// `{cmip6_base_dir}/{model} {scenario}`
    pub fn data_dir(&self) -> PathBuf {
        self.cmip6_base_dir
            .join(format!("{} {}", self.model, self.scenario))
    }

    /// File stem shared by every artifact of this run.
    pub fn output_stem(&self) -> Result<String> {
        let coordinate = GridCoordinate::new(self.latitude, self.longitude)?;
        Ok(output_stem(&self.model, &self.scenario, &coordinate))
    }
}
