//! Run configuration assembled from the YAML file and command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use met_ingestion::RunConfig;
use tracing::info;

use crate::config_loader::{expand_path, load_config};

/// Command-line values that override the run file.
#[derive(Args, Debug, Clone, Default)]
pub struct RunOverrides {
    /// Target latitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Target longitude in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Climate model name, e.g. "ACCESS CM2"
    #[arg(long)]
    pub model: Option<String>,

    /// Emissions scenario, e.g. ssp245
    #[arg(long)]
    pub scenario: Option<String>,

    /// Comma-separated variable ids
    #[arg(long, value_delimiter = ',')]
    pub variables: Vec<String>,

    /// Grid matching tolerance in degrees
    #[arg(long)]
    pub tolerance: Option<f64>,

    /// Root holding `{model} {scenario}` directories
    #[arg(long, env = "CMIP6_BASE_DIR")]
    pub base_dir: Option<String>,

    /// Directory for written files
    #[arg(long, env = "MET_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    /// Year assumed for files with no usable dates
    #[arg(long)]
    pub fallback_year: Option<i32>,
}

impl RunOverrides {
    /// Apply every flag that was given on top of `config`.
    pub fn apply(&self, mut config: RunConfig) -> RunConfig {
        if let Some(lat) = self.lat {
            config.latitude = lat;
        }
        if let Some(lon) = self.lon {
            config.longitude = lon;
        }
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(scenario) = &self.scenario {
            config.scenario = scenario.clone();
        }
        if !self.variables.is_empty() {
            config.variables = self.variables.clone();
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(dir) = &self.base_dir {
            config.cmip6_base_dir = expand_path(dir);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = expand_path(dir);
        }
        if let Some(year) = self.fallback_year {
            config.fallback_year = year;
        }
        config
    }

    /// Build a configuration from flags alone.
    fn standalone(&self) -> Result<RunConfig> {
        let model = self.model.clone().context("--model is required without --config")?;
        let scenario = self
            .scenario
            .clone()
            .context("--scenario is required without --config")?;
        let lat = self.lat.context("--lat is required without --config")?;
        let lon = self.lon.context("--lon is required without --config")?;
        let base = self
            .base_dir
            .as_deref()
            .context("--base-dir is required without --config")?;

        Ok(self.apply(RunConfig::new(model, scenario, lat, lon, expand_path(base))))
    }
}

/// Load the run file when given, then apply command-line overrides.
pub fn resolve_run_config(config_path: Option<&Path>, overrides: &RunOverrides) -> Result<RunConfig> {
    let config = match config_path {
        Some(path) => {
            let file = load_config(path)?;
            info!(path = ?path, "Loaded run configuration");
            overrides.apply(file.to_run_config())
        }
        None => overrides.standalone()?,
    };

    info!(
        model = %config.model,
        scenario = %config.scenario,
        latitude = config.latitude,
        longitude = config.longitude,
        variables = ?config.variables,
        tolerance = config.tolerance,
        base_dir = ?config.cmip6_base_dir,
        output_dir = ?config.output_dir,
        "Resolved run configuration"
    );
    Ok(config)
}
