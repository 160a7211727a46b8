//! Command-line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing::Level;

use crate::config::RunOverrides;

#[derive(Parser, Debug)]
#[command(name = "met-builder")]
#[command(about = "Build APSIM MET weather files from CMIP6 daily NetCDF archives")]
pub struct Cli {
    /// Log level
    #[arg(long, global = true, env = "MET_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract grid-cell series from NetCDF and write a MET file
    Extract(ExtractArgs),
    /// Build a MET file from per-variable CSVs of an earlier run
    Convert(ConvertArgs),
    /// Parse an existing MET file and report on it
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Run file (YAML)
    #[arg(short, long, env = "MET_BUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: RunOverrides,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Run file (YAML)
    #[arg(short, long, env = "MET_BUILDER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding `{stem}_{variable}.csv` files
    #[arg(long)]
    pub input_dir: PathBuf,

    #[command(flatten)]
    pub overrides: RunOverrides,

    /// Write the run summary as JSON to this path
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// MET file to read
    pub met_file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

/// Map a `--log-level` value to a tracing level, defaulting to INFO.
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
