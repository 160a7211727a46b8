//! Subcommand handlers.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use met_ingestion::{inspect_met, MetBuilder, MetInspection, RunSummary};
use tracing::info;

use crate::cli::{ConvertArgs, ExtractArgs, InspectArgs};
use crate::config::resolve_run_config;

/// Full NetCDF to MET run.
pub fn extract(args: &ExtractArgs, generated_on: NaiveDate) -> Result<RunSummary> {
    let config = resolve_run_config(args.config.as_deref(), &args.overrides)?;
    let builder = MetBuilder::new(config).context("Invalid run configuration")?;

    let summary = builder
        .process_coordinate(generated_on)
        .with_context(|| format!("Failed to build MET file {}", builder.stem()))?;

    if let Some(path) = &args.summary {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {:?}", path))?;
    }
    Ok(summary)
}

/// Per-variable CSVs to MET.
pub fn convert(args: &ConvertArgs, generated_on: NaiveDate) -> Result<RunSummary> {
    let config = resolve_run_config(args.config.as_deref(), &args.overrides)?;
    let builder = MetBuilder::new(config).context("Invalid run configuration")?;

    let summary = builder
        .convert_from_csv(&args.input_dir, generated_on)
        .with_context(|| format!("Failed to convert CSVs in {:?}", args.input_dir))?;

    if let Some(path) = &args.summary {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {:?}", path))?;
    }
    Ok(summary)
}

pub fn inspect(args: &InspectArgs) -> Result<MetInspection> {
    info!(path = ?args.met_file, "Inspecting MET file");
    inspect_met(&args.met_file).with_context(|| format!("Failed to read {:?}", args.met_file))
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Human-readable end-of-run report.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut lines = vec![
        format!(
            "Coordinate: ({:.6}, {:.6})  Model: {}  Scenario: {}",
            summary.latitude, summary.longitude, summary.model, summary.scenario
        ),
        format!(
            "Variables extracted: {} ({})",
            summary.variables_extracted.len(),
            summary.variables_extracted.join(", ")
        ),
        format!("MET file rows: {}", summary.num_rows),
        format!("Date range: {} to {}", summary.start_date, summary.end_date),
        format!("tav (annual average temp): {:.2} C", summary.tav),
        format!("amp (annual amplitude): {:.2} C", summary.amp),
        format!("MET file: {}", summary.outputs.met_file.display()),
    ];
    if !summary.missing_variables.is_empty() {
        lines.push(format!("Missing variables: {}", summary.missing_variables.join(", ")));
    }
    if !summary.skipped_files.is_empty() {
        lines.push(format!("Skipped files: {}", summary.skipped_files.len()));
    }
    for warning in &summary.warnings {
        lines.push(format!("warning: {}", warning));
    }
    lines.join("\n")
}

pub fn render_inspection(report: &MetInspection) -> String {
    let dates = match (report.first_date, report.last_date) {
        (Some(first), Some(last)) => format!("{} to {}", first, last),
        _ => "-".to_string(),
    };
    let mut lines = vec![
        format!("File: {}", report.path.display()),
        format!(
            "latitude: {}  longitude: {}",
            fmt_opt(report.latitude),
            fmt_opt(report.longitude)
        ),
        format!("tav: {}  amp: {}", fmt_opt(report.tav), fmt_opt(report.amp)),
        format!("Rows: {}  Dates: {}", report.num_rows, dates),
        format!("Rows with vapor pressure: {}", report.rows_with_vapor_pressure),
    ];
    if report.day_count.is_consistent() {
        lines.push("Day count matches calendar".to_string());
    } else {
        lines.push(format!(
            "Day count {} differs from calendar expectation {} (years {:?})",
            report.day_count.actual, report.day_count.expected, report.day_count.mismatched_years
        ));
    }
    lines.join("\n")
}
