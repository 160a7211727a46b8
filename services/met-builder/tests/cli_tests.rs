//! Tests for command-line parsing, run-file loading and the subcommands.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::Parser;
use met_builder::cli::{Cli, Command};
use met_builder::{commands, parse_level, resolve_run_config, RunOverrides};
use test_utils::grid::SEQ_1DEG;
use test_utils::runs::{MODEL, SCENARIO};
use test_utils::{
    create_model_scenario_dir, daily_dates, periodic_rain, seasonal_temperature, temp_test_dir,
    write_daily_file, Cmip6File,
};
use tracing::Level;

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_parse_extract_with_overrides() {
    let cli = Cli::try_parse_from([
        "met-builder",
        "--log-level",
        "debug",
        "extract",
        "--config",
        "run.yaml",
        "--lat",
        "-31.75",
        "--lon",
        "117.6",
        "--variables",
        "tasmax,tasmin,pr",
        "--summary",
        "summary.json",
    ])
    .unwrap();

    assert_eq!(parse_level(&cli.log_level), Level::DEBUG);
    match cli.command {
        Command::Extract(args) => {
            assert_eq!(args.config, Some(PathBuf::from("run.yaml")));
            assert_eq!(args.overrides.lat, Some(-31.75));
            assert_eq!(args.overrides.lon, Some(117.6));
            assert_eq!(args.overrides.variables, vec!["tasmax", "tasmin", "pr"]);
            assert_eq!(args.summary, Some(PathBuf::from("summary.json")));
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_parse_inspect() {
    let cli = Cli::try_parse_from(["met-builder", "inspect", "site.met", "--json"]).unwrap();
    match cli.command {
        Command::Inspect(args) => {
            assert_eq!(args.met_file, PathBuf::from("site.met"));
            assert!(args.json);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_convert_requires_input_dir() {
    assert!(Cli::try_parse_from(["met-builder", "convert", "--config", "run.yaml"]).is_err());
}

#[test]
fn test_parse_level_defaults_to_info() {
    assert_eq!(parse_level("WARN"), Level::WARN);
    assert_eq!(parse_level("verbose"), Level::INFO);
}

// ============================================================================
// Run configuration
// ============================================================================

fn write_run_file(dir: &Path, base: &Path, out: &Path) -> PathBuf {
    let path = dir.join("run.yaml");
    let content = format!(
        r#"
run:
  model: {model}
  scenario: {scenario}
  latitude: ${{MET_CLI_TEST_LAT:--27.0}}
  longitude: 153.0
  variables: [tasmax, tasmin, pr]
paths:
  cmip6_base_dir: {base}
  output_dir: {out}
"#,
        model = MODEL,
        scenario = SCENARIO,
        base = base.display(),
        out = out.display()
    );
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_overrides_apply_on_top_of_file() {
    let tmp = temp_test_dir();
    let path = write_run_file(tmp.path(), Path::new("/data/cmip6"), Path::new("/data/out"));

    let overrides = RunOverrides {
        lon: Some(152.0),
        tolerance: Some(0.5),
        ..RunOverrides::default()
    };
    let config = resolve_run_config(Some(&path), &overrides).unwrap();

    assert_eq!(config.latitude, -27.0);
    assert_eq!(config.longitude, 152.0);
    assert_eq!(config.tolerance, 0.5);
    assert_eq!(config.variables, vec!["tasmax", "tasmin", "pr"]);
    assert_eq!(config.output_dir, PathBuf::from("/data/out"));
}

#[test]
fn test_flags_without_file_need_required_fields() {
    let partial = RunOverrides {
        model: Some(MODEL.to_string()),
        ..RunOverrides::default()
    };
    let err = resolve_run_config(None, &partial).unwrap_err();
    assert!(err.to_string().contains("--scenario"));

    let full = RunOverrides {
        model: Some(MODEL.to_string()),
        scenario: Some(SCENARIO.to_string()),
        lat: Some(-27.0),
        lon: Some(153.0),
        base_dir: Some("/data/cmip6".to_string()),
        ..RunOverrides::default()
    };
    let config = resolve_run_config(None, &full).unwrap();
    assert_eq!(config.data_dir(), PathBuf::from("/data/cmip6/ACCESS-CM2 ssp245"));
}

#[test]
fn test_sample_run_file_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/met-builder.yaml");
    let config = met_builder::load_config(&path).unwrap().to_run_config();
    assert_eq!(config.variables, vec!["tasmax", "tasmin", "pr", "rsds"]);
    assert_eq!(config.tolerance, 0.01);
    assert_eq!(config.fallback_year, 2035);
}

// ============================================================================
// Subcommands
// ============================================================================

fn write_archive(base: &Path) {
    let data_dir = create_model_scenario_dir(base, MODEL, SCENARIO);
    let dates = daily_dates(NaiveDate::from_ymd_opt(2035, 1, 1).unwrap(), 365);
    let fields = [
        ("tasmax", seasonal_temperature(&dates, 24.0, 6.0)),
        ("tasmin", seasonal_temperature(&dates, 11.0, 5.0)),
        ("pr", periodic_rain(365, 3, 4.0)),
    ];
    for (field, series) in fields {
        let spec = Cmip6File::daily(field, &SEQ_1DEG, dates[0], series);
        write_daily_file(&data_dir, &spec, MODEL, SCENARIO, 2035);
    }
}

#[test]
fn test_extract_then_inspect() {
    let tmp = temp_test_dir();
    let base = tmp.path().join("cmip6");
    let out = tmp.path().join("out");
    write_archive(&base);
    let run_file = write_run_file(tmp.path(), &base, &out);
    let summary_path = tmp.path().join("summary.json");

    let cli = Cli::try_parse_from([
        "met-builder",
        "extract",
        "--config",
        run_file.to_str().unwrap(),
        "--summary",
        summary_path.to_str().unwrap(),
    ])
    .unwrap();
    let Command::Extract(args) = cli.command else {
        panic!("expected extract");
    };

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let summary = commands::extract(&args, today).unwrap();
    assert_eq!(summary.num_rows, 365);
    assert!(summary_path.exists());

    let report = commands::render_summary(&summary);
    assert!(report.contains("MET file rows: 365"));
    assert!(report.contains("vapor pressure left blank"));

    let cli = Cli::try_parse_from([
        "met-builder",
        "inspect",
        summary.outputs.met_file.to_str().unwrap(),
    ])
    .unwrap();
    let Command::Inspect(args) = cli.command else {
        panic!("expected inspect");
    };
    let inspection = commands::inspect(&args).unwrap();
    assert_eq!(inspection.num_rows, 365);
    assert_eq!(inspection.latitude, Some(-27.0));
    assert!(commands::render_inspection(&inspection).contains("Day count matches calendar"));
}

#[test]
fn test_extract_rejects_invalid_coordinate() {
    let tmp = temp_test_dir();
    let run_file = write_run_file(tmp.path(), tmp.path(), tmp.path());

    let cli = Cli::try_parse_from([
        "met-builder",
        "extract",
        "--config",
        run_file.to_str().unwrap(),
        "--lat=-95",
    ])
    .unwrap();
    let Command::Extract(args) = cli.command else {
        panic!("expected extract");
    };

    let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
    let err = commands::extract(&args, today).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid latitude"));
}
