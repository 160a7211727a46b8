//! APSIM MET builder.
//!
//! Extracts one grid cell from CMIP6 daily NetCDF archives and writes an
//! APSIM MET weather file, its CSV mirror and per-variable CSVs.

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use met_builder::cli::{Cli, Command};
use met_builder::{commands, parse_level};

fn init_tracing(level: Level, json: bool) -> Result<()> {
    if json {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(parse_level(&cli.log_level), cli.log_json)?;

    netcdf_parser::silence_hdf5_errors();

    let today = chrono::Local::now().date_naive();

    match &cli.command {
        Command::Extract(args) => {
            info!("Starting MET extraction");
            let summary = commands::extract(args, today)?;
            println!("{}", commands::render_summary(&summary));
        }
        Command::Convert(args) => {
            info!("Starting CSV to MET conversion");
            let summary = commands::convert(args, today)?;
            println!("{}", commands::render_summary(&summary));
        }
        Command::Inspect(args) => {
            let report = commands::inspect(args)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", commands::render_inspection(&report));
            }
        }
    }

    Ok(())
}
