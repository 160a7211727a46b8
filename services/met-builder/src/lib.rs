//! met-builder library components.
//!
//! Exposes the CLI definition, configuration loading and subcommand handlers
//! so they can be exercised from integration tests.

pub mod cli;
pub mod commands;
pub mod config;
pub mod config_loader;

pub use cli::{parse_level, Cli, Command};
pub use config::{resolve_run_config, RunOverrides};
pub use config_loader::{load_config, parse_config, MetBuilderConfig};
