//! Configuration loader for met-builder
//!
//! Loads a YAML run file describing one (model, scenario, coordinate) run.
//! Supports environment variable substitution using ${VAR} and
//! ${VAR:-default} syntax, and `~` expansion in paths.

use anyhow::{Context, Result};
use met_ingestion::{default_variables, RunConfig, DEFAULT_FALLBACK_YEAR};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Run file (met-builder.yaml)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetBuilderConfig {
    pub run: RunSection,
    pub paths: PathsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSection {
    pub model: String,
    pub scenario: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "default_variables")]
    pub variables: Vec<String>,
    #[serde(default)]
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub fallback_year: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Root holding one `{model} {scenario}` directory per run
    pub cmip6_base_dir: String,
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl MetBuilderConfig {
    /// Convert to the library's run configuration, expanding `~` in paths.
    pub fn to_run_config(&self) -> RunConfig {
        let mut config = RunConfig::new(
            self.run.model.clone(),
            self.run.scenario.clone(),
            self.run.latitude,
            self.run.longitude,
            expand_path(&self.paths.cmip6_base_dir),
        )
        .with_variables(&self.run.variables);

        if let Some(tolerance) = self.run.tolerance {
            config = config.with_tolerance(tolerance);
        }
        if let Some(dir) = &self.paths.output_dir {
            config = config.with_output_dir(expand_path(dir));
        }
        config.fallback_year = self.run.fallback_year.unwrap_or(DEFAULT_FALLBACK_YEAR);
        config
    }
}

// ============================================================================
// Loading Functions
// ============================================================================

/// Load and parse a run file with environment variable substitution
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MetBuilderConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read run config from {:?}", path.as_ref()))?;

    parse_config(&content)
        .with_context(|| format!("Failed to load run config from {:?}", path.as_ref()))
}

/// Parse run file content with environment variable substitution
pub fn parse_config(content: &str) -> Result<MetBuilderConfig> {
    let expanded = expand_env_vars(content)?;

    let config: MetBuilderConfig =
        serde_yaml::from_str(&expanded).with_context(|| "Failed to parse run config YAML")?;

    validate_config(&config)?;

    Ok(config)
}

/// Expand a leading `~` to the home directory
pub fn expand_path(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw.trim()).as_ref())
}

// ============================================================================
// Environment Variable Expansion
// ============================================================================

/// Expand environment variables in YAML content
/// Supports ${VAR} and ${VAR:-default} syntax
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::new();
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut var_expr = String::new();
            let mut brace_count = 1;

            while brace_count > 0 {
                match chars.next() {
                    Some('{') => {
                        brace_count += 1;
                        var_expr.push('{');
                    }
                    Some('}') => {
                        brace_count -= 1;
                        if brace_count > 0 {
                            var_expr.push('}');
                        }
                    }
                    Some(c) => var_expr.push(c),
                    None => anyhow::bail!("Unclosed variable substitution: ${{{}", var_expr),
                }
            }

            let value = resolve_var_expr(&var_expr)?;
            result.push_str(&value);
        } else {
            result.push(ch);
        }
    }

    Ok(result)
}

/// Resolve variable expression (supports VAR and VAR:-default syntax)
fn resolve_var_expr(expr: &str) -> Result<String> {
    if let Some((var_name, default)) = expr.split_once(":-") {
        match std::env::var(var_name.trim()) {
            Ok(val) if !val.is_empty() => Ok(val),
            _ => Ok(default.to_string()),
        }
    } else {
        std::env::var(expr.trim())
            .with_context(|| format!("Environment variable {} not set", expr))
    }
}

// ============================================================================
// Validation
// ============================================================================

fn validate_config(config: &MetBuilderConfig) -> Result<()> {
    anyhow::ensure!(!config.run.model.trim().is_empty(), "Model cannot be empty");
    anyhow::ensure!(
        !config.run.scenario.trim().is_empty(),
        "Scenario cannot be empty"
    );
    anyhow::ensure!(
        !config.paths.cmip6_base_dir.trim().is_empty(),
        "cmip6_base_dir cannot be empty"
    );
    anyhow::ensure!(
        !config.run.variables.is_empty(),
        "At least one variable must be listed"
    );
    if let Some(tolerance) = config.run.tolerance {
        anyhow::ensure!(
            tolerance > 0.0,
            "Invalid tolerance: {}. Must be greater than 0",
            tolerance
        );
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
run:
  model: ACCESS CM2
  scenario: ssp245
  latitude: -31.75
  longitude: 117.6
paths:
  cmip6_base_dir: /data/cmip6
"#;

    #[test]
    fn test_expand_env_vars_simple() {
        std::env::set_var("MET_TEST_VAR", "test_value");
        let result = expand_env_vars("prefix_${MET_TEST_VAR}_suffix").unwrap();
        assert_eq!(result, "prefix_test_value_suffix");
    }

    #[test]
    fn test_expand_env_vars_with_default() {
        std::env::remove_var("MET_NONEXISTENT_VAR");
        let result = expand_env_vars("value_${MET_NONEXISTENT_VAR:-default}_end").unwrap();
        assert_eq!(result, "value_default_end");
    }

    #[test]
    fn test_expand_env_vars_missing_required() {
        std::env::remove_var("MET_REQUIRED_VAR");
        assert!(expand_env_vars("${MET_REQUIRED_VAR}").is_err());
        assert!(expand_env_vars("${MET_UNCLOSED").is_err());
    }

    #[test]
    fn test_resolve_var_expr_negative_default() {
        std::env::remove_var("MET_SITE_LAT");
        let result = resolve_var_expr("MET_SITE_LAT:--31.75").unwrap();
        assert_eq!(result, "-31.75");
    }

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_config(MINIMAL).unwrap();
        let run = config.to_run_config();
        assert_eq!(run.model, "ACCESS CM2");
        assert_eq!(run.variables, vec!["tasmax", "tasmin", "pr", "rsds"]);
        assert_eq!(run.tolerance, 0.01);
        assert_eq!(run.fallback_year, 2035);
        assert_eq!(run.output_dir, PathBuf::from("."));
        assert_eq!(run.data_dir(), PathBuf::from("/data/cmip6/ACCESS CM2 ssp245"));
    }

    #[test]
    fn test_rejects_empty_model() {
        let content = MINIMAL.replace("ACCESS CM2", "\"\"");
        assert!(parse_config(&content).is_err());
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/cmip6");
        assert!(!expanded.to_string_lossy().starts_with('~') || std::env::var("HOME").is_err());
        assert_eq!(expand_path("/abs/path"), PathBuf::from("/abs/path"));
    }
}
