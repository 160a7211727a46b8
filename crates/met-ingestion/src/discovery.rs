//! Source file discovery.
//!
//! Archives are not laid out consistently, so discovery is an ordered list of
//! named strategies. The first strategy that yields at least one file wins;
//! every attempt and its outcome is logged.

use std::path::{Path, PathBuf};

use met_common::ClimateVariable;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IngestionError, Result};
use crate::metadata::{detect_file_type, FileType};

/// One way of locating the files for a variable under a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStrategy {
    /// NetCDF files directly in the directory whose name contains the id
    DirectMatch,
    /// First `{id}_*` subdirectory holding NetCDF files
    PrefixedSubdirectory,
    /// First `rad_*` subdirectory holding NetCDF files (radiation only)
    RadiationSubdirectory,
    /// Subdirectory named exactly after the id
    NamedSubdirectory,
}

impl DiscoveryStrategy {
    /// Strategies in the order they are tried.
    pub const ORDER: [DiscoveryStrategy; 4] = [
        DiscoveryStrategy::DirectMatch,
        DiscoveryStrategy::PrefixedSubdirectory,
        DiscoveryStrategy::RadiationSubdirectory,
        DiscoveryStrategy::NamedSubdirectory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            DiscoveryStrategy::DirectMatch => "direct-match",
            DiscoveryStrategy::PrefixedSubdirectory => "prefixed-subdirectory",
            DiscoveryStrategy::RadiationSubdirectory => "radiation-subdirectory",
            DiscoveryStrategy::NamedSubdirectory => "named-subdirectory",
        }
    }

    /// Whether the strategy is meaningful for `variable`.
    pub fn applies_to(&self, variable: &str) -> bool {
        match self {
            DiscoveryStrategy::RadiationSubdirectory => {
                ClimateVariable::from_id(variable) == Some(ClimateVariable::Radiation)
            }
            _ => true,
        }
    }

    /// Sorted NetCDF files this strategy finds, possibly none.
    pub fn find(&self, dir: &Path, variable: &str) -> Result<Vec<PathBuf>> {
        match self {
            DiscoveryStrategy::DirectMatch => {
                let files = netcdf_files(dir)?
                    .into_iter()
                    .filter(|p| file_name(p).contains(variable))
                    .collect();
                Ok(files)
            }
            DiscoveryStrategy::PrefixedSubdirectory => {
                first_populated_subdir(dir, &format!("{}_", variable))
            }
            DiscoveryStrategy::RadiationSubdirectory => first_populated_subdir(dir, "rad_"),
            DiscoveryStrategy::NamedSubdirectory => {
                let sub = dir.join(variable);
                if sub.is_dir() {
                    netcdf_files(&sub)
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }
}

/// Files found for one variable and the strategy that found them.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovery {
    pub strategy: DiscoveryStrategy,
    pub files: Vec<PathBuf>,
}

/// Run the strategies in order and return the first non-empty result.
pub fn discover_files(dir: &Path, variable: &str) -> Result<Discovery> {
    if !dir.is_dir() {
        return Err(IngestionError::DataDirectoryNotFound(dir.to_path_buf()));
    }

    for strategy in DiscoveryStrategy::ORDER {
        if !strategy.applies_to(variable) {
            continue;
        }
        let files = strategy.find(dir, variable)?;
        debug!(
            variable = variable,
            strategy = strategy.name(),
            found = files.len(),
            "Tried discovery strategy"
        );
        if !files.is_empty() {
            return Ok(Discovery { strategy, files });
        }
    }

    Err(IngestionError::NoFilesFound {
        variable: variable.to_string(),
        dir: dir.to_path_buf(),
    })
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|s| s.to_str()).unwrap_or("")
}

/// Immediate children of `dir`, sorted by name.
fn children(dir: &Path) -> Result<Vec<walkdir::DirEntry>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        entries.push(entry.map_err(std::io::Error::from)?);
    }
    Ok(entries)
}

/// NetCDF files directly inside `dir`, sorted by name.
fn netcdf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(children(dir)?
        .into_iter()
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| detect_file_type(p) == FileType::NetCdf)
        .collect())
}

/// NetCDF files of the first subdirectory starting with `prefix` that has any.
fn first_populated_subdir(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    for entry in children(dir)? {
        if !entry.file_type().is_dir() || !file_name(entry.path()).starts_with(prefix) {
            continue;
        }
        let files = netcdf_files(entry.path())?;
        if !files.is_empty() {
            return Ok(files);
        }
    }
    Ok(Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_direct_match_wins_and_is_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("tasmax_day_2036.nc"));
        touch(&tmp.path().join("tasmax_day_2035.nc"));
        touch(&tmp.path().join("tasmin_day_2035.nc"));
        touch(&tmp.path().join("tasmax_notes.txt"));
        touch(&tmp.path().join("tasmax_extra/tasmax_2037.nc"));

        let found = discover_files(tmp.path(), "tasmax").unwrap();
        assert_eq!(found.strategy, DiscoveryStrategy::DirectMatch);
        let names: Vec<_> = found.files.iter().map(|p| file_name(p).to_string()).collect();
        assert_eq!(names, vec!["tasmax_day_2035.nc", "tasmax_day_2036.nc"]);
    }

    #[test]
    fn test_prefixed_subdirectory_skips_empty_ones() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("pr_a_empty")).unwrap();
        touch(&tmp.path().join("pr_b/day_2035.nc"));
        touch(&tmp.path().join("pr_c/day_2036.nc"));

        let found = discover_files(tmp.path(), "pr").unwrap();
        assert_eq!(found.strategy, DiscoveryStrategy::PrefixedSubdirectory);
        assert_eq!(found.files.len(), 1);
        assert!(found.files[0].ends_with("pr_b/day_2035.nc"));
    }

    #[test]
    fn test_radiation_subdirectory_only_for_rsds() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("rad_daily/surface_2035.nc"));

        let found = discover_files(tmp.path(), "rsds").unwrap();
        assert_eq!(found.strategy, DiscoveryStrategy::RadiationSubdirectory);

        let err = discover_files(tmp.path(), "hurs").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_named_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("hurs/day_2035.nc"));

        let found = discover_files(tmp.path(), "hurs").unwrap();
        assert_eq!(found.strategy, DiscoveryStrategy::NamedSubdirectory);
    }

    #[test]
    fn test_missing_directory() {
        let err = discover_files(Path::new("/nonexistent/ACCESS-CM2 ssp245"), "pr").unwrap_err();
        assert!(matches!(err, IngestionError::DataDirectoryNotFound(_)));
        assert!(err.is_not_found());
    }
}
