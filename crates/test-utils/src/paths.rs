//! Path utilities for locating test data and laying out model archives.

use std::path::{Path, PathBuf};

/// Returns the workspace root directory.
///
/// This is determined by walking up from the current crate's manifest directory
/// until we find the workspace Cargo.toml.
pub fn workspace_root() -> PathBuf {
    // Start from the test-utils crate manifest dir
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    PathBuf::from(manifest_dir)
        .parent() // crates/
        .and_then(|p| p.parent()) // workspace root
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from(manifest_dir))
}

/// Searches for a real CMIP6 file in the usual places.
///
/// Checks `TEST_DATA_DIR` first, then `crates/netcdf-parser/testdata/` and the
/// workspace-level `testdata/`.
pub fn find_test_file(name: &str) -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(test_data_dir) = std::env::var("TEST_DATA_DIR") {
        candidates.push(PathBuf::from(test_data_dir).join(name));
    }

    let root = workspace_root();
    candidates.extend([
        root.join("crates/netcdf-parser/testdata").join(name),
        root.join("testdata").join(name),
    ]);

    candidates.into_iter().find(|path| path.exists())
}

/// Directory holding one model/scenario archive: `{base}/{model} {scenario}`.
pub fn model_scenario_dir(base: &Path, model: &str, scenario: &str) -> PathBuf {
    base.join(format!("{} {}", model, scenario))
}

/// Create `{base}/{model} {scenario}` and return it.
pub fn create_model_scenario_dir(base: &Path, model: &str, scenario: &str) -> PathBuf {
    let dir = model_scenario_dir(base, model, scenario);
    std::fs::create_dir_all(&dir).expect("Failed to create model/scenario directory");
    dir
}

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary test directory")
}
