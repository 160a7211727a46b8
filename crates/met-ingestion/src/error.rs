//! Error types for the extraction pipeline.

use std::path::PathBuf;

use met_common::MetError;
use netcdf_parser::NetCdfError;
use thiserror::Error;

/// Errors that can occur while extracting and assembling a MET file.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to read NetCDF data: {0}")]
    NetCdf(#[from] NetCdfError),

    #[error(transparent)]
    Common(#[from] MetError),

    #[error("Failed to read or write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found: {0:?}")]
    DataDirectoryNotFound(PathBuf),

    #[error("No files found for {variable} under {dir:?}")]
    NoFilesFound { variable: String, dir: PathBuf },

    #[error("No data extracted for {variable}")]
    NoData { variable: String },

    #[error("Missing variables required for MET assembly: {}", .0.join(", "))]
    MissingRequiredVariables(Vec<String>),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid series CSV: {0}")]
    InvalidSeriesCsv(String),

    #[error("Invalid MET file: {0}")]
    InvalidMetFile(String),
}

impl IngestionError {
    /// Conditions a caller may treat as "no result" and skip.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            IngestionError::DataDirectoryNotFound(_)
                | IngestionError::NoFilesFound { .. }
                | IngestionError::NoData { .. }
                | IngestionError::MissingRequiredVariables(_)
                | IngestionError::NetCdf(NetCdfError::SchemaNotRecognized { .. })
        )
    }

    /// Conditions that must stop a run before any processing.
    pub fn is_fatal(&self) -> bool {
        match self {
            IngestionError::Common(e) => e.is_fatal(),
            IngestionError::InvalidConfig(_) => true,
            _ => false,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        let err = IngestionError::NoFilesFound {
            variable: "hurs".into(),
            dir: PathBuf::from("/data"),
        };
        assert!(err.is_not_found());
        assert!(!err.is_fatal());

        let err = IngestionError::NetCdf(NetCdfError::SchemaNotRecognized {
            path: PathBuf::from("a.nc"),
            reason: "no latitude axis".into(),
        });
        assert!(err.is_not_found());

        let err = IngestionError::NetCdf(NetCdfError::MissingData("lat".into()));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(IngestionError::from(MetError::InvalidLatitude(95.0)).is_fatal());
        assert!(!IngestionError::from(MetError::InvalidDate("x".into())).is_fatal());
        assert!(IngestionError::InvalidConfig("empty model".into()).is_fatal());
    }

    #[test]
    fn test_missing_variables_message() {
        let err = IngestionError::MissingRequiredVariables(vec!["tasmin".into(), "pr".into()]);
        assert_eq!(
            err.to_string(),
            "Missing variables required for MET assembly: tasmin, pr"
        );
    }
}
