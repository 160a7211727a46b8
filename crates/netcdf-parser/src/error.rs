//! Error types for NetCDF parsing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error reported by the netCDF library
    #[error("NetCDF library error: {0}")]
    Library(#[from] netcdf::Error),

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// The file layout did not match any known field or axis names
    #[error("Schema not recognized in {path:?}: {reason}")]
    SchemaNotRecognized { path: PathBuf, reason: String },

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Time axis could not be interpreted
    #[error("Invalid time axis: {0}")]
    InvalidTime(String),

    /// Time axis uses a calendar that does not map onto real dates
    #[error("Unsupported calendar: {0}")]
    UnsupportedCalendar(String),
}
