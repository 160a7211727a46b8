//! Error types shared by the MET workspace crates.

use thiserror::Error;

/// Result type alias using MetError.
pub type MetResult<T> = Result<T, MetError>;

/// Errors raised while constructing or validating shared domain values.
#[derive(Debug, Error)]
pub enum MetError {
    #[error("Invalid latitude {0}: must be between -90 and 90")]
    InvalidLatitude(f64),

    #[error("Invalid longitude {0}: must be between -180 and 180")]
    InvalidLongitude(f64),

    #[error("Invalid tolerance {0}: must be a positive number of degrees")]
    InvalidTolerance(f64),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unknown climate variable: {0}")]
    UnknownVariable(String),
}

impl MetError {
    /// Whether this error must abort a run before any processing starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MetError::InvalidLatitude(_)
                | MetError::InvalidLongitude(_)
                | MetError::InvalidTolerance(_)
        )
    }
}
