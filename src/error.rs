//! Error types for projections and assumption loading

use thiserror::Error;

use crate::account::FilingStatus;
use crate::assumptions::PhaseOutKind;

/// Result type alias for projection operations
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Failures raised synchronously by the projection engine and its lookups
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Bad numeric input or an input combination the account type does not accept
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Income-based limit requested but no range exists for this kind/status
    #[error("No {kind:?} phase-out rule for {filing_status:?} filers in {year}")]
    MissingPhaseOutRule {
        kind: PhaseOutKind,
        filing_status: FilingStatus,
        year: i32,
    },

    /// Year precedes the table or the table refuses to extrapolate
    #[error("Year {year} is outside the supported range of the {table} table")]
    UnsupportedYear { year: i32, table: String },
}

impl ProjectionError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ProjectionError::InvalidParameter(message.into())
    }
}

/// Failures while reading assumption or scenario files
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Invalid data: {0}")]
    Invalid(#[from] ProjectionError),
}
