//! Error types for grid and axis validation.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while validating grid payloads at the load boundary.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("Empty coordinate axis: {0}")]
    EmptyAxis(&'static str),

    #[error("Non-finite coordinate in {axis} at index {index}")]
    NonFiniteCoordinate { axis: &'static str, index: usize },

    #[error("Axis {0} is not strictly monotonic")]
    NotMonotonic(&'static str),

    #[error("Grid has {rows} rows but {expected} latitudes")]
    RowCountMismatch { rows: usize, expected: usize },

    #[error("Row {row} has {len} values but {expected} longitudes")]
    RaggedRow { row: usize, len: usize, expected: usize },

    #[error("Value buffer has {len} values, expected {expected}")]
    BufferSizeMismatch { len: usize, expected: usize },

    #[error("Malformed grid payload: {0}")]
    Malformed(String),

    #[error("Invalid time units: {0}")]
    InvalidTimeUnits(String),
}

impl GridError {
    /// True for errors caused by inconsistent array shapes rather than bad syntax.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(
            self,
            GridError::RowCountMismatch { .. }
                | GridError::RaggedRow { .. }
                | GridError::BufferSizeMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::Malformed(err.to_string())
    }
}
