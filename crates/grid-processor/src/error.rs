//! Error types for grid processing.

use ocean_common::GridError;
use thiserror::Error;

/// Coarse classification of failures, used to pick a recovery strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network/parse failure fetching a grid, image or chunk.
    LoadFailure,
    /// Declared array shape disagrees with the coordinate arrays.
    ShapeMismatch,
    /// Zero-span box, empty axes, all-missing data.
    DegenerateInput,
    /// Source too large to load interactively.
    ResourceSize,
    /// Superseded by a newer request.
    Cancelled,
}

/// Errors that can occur during grid processing.
#[derive(Error, Debug)]
pub enum GridProcessorError {
    /// Failed to fetch or read the data source.
    #[error("failed to load grid: {0}")]
    LoadFailed(String),

    /// The payload failed schema validation.
    #[error("invalid grid payload: {0}")]
    InvalidPayload(#[from] GridError),

    /// Arrays disagree in shape.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Input carries nothing usable.
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// Source exceeds the configured size limit.
    #[error("source {name} is {size} bytes, limit is {limit}")]
    ResourceTooLarge { name: String, size: u64, limit: u64 },

    /// The request was superseded before it finished.
    #[error("request cancelled")]
    Cancelled,

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl GridProcessorError {
    /// Create a LoadFailed error.
    pub fn load_failed(msg: impl Into<String>) -> Self {
        Self::LoadFailed(msg.into())
    }

    /// Create a Degenerate error.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::Degenerate(msg.into())
    }

    /// Create a ShapeMismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Self::ShapeMismatch(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::LoadFailed(_) | Self::ConfigError(_) => ErrorKind::LoadFailure,
            Self::InvalidPayload(e) if e.is_shape_mismatch() => ErrorKind::ShapeMismatch,
            Self::InvalidPayload(GridError::EmptyAxis(_)) => ErrorKind::DegenerateInput,
            Self::InvalidPayload(_) => ErrorKind::LoadFailure,
            Self::ShapeMismatch(_) => ErrorKind::ShapeMismatch,
            Self::Degenerate(_) => ErrorKind::DegenerateInput,
            Self::ResourceTooLarge { .. } => ErrorKind::ResourceSize,
            Self::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<std::io::Error> for GridProcessorError {
    fn from(err: std::io::Error) -> Self {
        Self::LoadFailed(err.to_string())
    }
}

impl From<serde_json::Error> for GridProcessorError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidPayload(GridError::from(err))
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
