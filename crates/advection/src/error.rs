use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdvectionError {
    #[error("invalid advection config: {0}")]
    InvalidConfig(String),

    /// The field's bounding box has no area to spawn into.
    #[error("vector field has a degenerate extent")]
    DegenerateField,
}

pub type Result<T> = std::result::Result<T, AdvectionError>;
