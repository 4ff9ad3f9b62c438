//! Error types for scene composition.

use grid_processor::GridProcessorError;
use ocean_common::GridError;
use palette::PaletteError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Palette(#[from] PaletteError),

    #[error(transparent)]
    Grid(#[from] GridProcessorError),

    #[error("invalid grid: {0}")]
    InvalidGrid(#[from] GridError),

    /// A layer's arrays disagree with its axes.
    #[error("layer {layer}: {reason}")]
    InvalidLayer { layer: String, reason: String },

    #[error("camera record: {0}")]
    Camera(String),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub fn invalid_layer(layer: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLayer {
            layer: layer.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SceneError>;
