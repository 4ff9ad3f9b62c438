//! Error types for palette construction.

use thiserror::Error;

/// Errors that can occur while building palettes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PaletteError {
    /// A colour stop was not a `#rrggbb` / `#rgb` hex string.
    #[error("invalid hex colour: {0}")]
    InvalidHex(String),

    /// No colour stops were supplied.
    #[error("palette needs at least one colour stop")]
    NoStops,

    /// The requested palette name is neither a preset nor registered.
    #[error("unknown palette: {0}")]
    UnknownPalette(String),
}

/// Result type for palette operations.
pub type Result<T> = std::result::Result<T, PaletteError>;
