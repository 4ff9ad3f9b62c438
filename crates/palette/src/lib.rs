//! Palette engine.
//!
//! Builds 256-entry colour ramps from a handful of hex control points and
//! turns them into the `[fraction, "rgb(r,g,b)"]` colorscales consumed by the
//! rendering collaborator:
//! - Continuous colorscales (one stop per palette entry)
//! - Discrete colorscales (flat bands with hard edges)
//! - Banded colorscales (flat bands at fixed physical values, e.g. depths)

pub mod color;
pub mod colorscale;
pub mod error;
pub mod library;
pub mod palette;
pub mod presets;

pub use color::Rgb;
pub use colorscale::{Colorscale, ColorscaleStop};
pub use error::{PaletteError, Result};
pub use library::PaletteLibrary;
pub use palette::{make_linear_palette, Palette, PALETTE_SIZE};
