//! Scene composition for the ocean viewer.
//!
//! This crate takes a normalised [`Bathymetry`] and whatever overlays are
//! active and produces the scene description the rendering collaborator
//! draws:
//!
//! ```text
//! Bathymetry ──┬─► DepthWarp (geometry only) ──┐
//! FieldLayers ─┤   Resampler (index maps)      ├─► SurfaceCompositor ─► Scene (JSON)
//! Particles ───┤   PaletteLibrary / cache      │
//! Transect ────┘                               ┘
//! ```
//!
//! [`Bathymetry`]: grid_processor::Bathymetry

pub mod camera;
pub mod compositor;
pub mod config;
pub mod contour;
pub mod depth_warp;
pub mod error;
pub mod trace;
pub mod transect;

pub use camera::{CameraRecord, Projection, Vec3, CAMERA_RECORD_VERSION};
pub use compositor::{
    ClassLayer, FieldLayer, OverlayStyle, ParticleLayer, Placement, SceneRequest,
    SurfaceCompositor, BATHYMETRY_TRACE, LAND_TRACE,
};
pub use config::CompositorConfig;
pub use contour::{generate_contour_levels, ContourSpec, SurfaceContours};
pub use depth_warp::{DepthTick, DepthWarp, WarpMode};
pub use error::{Result, SceneError};
pub use trace::{
    AxisLayout, ColorBar, Coords, LineStyle, MarkerStyle, ScatterMode, ScatterTrace, Scene,
    SceneLayout, SurfaceTrace, Trace,
};
pub use transect::{build_curtain, CurtainStyle, Transect};
