//! Grid normalisation and resampling for ocean scenes.
//!
//! This crate turns heterogeneous numeric grids into data that shares the
//! bathymetry grid's coordinates:
//!
//! - **Normalisation**: sign-convention detection, land/ocean split and
//!   point-budget downsampling of bathymetry
//! - **Resampling**: nearest-neighbour index maps between lon/lat grids with
//!   masking rules, cached per (source, target) pair
//! - **Vector sampling**: bilinear u/v lookup for particle advection
//! - **Classification**: reservoir-sampled point buckets from 3D volumes
//! - **Raster overlays**: image pixels decoded back into values
//!
//! # Architecture
//!
//! ```text
//! grid JSON ──► BathymetryLoader (async, last-request-wins)
//!                    │
//!                    ▼
//!              normalize_bathymetry
//!                    │  sign detection → downsample → land/ocean split
//!                    ▼
//!               Bathymetry ◄──── Resampler::resample(field)
//!                    │               │
//!                    │               └─► IndexMap cache (LRU)
//!                    ▼
//!            scene compositor
//! ```

pub mod classify;
pub mod config;
pub mod downsample;
pub mod error;
pub mod interpolation;
pub mod loader;
pub mod normalize;
pub mod raster;
pub mod resample;
pub mod synthetic;

// Re-export commonly used types at crate root
pub use classify::{classify_volume, ClassBucket, ClassPoint, ClassSpec, ClassifiedPoints, Volume};
pub use config::GridProcessorConfig;
pub use downsample::{downsample_indices, plan_downsample, DownsamplePlan};
pub use error::{ErrorKind, GridProcessorError, Result};
pub use interpolation::VectorField;
pub use loader::{
    BathymetryLoader, BathymetryOrigin, FileGridSource, GridSource, LoadOutcome, LoadedBathymetry,
};
pub use normalize::{detect_sign_convention, normalize_bathymetry, normalize_signs, Bathymetry, SignConvention};
pub use raster::{sample_raster, RasterDecode, ALPHA_THRESHOLD};
pub use resample::{resample_scalar, IndexMap, MaskRules, Resampler, ScalarField};
pub use synthetic::synthetic_bathymetry;
