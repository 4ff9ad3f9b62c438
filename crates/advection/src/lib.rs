//! Particle advection for vector-field overlays.
//!
//! A fixed pool of particles is pushed through a [`VectorField`] with a
//! midpoint (RK2) step each frame. Particles carry a short trail and are
//! respawned when their lifetime runs out, they leave the field, or the
//! field has no usable velocity under them. For drawing, trails are binned
//! by speed into a few classes and flattened into one NaN-separated polyline
//! per class.
//!
//! Simulation and redraw run at different rates: [`FrameScheduler`] turns
//! frame timestamps into a clamped simulation step and a throttled redraw
//! signal.
//!
//! [`VectorField`]: grid_processor::VectorField

pub mod config;
pub mod engine;
pub mod error;
pub mod particle;
pub mod scheduler;

pub use config::AdvectionConfig;
pub use engine::{AdvectionEngine, SpeedClassPolyline, StepReport};
pub use error::{AdvectionError, Result};
pub use particle::Particle;
pub use scheduler::{FrameAction, FrameScheduler};
