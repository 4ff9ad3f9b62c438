//! Common types shared across the ocean scene crates.
//!
//! Everything here is independent of any particular data source: coordinate
//! axes with an explicit direction, geographic boxes, validated value grids,
//! bounded caches, and the load-status/cancellation bookkeeping used at the
//! asynchronous load boundary.

pub mod axis;
pub mod bbox;
pub mod cache;
pub mod error;
pub mod grid;
pub mod status;
pub mod time;

pub use axis::{AxisDirection, CoordinateAxis};
pub use bbox::BoundingBox;
pub use cache::{BoundedCache, CacheStats};
pub use error::{GridError, GridResult};
pub use grid::{GridPayload, ValueGrid};
pub use status::{LoadStatus, LoadTicket, RequestTracker};
pub use time::{TimeUnit, TimeUnits};
