//! Built-in fallback bathymetry.

use ocean_common::{CoordinateAxis, ValueGrid};

use crate::error::Result;
use crate::normalize::Bathymetry;

pub const SYNTHETIC_ID: &str = "synthetic";

/// A deterministic basin crossed by a ridge, covering lon -30..20 and
/// lat 60..80.
///
/// Used when no bathymetry source loads. It has no signed raw data, so the
/// compositor renders it as a single surface.
pub fn synthetic_bathymetry() -> Result<Bathymetry> {
    let lon = CoordinateAxis::linspace("lon", -30.0, 20.0, 101)?;
    let lat = CoordinateAxis::linspace("lat", 60.0, 80.0, 81)?;

    let mut values = Vec::with_capacity(lon.len() * lat.len());
    for &y in lat.values() {
        for &x in lon.values() {
            values.push(synthetic_depth(x, y) as f32);
        }
    }

    let grid = ValueGrid::from_flat(lon, lat, values)?;
    Bathymetry::from_signed(SYNTHETIC_ID, grid, false)
}

fn synthetic_depth(lon: f64, lat: f64) -> f64 {
    let nx = (lon + 5.0) / 25.0;
    let ny = (lat - 70.0) / 10.0;
    let basin = (-(nx * nx + ny * ny) * 1.5).exp();

    // Ridge running SW to NE across the basin
    let ridge_lon = -10.0 + 0.8 * (lat - 60.0);
    let ridge = (-((lon - ridge_lon) / 2.5).powi(2)).exp();

    let depth = 200.0 + 3600.0 * basin - 1800.0 * ridge * basin;
    -depth.max(20.0)
}
