//! Bilinear sampling of 2D vector fields.

use ocean_common::{BoundingBox, CoordinateAxis, ValueGrid};

use crate::error::{GridProcessorError, Result};

/// Total weight below which a bilinear sample is treated as no data.
const MIN_WEIGHT: f64 = 1e-6;

/// A `(u, v)` vector field on a lon/lat grid.
#[derive(Debug, Clone)]
pub struct VectorField {
    lon: CoordinateAxis,
    lat: CoordinateAxis,
    u: Vec<f32>,
    v: Vec<f32>,
}

impl VectorField {
    pub fn new(lon: CoordinateAxis, lat: CoordinateAxis, u: Vec<f32>, v: Vec<f32>) -> Result<Self> {
        let expected = lon.len() * lat.len();
        if u.len() != expected || v.len() != expected {
            return Err(GridProcessorError::shape_mismatch(format!(
                "u/v have {}/{} values, grid has {}",
                u.len(),
                v.len(),
                expected
            )));
        }
        Ok(Self { lon, lat, u, v })
    }

    /// Pair two component grids that share the same axes.
    pub fn from_grids(u: ValueGrid, v: ValueGrid) -> Result<Self> {
        if u.lon() != v.lon() || u.lat() != v.lat() {
            return Err(GridProcessorError::shape_mismatch(
                "u and v are on different grids",
            ));
        }
        let lon = u.lon().clone();
        let lat = u.lat().clone();
        Self::new(lon, lat, u.into_values(), v.into_values())
    }

    pub fn lon(&self) -> &CoordinateAxis {
        &self.lon
    }

    pub fn lat(&self) -> &CoordinateAxis {
        &self.lat
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_axes(&self.lon, &self.lat)
    }

    /// Largest finite vector magnitude in the field (0 if none).
    pub fn max_speed(&self) -> f32 {
        self.u
            .iter()
            .zip(&self.v)
            .filter(|(u, v)| u.is_finite() && v.is_finite())
            .map(|(u, v)| u.hypot(*v))
            .fold(0.0, f32::max)
    }

    /// Bilinear `(u, v)` at a continuous position.
    ///
    /// Corners with a non-finite component are left out and the remaining
    /// weights are renormalised. Returns `None` outside the grid or when the
    /// valid weight is negligible.
    pub fn sample_bilinear(&self, lon: f64, lat: f64) -> Option<(f32, f32)> {
        let x = self.lon.to_index(lon)?;
        let y = self.lat.to_index(lat)?;

        let width = self.lon.len();
        let height = self.lat.len();

        let i0 = (x.floor() as usize).min(width.saturating_sub(2));
        let j0 = (y.floor() as usize).min(height.saturating_sub(2));
        let i1 = (i0 + 1).min(width - 1);
        let j1 = (j0 + 1).min(height - 1);
        let fx = (x - i0 as f64).clamp(0.0, 1.0);
        let fy = (y - j0 as f64).clamp(0.0, 1.0);

        let corners = [
            (i0, j0, (1.0 - fx) * (1.0 - fy)),
            (i1, j0, fx * (1.0 - fy)),
            (i0, j1, (1.0 - fx) * fy),
            (i1, j1, fx * fy),
        ];

        let mut su = 0.0f64;
        let mut sv = 0.0f64;
        let mut total = 0.0f64;
        for (i, j, w) in corners {
            let idx = j * width + i;
            let (u, v) = (self.u[idx], self.v[idx]);
            if !u.is_finite() || !v.is_finite() {
                continue;
            }
            su += w * u as f64;
            sv += w * v as f64;
            total += w;
        }

        if total < MIN_WEIGHT {
            return None;
        }
        Some(((su / total) as f32, (sv / total) as f32))
    }
}
