//! Bathymetry normalisation.
//!
//! One pass per load: detect the sign convention (and flip if the file is
//! positive-down), decimate to the point budget, then split the signed data
//! into a geometry grid with land clamped to sea level.

use ocean_common::{BoundingBox, CoordinateAxis, GridPayload, ValueGrid};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::GridProcessorConfig;
use crate::downsample::plan_downsample;
use crate::error::{GridProcessorError, Result};

/// Depth sign convention of a raw grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignConvention {
    /// At least one negative value: ocean negative, land positive.
    OceanNegative,
    /// No negative values but some positive ones: depths are positive-down.
    PositiveDown,
    /// Nothing finite and non-zero to decide from.
    Undetermined,
}

/// Decide the convention from all finite, non-zero values.
///
/// This is a single global decision, never per cell.
pub fn detect_sign_convention(values: &[f32]) -> SignConvention {
    let mut any_positive = false;
    for &v in values {
        if !v.is_finite() || v == 0.0 {
            continue;
        }
        if v < 0.0 {
            return SignConvention::OceanNegative;
        }
        any_positive = true;
    }
    if any_positive {
        SignConvention::PositiveDown
    } else {
        SignConvention::Undetermined
    }
}

/// Detect the convention and negate every value in place if positive-down.
///
/// Running it a second time never flips again: after a flip the data holds
/// negative values.
pub fn normalize_signs(values: &mut [f32]) -> SignConvention {
    let convention = detect_sign_convention(values);
    if convention == SignConvention::PositiveDown {
        for v in values.iter_mut() {
            *v = -*v;
        }
    }
    convention
}

/// A normalised bathymetry grid.
///
/// `z` is the geometry grid (land clamped to 0). `z_raw` keeps the signed
/// elevations; grids that never had real land data (the synthetic fallback)
/// carry none.
#[derive(Debug, Clone, PartialEq)]
pub struct Bathymetry {
    id: String,
    geometry: ValueGrid,
    z_raw: Option<Vec<f32>>,
    convention: SignConvention,
    downsampled: bool,
}

impl Bathymetry {
    /// Wrap an already signed grid (ocean negative). Land is split off into
    /// `z_raw` when `keep_raw` is set.
    pub fn from_signed(id: impl Into<String>, grid: ValueGrid, keep_raw: bool) -> Result<Self> {
        let raw = grid.values().to_vec();
        let geometry = grid.with_values(clamp_land(&raw))?;
        Ok(Self {
            id: id.into(),
            geometry,
            z_raw: keep_raw.then_some(raw),
            convention: SignConvention::OceanNegative,
            downsampled: false,
        })
    }

    /// Identity of the source this grid came from.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn lon(&self) -> &CoordinateAxis {
        self.geometry.lon()
    }

    pub fn lat(&self) -> &CoordinateAxis {
        self.geometry.lat()
    }

    pub fn width(&self) -> usize {
        self.geometry.width()
    }

    pub fn height(&self) -> usize {
        self.geometry.height()
    }

    /// Geometry grid, row-major, land clamped to 0.
    pub fn z(&self) -> &[f32] {
        self.geometry.values()
    }

    /// Geometry grid on the bathymetry axes.
    pub fn geometry(&self) -> &ValueGrid {
        &self.geometry
    }

    /// Signed raw grid, if the source had one.
    pub fn z_raw(&self) -> Option<&[f32]> {
        self.z_raw.as_deref()
    }

    pub fn has_signed_data(&self) -> bool {
        self.z_raw.is_some()
    }

    pub fn convention(&self) -> SignConvention {
        self.convention
    }

    pub fn was_flipped(&self) -> bool {
        self.convention == SignConvention::PositiveDown
    }

    pub fn was_downsampled(&self) -> bool {
        self.downsampled
    }

    pub fn bbox(&self) -> BoundingBox {
        self.geometry.bbox()
    }

    /// Geometry depth at column `i`, row `j`.
    pub fn depth(&self, i: usize, j: usize) -> Option<f32> {
        self.geometry.get(i, j)
    }

    /// Geometry depth of the cell nearest to `(lon, lat)`.
    pub fn nearest_depth(&self, lon: f64, lat: f64) -> f32 {
        let i = self.lon().nearest_index(lon);
        let j = self.lat().nearest_index(lat);
        self.z()[j * self.width() + i]
    }

    /// Whether the geometry cell at `(i, j)` is at or above `threshold`.
    pub fn is_dry(&self, i: usize, j: usize, threshold: f32) -> bool {
        self.depth(i, j).is_some_and(|d| d >= threshold)
    }

    /// Deepest finite geometry value (most negative), 0 if there is none.
    pub fn min_depth(&self) -> f32 {
        self.z()
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0, f32::min)
    }

    /// Key fragment identifying this grid in resampling caches.
    pub fn cache_key(&self) -> String {
        format!(
            "{}:{}x{}:{:016x}:{:016x}",
            self.id,
            self.width(),
            self.height(),
            self.lon().signature(),
            self.lat().signature()
        )
    }
}

fn clamp_land(values: &[f32]) -> Vec<f32> {
    values.iter().map(|&v| if v > 0.0 { 0.0 } else { v }).collect()
}

/// Normalise a raw payload into a [`Bathymetry`].
///
/// Order is fixed: validate, detect/flip sign, decimate, then split land.
pub fn normalize_bathymetry(
    payload: GridPayload,
    source_id: &str,
    config: &GridProcessorConfig,
) -> Result<Bathymetry> {
    let grid = payload.into_grid()?;
    let (n_lon, n_lat) = (grid.width(), grid.height());

    let mut lon = grid.lon().clone();
    let mut lat = grid.lat().clone();
    let mut values = grid.into_values();

    if values.iter().all(|v| !v.is_finite()) {
        return Err(GridProcessorError::degenerate(format!(
            "{}: no finite depth values",
            source_id
        )));
    }

    let convention = normalize_signs(&mut values);
    debug!(source = %source_id, ?convention, "Detected depth sign convention");

    let mut downsampled = false;
    if let Some(plan) = plan_downsample(n_lat, n_lon, config.point_budget) {
        values = plan.apply(&values, n_lon);
        lon = lon.select("lon", &plan.lon_indices)?;
        lat = lat.select("lat", &plan.lat_indices)?;
        downsampled = true;
        info!(
            source = %source_id,
            from = n_lat * n_lon,
            to = values.len(),
            budget = config.point_budget,
            "Downsampled bathymetry"
        );
    }

    let geometry = ValueGrid::from_flat(lon, lat, clamp_land(&values))?;

    Ok(Bathymetry {
        id: source_id.to_string(),
        geometry,
        z_raw: Some(values),
        convention,
        downsampled,
    })
}
