//! Vertical transect curtains.

use grid_processor::Bathymetry;
use ocean_common::CoordinateAxis;
use palette::Colorscale;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::depth_warp::DepthWarp;
use crate::error::{Result, SceneError};
use crate::trace::{ColorBar, Coords, SurfaceTrace};

/// A lon/depth slice of a field at a fixed latitude.
#[derive(Debug, Clone)]
pub struct Transect {
    pub name: String,
    pub lat: f64,
    pub lon: CoordinateAxis,
    /// Depth levels in metres, negative down.
    pub depth: Vec<f64>,
    /// `values[k * lon.len() + i]` at `depth[k]`, `lon[i]`.
    pub values: Vec<f32>,
    pub style: CurtainStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurtainStyle {
    pub palette: String,
    pub cmin: Option<f64>,
    pub cmax: Option<f64>,
    pub opacity: f64,
}

impl Default for CurtainStyle {
    fn default() -> Self {
        Self {
            palette: "thermal".to_string(),
            cmin: None,
            cmax: None,
            opacity: 1.0,
        }
    }
}

impl Transect {
    fn validate(&self) -> Result<()> {
        if self.lon.is_empty() || self.depth.is_empty() {
            return Err(SceneError::invalid_layer(&self.name, "transect has no cells"));
        }
        let expected = self.lon.len() * self.depth.len();
        if self.values.len() != expected {
            return Err(SceneError::invalid_layer(
                &self.name,
                format!("{} values for {} cells", self.values.len(), expected),
            ));
        }
        if !self.lat.is_finite() {
            return Err(SceneError::invalid_layer(&self.name, "transect latitude is not finite"));
        }
        Ok(())
    }

    /// Finite value range after masking, falling back to the declared one.
    fn color_range(&self, values: &[f32]) -> (f64, f64) {
        let (lo, hi) = ocean_common::grid::finite_range(values)
            .map(|(lo, hi)| (lo as f64, hi as f64))
            .unwrap_or((0.0, 1.0));
        (self.style.cmin.unwrap_or(lo), self.style.cmax.unwrap_or(hi))
    }
}

/// Build the curtain surface for `transect`.
///
/// Rows are depth levels, columns are longitudes. A cell deeper than the
/// seabed under its longitude is masked in both geometry and colour; cells
/// over missing bathymetry are kept.
pub fn build_curtain(
    transect: &Transect,
    bathymetry: &Bathymetry,
    warp: &DepthWarp,
    colorscale: Colorscale,
) -> Result<SurfaceTrace> {
    transect.validate()?;
    let nx = transect.lon.len();

    let seabed: Vec<f32> = transect
        .lon
        .values()
        .iter()
        .map(|&lon| bathymetry.nearest_depth(lon, transect.lat))
        .collect();

    let mut masked = 0usize;
    let mut colors = Vec::with_capacity(transect.depth.len());
    let mut z = Vec::with_capacity(transect.depth.len());
    for (k, &depth) in transect.depth.iter().enumerate() {
        let warped = warp.scale_z(depth) as f32;
        let row = &transect.values[k * nx..(k + 1) * nx];
        let mut color_row = Vec::with_capacity(nx);
        let mut z_row = Vec::with_capacity(nx);
        for (i, &value) in row.iter().enumerate() {
            let below_seabed = seabed[i].is_finite() && depth < seabed[i] as f64;
            if below_seabed {
                masked += 1;
                color_row.push(f32::NAN);
                z_row.push(f32::NAN);
            } else {
                color_row.push(value);
                z_row.push(warped);
            }
        }
        colors.push(color_row);
        z.push(z_row);
    }

    let flat: Vec<f32> = colors.iter().flatten().copied().collect();
    let (cmin, cmax) = transect.color_range(&flat);

    let x_row = transect.lon.values().to_vec();
    let x = vec![x_row; transect.depth.len()];
    let y = vec![vec![transect.lat; nx]; transect.depth.len()];

    debug!(
        layer = %transect.name,
        lat = transect.lat,
        cols = nx,
        rows = transect.depth.len(),
        masked,
        "Built transect curtain"
    );

    Ok(SurfaceTrace {
        name: transect.name.clone(),
        x: Coords::Grid(x),
        y: Coords::Grid(y),
        z,
        surfacecolor: Some(colors),
        colorscale,
        cmin,
        cmax,
        opacity: transect.style.opacity,
        showscale: true,
        colorbar: Some(ColorBar::titled(transect.name.clone())),
        contours: None,
    })
}
