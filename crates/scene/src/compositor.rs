//! Surface compositor.
//!
//! Turns a normalised bathymetry grid plus optional overlays into an ordered
//! [`Scene`]:
//!
//! 1. bathymetry (and the land cap when signed data exists)
//! 2. bathy-draped overlays
//! 3. surface-mode overlay planes, in declaration order
//! 4. particle traces
//! 5. classified point markers
//! 6. the transect curtain
//!
//! A layer that cannot be built is skipped with a warning and listed in
//! [`Scene::skipped`]; it never fails the whole scene.

use advection::SpeedClassPolyline;
use grid_processor::{Bathymetry, ClassifiedPoints, GridProcessorConfig, Resampler, ScalarField};
use ocean_common::{BoundedCache, CacheStats};
use palette::{Colorscale, Palette, PaletteLibrary};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::CompositorConfig;
use crate::contour::ContourSpec;
use crate::depth_warp::DepthWarp;
use crate::error::{Result, SceneError};
use crate::trace::{
    to_rows, AxisLayout, ColorBar, Coords, LineStyle, MarkerStyle, ScatterMode, ScatterTrace,
    Scene, SceneLayout, SurfaceTrace, Trace,
};
use crate::transect::{build_curtain, Transect};

pub const BATHYMETRY_TRACE: &str = "bathymetry";
pub const LAND_TRACE: &str = "land";

/// Where an overlay field is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Coloured onto the bathymetry surface.
    Bathy,
    /// A flat plane; `None` uses the configured plane height.
    Surface {
        #[serde(default)]
        height_m: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub palette: String,
    /// Colour range; the finite data range fills in what is missing.
    pub cmin: Option<f64>,
    pub cmax: Option<f64>,
    pub opacity: f64,
    pub contour_count: Option<usize>,
    pub contour_interval: Option<f64>,
    /// Lift surface-plane vertices by value so contours read in 3D.
    pub relief: bool,
    pub showscale: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            palette: "viridis".to_string(),
            cmin: None,
            cmax: None,
            opacity: 1.0,
            contour_count: None,
            contour_interval: None,
            relief: false,
            showscale: true,
        }
    }
}

impl OverlayStyle {
    fn contours(&self, cmin: f64, cmax: f64) -> Option<ContourSpec> {
        if let Some(interval) = self.contour_interval {
            return ContourSpec::from_interval(cmin, cmax, interval);
        }
        self.contour_count
            .and_then(|count| ContourSpec::from_count(cmin, cmax, count))
    }
}

/// A scalar field to draw over the bathymetry.
#[derive(Debug, Clone)]
pub struct FieldLayer {
    pub name: String,
    pub field: ScalarField,
    pub placement: Placement,
    pub style: OverlayStyle,
}

impl FieldLayer {
    pub fn new(name: impl Into<String>, field: ScalarField, placement: Placement) -> Self {
        Self {
            name: name.into(),
            field,
            placement,
            style: OverlayStyle::default(),
        }
    }

    pub fn with_style(mut self, style: OverlayStyle) -> Self {
        self.style = style;
        self
    }
}

/// Advected particle trails, one polyline per speed class.
#[derive(Debug, Clone)]
pub struct ParticleLayer {
    pub name: String,
    pub polylines: Vec<SpeedClassPolyline>,
    /// Drawing height; `None` uses the configured plane height.
    pub height_m: Option<f64>,
}

/// Classified volume points drawn as markers.
#[derive(Debug, Clone)]
pub struct ClassLayer {
    pub name: String,
    pub points: ClassifiedPoints,
    pub palette: String,
    pub cmin: Option<f64>,
    pub cmax: Option<f64>,
}

/// Inputs for one composed frame.
#[derive(Debug, Clone)]
pub struct SceneRequest<'a> {
    pub bathymetry: &'a Bathymetry,
    pub overlays: Vec<FieldLayer>,
    pub particles: Option<ParticleLayer>,
    pub classes: Option<ClassLayer>,
    pub transect: Option<Transect>,
}

impl<'a> SceneRequest<'a> {
    pub fn new(bathymetry: &'a Bathymetry) -> Self {
        Self {
            bathymetry,
            overlays: Vec::new(),
            particles: None,
            classes: None,
            transect: None,
        }
    }

    pub fn with_overlay(mut self, layer: FieldLayer) -> Self {
        self.overlays.push(layer);
        self
    }

    pub fn with_particles(mut self, layer: ParticleLayer) -> Self {
        self.particles = Some(layer);
        self
    }

    pub fn with_classes(mut self, layer: ClassLayer) -> Self {
        self.classes = Some(layer);
        self
    }

    pub fn with_transect(mut self, transect: Transect) -> Self {
        self.transect = Some(transect);
        self
    }
}

/// Composes scenes, owning the palette, colorscale and index-map caches
/// shared across frames.
pub struct SurfaceCompositor {
    config: CompositorConfig,
    warp: DepthWarp,
    palettes: PaletteLibrary,
    resampler: Resampler,
    colorscales: BoundedCache<String, Colorscale>,
}

impl SurfaceCompositor {
    pub fn new(config: CompositorConfig, grid_config: &GridProcessorConfig) -> Result<Self> {
        config.validate()?;
        grid_config.validate().map_err(SceneError::Config)?;
        Ok(Self {
            warp: config.depth_warp(),
            palettes: PaletteLibrary::default(),
            resampler: Resampler::new(grid_config),
            colorscales: BoundedCache::new(config.color_cache_capacity),
            config,
        })
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    pub fn warp(&self) -> &DepthWarp {
        &self.warp
    }

    /// Swap the depth warp; cached colorscales stay valid since colour is
    /// never warped.
    pub fn set_warp(&mut self, warp: DepthWarp) {
        self.warp = warp;
    }

    /// Register (or replace) a named palette. Colorscales built from the
    /// old stops are dropped.
    pub fn register_palette(&mut self, name: &str, stops: &[&str]) -> Result<()> {
        self.palettes.register(name, stops)?;
        self.colorscales.clear();
        Ok(())
    }

    pub fn colorscale_stats(&self) -> CacheStats {
        self.colorscales.stats()
    }

    pub fn resampler_stats(&self) -> CacheStats {
        self.resampler.stats()
    }

    /// Build the scene for `request`.
    ///
    /// Only the base bathymetry can fail the call (e.g. an unknown palette
    /// name in the configuration); overlay failures are skipped.
    #[instrument(skip_all, fields(bathymetry = %request.bathymetry.id(), overlays = request.overlays.len()))]
    pub fn compose(&mut self, request: &SceneRequest<'_>) -> Result<Scene> {
        let bathy = request.bathymetry;
        let warped = self.warp.scale_all(bathy.z());

        let mut traces = self.base_surfaces(bathy, &warped)?;
        let mut skipped = Vec::new();

        let draped = request
            .overlays
            .iter()
            .filter(|l| l.placement == Placement::Bathy);
        let planes = request
            .overlays
            .iter()
            .filter(|l| l.placement != Placement::Bathy);
        for layer in draped.chain(planes) {
            match self.overlay_surface(layer, bathy, &warped) {
                Ok(surface) => traces.push(Trace::Surface(surface)),
                Err(e) => skip(&mut skipped, &layer.name, e),
            }
        }

        if let Some(layer) = &request.particles {
            match self.particle_traces(layer) {
                Ok(lines) => traces.extend(lines.into_iter().map(Trace::Scatter3d)),
                Err(e) => skip(&mut skipped, &layer.name, e),
            }
        }

        if let Some(layer) = &request.classes {
            match self.class_traces(layer) {
                Ok(markers) => traces.extend(markers.into_iter().map(Trace::Scatter3d)),
                Err(e) => skip(&mut skipped, &layer.name, e),
            }
        }

        if let Some(transect) = &request.transect {
            let curtain = self
                .continuous(&transect.style.palette)
                .and_then(|scale| build_curtain(transect, bathy, &self.warp, scale));
            match curtain {
                Ok(surface) => traces.push(Trace::Surface(surface)),
                Err(e) => skip(&mut skipped, &transect.name, e),
            }
        }

        let ticks = self
            .warp
            .ticks(bathy.min_depth() as f64, self.config.tick_step_m);
        let layout = SceneLayout {
            xaxis: AxisLayout::titled("Longitude"),
            yaxis: AxisLayout::titled("Latitude"),
            zaxis: AxisLayout::depth(&ticks),
        };

        debug!(
            traces = traces.len(),
            skipped = skipped.len(),
            colorscale_hits = self.colorscales.stats().hits,
            "Composed scene"
        );

        Ok(Scene {
            traces,
            layout,
            skipped,
        })
    }

    // =========================================================================
    // BATHYMETRY
    // =========================================================================

    fn base_surfaces(&mut self, bathy: &Bathymetry, warped: &[f32]) -> Result<Vec<Trace>> {
        let width = bathy.width();
        let x = Coords::Axis(bathy.lon().values().to_vec());
        let y = Coords::Axis(bathy.lat().values().to_vec());
        let z = to_rows(warped, width);

        let Some(raw) = bathy.z_raw() else {
            // No signed data: one surface with a continuous scale.
            let palette = self.config.ocean_palette.clone();
            let colorscale = self.continuous(&palette)?;
            let cmin = (bathy.min_depth() as f64).min(-1.0);
            return Ok(vec![Trace::Surface(SurfaceTrace {
                name: BATHYMETRY_TRACE.to_string(),
                x,
                y,
                z,
                surfacecolor: Some(to_rows(bathy.z(), width)),
                colorscale,
                cmin,
                cmax: 0.0,
                opacity: 1.0,
                showscale: true,
                colorbar: Some(ColorBar::titled("Depth (m)")),
                contours: None,
            })]);
        };

        let ocean_edges = self.config.ocean_band_edges.clone();
        let ocean_palette = self.config.ocean_palette.clone();
        let ocean_scale = self.banded(&ocean_palette, &ocean_edges)?;
        let ocean_colors: Vec<f32> = bathy
            .z()
            .iter()
            .zip(raw)
            .map(|(&depth, &r)| if r > 0.0 { f32::NAN } else { depth })
            .collect();

        let mut traces = vec![Trace::Surface(SurfaceTrace {
            name: BATHYMETRY_TRACE.to_string(),
            x: x.clone(),
            y: y.clone(),
            z,
            surfacecolor: Some(to_rows(&ocean_colors, width)),
            colorscale: ocean_scale,
            cmin: ocean_edges[0],
            cmax: ocean_edges[ocean_edges.len() - 1],
            opacity: 1.0,
            showscale: true,
            colorbar: Some(band_colorbar("Depth (m)", &ocean_edges)),
            contours: None,
        })];

        if raw.iter().any(|&r| r > 0.0) {
            let land_edges = self.config.land_band_edges.clone();
            let land_palette = self.config.land_palette.clone();
            let land_scale = self.banded(&land_palette, &land_edges)?;
            let cap = self.warp.scale_f32(0.0);
            let (cap_z, land_colors): (Vec<f32>, Vec<f32>) = raw
                .iter()
                .map(|&r| if r > 0.0 { (cap, r) } else { (f32::NAN, f32::NAN) })
                .unzip();

            traces.push(Trace::Surface(SurfaceTrace {
                name: LAND_TRACE.to_string(),
                x,
                y,
                z: to_rows(&cap_z, width),
                surfacecolor: Some(to_rows(&land_colors, width)),
                colorscale: land_scale,
                cmin: land_edges[0],
                cmax: land_edges[land_edges.len() - 1],
                opacity: 1.0,
                showscale: false,
                colorbar: Some(band_colorbar("Elevation (m)", &land_edges)),
                contours: None,
            }));
        }

        Ok(traces)
    }

    // =========================================================================
    // OVERLAYS
    // =========================================================================

    fn overlay_surface(
        &mut self,
        layer: &FieldLayer,
        bathy: &Bathymetry,
        warped: &[f32],
    ) -> Result<SurfaceTrace> {
        let resampled = self.resampler.resample(&layer.field, bathy)?;
        let values = resampled.values();
        let (cmin, cmax) = color_range(values, layer.style.cmin, layer.style.cmax)
            .ok_or_else(|| SceneError::invalid_layer(&layer.name, "no finite values"))?;
        let colorscale = self.continuous(&layer.style.palette)?;
        let contours = layer.style.contours(cmin, cmax);
        let width = bathy.width();

        let z = match layer.placement {
            Placement::Bathy => to_rows(warped, width),
            Placement::Surface { height_m } => {
                let plane = height_m.unwrap_or(self.config.plane_height_m);
                let relief = if layer.style.relief && contours.is_some() {
                    self.config.relief_epsilon_m
                } else {
                    0.0
                };
                let span = cmax - cmin;
                let heights: Vec<f32> = values
                    .iter()
                    .map(|&v| {
                        if !v.is_finite() {
                            return f32::NAN;
                        }
                        let t = if span > 0.0 {
                            ((v as f64 - cmin) / span).clamp(0.0, 1.0)
                        } else {
                            0.0
                        };
                        self.warp.scale_z(plane + relief * t) as f32
                    })
                    .collect();
                to_rows(&heights, width)
            }
        };

        debug!(
            layer = %layer.name,
            placement = ?layer.placement,
            cmin,
            cmax,
            contours = contours.is_some(),
            "Built overlay surface"
        );

        Ok(SurfaceTrace {
            name: layer.name.clone(),
            x: Coords::Axis(bathy.lon().values().to_vec()),
            y: Coords::Axis(bathy.lat().values().to_vec()),
            z,
            surfacecolor: Some(to_rows(values, width)),
            colorscale,
            cmin,
            cmax,
            opacity: layer.style.opacity,
            showscale: layer.style.showscale,
            colorbar: Some(ColorBar::titled(layer.name.clone())),
            contours: contours.map(ContourSpec::into_surface),
        })
    }

    fn particle_traces(&mut self, layer: &ParticleLayer) -> Result<Vec<ScatterTrace>> {
        let palette_name = self.config.particle_palette.clone();
        let palette = self.palettes.get(&palette_name)?;
        let height = layer.height_m.unwrap_or(self.config.plane_height_m);
        let z_plane = self.warp.scale_z(height);

        Ok(layer
            .polylines
            .iter()
            .filter(|line| line.particles > 0)
            .map(|line| {
                let (lo, hi) = line.speed_range;
                let color = palette.sample(((lo + hi) / 2.0) as f64);
                ScatterTrace {
                    name: format!("{} {}", layer.name, line.class),
                    mode: ScatterMode::Lines,
                    x: line.x.clone(),
                    y: line.y.clone(),
                    z: line
                        .x
                        .iter()
                        .map(|x| if x.is_nan() { f64::NAN } else { z_plane })
                        .collect(),
                    line: Some(LineStyle {
                        color: color.to_css(),
                        width: self.config.particle_line_width,
                    }),
                    marker: None,
                }
            })
            .collect())
    }

    fn class_traces(&mut self, layer: &ClassLayer) -> Result<Vec<ScatterTrace>> {
        let palette = self.palettes.get(&layer.palette)?;
        let centres: Vec<f32> = layer.points.non_empty().map(|b| b.centre as f32).collect();
        let Some((cmin, cmax)) = color_range(&centres, layer.cmin, layer.cmax) else {
            return Ok(Vec::new());
        };
        let span = cmax - cmin;

        Ok(layer
            .points
            .non_empty()
            .map(|bucket| {
                let t = if span > 0.0 {
                    (bucket.centre - cmin) / span
                } else {
                    0.0
                };
                ScatterTrace {
                    name: format!("{} {}", layer.name, bucket.centre),
                    mode: ScatterMode::Markers,
                    x: bucket.points.iter().map(|p| p.lon).collect(),
                    y: bucket.points.iter().map(|p| p.lat).collect(),
                    z: bucket
                        .points
                        .iter()
                        .map(|p| self.warp.scale_z(p.depth))
                        .collect(),
                    line: None,
                    marker: Some(MarkerStyle {
                        color: palette.sample(t).to_css(),
                        size: self.config.marker_size,
                        opacity: 0.8,
                    }),
                }
            })
            .collect())
    }

    // =========================================================================
    // COLORSCALES
    // =========================================================================

    fn continuous(&mut self, palette: &str) -> Result<Colorscale> {
        let key = format!("continuous|{}", palette.to_lowercase());
        self.cached_colorscale(key, palette, Colorscale::from_palette)
    }

    fn banded(&mut self, palette: &str, edges: &[f64]) -> Result<Colorscale> {
        let key = format!("banded|{}|{:?}", palette.to_lowercase(), edges);
        let (cmin, cmax) = (edges[0], edges[edges.len() - 1]);
        self.cached_colorscale(key, palette, |p| Colorscale::banded(p, edges, cmin, cmax))
    }

    fn cached_colorscale(
        &mut self,
        key: String,
        palette: &str,
        build: impl FnOnce(&Palette) -> Colorscale,
    ) -> Result<Colorscale> {
        if let Some(scale) = self.colorscales.get(&key) {
            return Ok(scale.clone());
        }
        let scale = build(&self.palettes.get(palette)?);
        self.colorscales.insert(key, scale.clone());
        Ok(scale)
    }
}

fn skip(skipped: &mut Vec<String>, layer: &str, error: SceneError) {
    warn!(layer = %layer, error = %error, "Skipping scene layer");
    skipped.push(format!("{}: {}", layer, error));
}

/// Declared range with gaps filled from the finite data range.
fn color_range(values: &[f32], cmin: Option<f64>, cmax: Option<f64>) -> Option<(f64, f64)> {
    let data = ocean_common::grid::finite_range(values).map(|(lo, hi)| (lo as f64, hi as f64));
    match (cmin, cmax, data) {
        (Some(lo), Some(hi), _) => Some((lo, hi)),
        (lo, hi, Some((dlo, dhi))) => Some((lo.unwrap_or(dlo), hi.unwrap_or(dhi))),
        (_, _, None) => None,
    }
}

fn band_colorbar(title: &str, edges: &[f64]) -> ColorBar {
    ColorBar {
        title: title.to_string(),
        tickvals: edges.to_vec(),
        ticktext: edges.iter().map(|e| format!("{:.0}", e)).collect(),
    }
}
