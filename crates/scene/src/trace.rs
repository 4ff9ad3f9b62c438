//! Scene description handed to the rendering collaborator.
//!
//! Traces serialise to the shape the renderer expects: surfaces carry
//! `x`/`y`/`z` plus an optional `surfacecolor`, scatter traces carry flat
//! coordinate arrays. Missing values are `NaN` in memory and `null` on the
//! wire, which the renderer draws as gaps.

use palette::Colorscale;
use serde::Serialize;

use crate::contour::SurfaceContours;
use crate::depth_warp::DepthTick;

/// Surface coordinates: a 1D axis shared by every row, or a full 2D grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Coords {
    Axis(Vec<f64>),
    Grid(Vec<Vec<f64>>),
}

impl Coords {
    pub fn len(&self) -> usize {
        match self {
            Coords::Axis(v) => v.len(),
            Coords::Grid(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorBar {
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tickvals: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticktext: Vec<String>,
}

impl ColorBar {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tickvals: Vec::new(),
            ticktext: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceTrace {
    pub name: String,
    pub x: Coords,
    pub y: Coords,
    /// Warped geometry, `z[row][col]`.
    pub z: Vec<Vec<f32>>,
    /// Colour values in physical units; never warped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub surfacecolor: Option<Vec<Vec<f32>>>,
    pub colorscale: Colorscale,
    pub cmin: f64,
    pub cmax: f64,
    pub opacity: f64,
    pub showscale: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colorbar: Option<ColorBar>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contours: Option<SurfaceContours>,
}

impl SurfaceTrace {
    pub fn rows(&self) -> usize {
        self.z.len()
    }

    pub fn cols(&self) -> usize {
        self.z.first().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScatterMode {
    Lines,
    Markers,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: String,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    pub color: String,
    pub size: f32,
    pub opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterTrace {
    pub name: String,
    pub mode: ScatterMode,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
}

impl ScatterTrace {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Trace {
    Surface(SurfaceTrace),
    Scatter3d(ScatterTrace),
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Surface(t) => &t.name,
            Trace::Scatter3d(t) => &t.name,
        }
    }

    pub fn as_surface(&self) -> Option<&SurfaceTrace> {
        match self {
            Trace::Surface(t) => Some(t),
            Trace::Scatter3d(_) => None,
        }
    }

    pub fn as_scatter(&self) -> Option<&ScatterTrace> {
        match self {
            Trace::Scatter3d(t) => Some(t),
            Trace::Surface(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLayout {
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tickvals: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ticktext: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
}

impl AxisLayout {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            tickvals: Vec::new(),
            ticktext: Vec::new(),
            range: None,
        }
    }

    /// Depth axis with warped positions and true-metre labels.
    pub fn depth(ticks: &[DepthTick]) -> Self {
        Self {
            title: "Depth (m)".to_string(),
            tickvals: ticks.iter().map(|t| t.position).collect(),
            ticktext: ticks.iter().map(DepthTick::label).collect(),
            range: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLayout {
    pub xaxis: AxisLayout,
    pub yaxis: AxisLayout,
    pub zaxis: AxisLayout,
}

/// Everything the renderer needs for one frame, in draw order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub traces: Vec<Trace>,
    pub layout: SceneLayout,
    /// Layers skipped while composing, with the reason.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<String>,
}

impl Scene {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn trace(&self, name: &str) -> Option<&Trace> {
        self.traces.iter().find(|t| t.name() == name)
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.traces.iter().map(Trace::name).collect()
    }
}

/// Rows of a flat row-major buffer.
pub(crate) fn to_rows<T: Copy>(values: &[T], width: usize) -> Vec<Vec<T>> {
    if width == 0 {
        return Vec::new();
    }
    values.chunks(width).map(<[T]>::to_vec).collect()
}
