//! One-shot scene composition.
//!
//! Loads bathymetry through the normal fallback chain, optionally runs the
//! particle simulation for a fixed number of simulated frames, and
//! composes everything into a single scene document.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use advection::{AdvectionConfig, AdvectionEngine, FrameScheduler};
use anyhow::{anyhow, bail, Context, Result};
use grid_processor::{
    BathymetryLoader, BathymetryOrigin, FileGridSource, GridProcessorConfig, LoadOutcome,
    ScalarField,
};
use ocean_common::{GridPayload, LoadStatus};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scene::{
    CameraRecord, CompositorConfig, DepthWarp, FieldLayer, ParticleLayer, Placement, Scene,
    SceneRequest, SurfaceCompositor,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::wind::WindPayload;

/// Simulated display frame length.
const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Directory holding the bathymetry sources.
    pub data_dir: PathBuf,
    /// Compositor YAML; defaults apply when absent.
    pub config: Option<PathBuf>,
    /// Scalar field coloured onto the seabed.
    pub overlay: Option<PathBuf>,
    /// Vector field to advect particles through.
    pub wind: Option<PathBuf>,
    pub frames: usize,
    pub particles: Option<usize>,
    pub seed: u64,
    pub warp_focus: Option<f64>,
    pub warp_ratio: Option<f64>,
    /// Stored camera record passed through to the document.
    pub camera: Option<PathBuf>,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            config: None,
            overlay: None,
            wind: None,
            frames: 60,
            particles: None,
            seed: 0,
            warp_focus: None,
            warp_ratio: None,
            camera: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdvectionSummary {
    pub frames: usize,
    pub redraws: usize,
    pub respawned: usize,
}

/// What `compose` writes out.
#[derive(Debug, Clone, Serialize)]
pub struct SceneDocument {
    pub status: LoadStatus,
    pub origin: String,
    pub scene: Scene,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub camera: Option<CameraRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advection: Option<AdvectionSummary>,
}

fn compositor_config(options: &ComposeOptions) -> Result<CompositorConfig> {
    let config = match &options.config {
        Some(path) => CompositorConfig::from_yaml_file(path)?,
        None => CompositorConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn warp_override(options: &ComposeOptions, current: &DepthWarp) -> Option<DepthWarp> {
    match (options.warp_focus, options.warp_ratio) {
        (None, None) => None,
        (focus, ratio) => {
            let (default_focus, default_ratio) = match current.mode() {
                scene::WarpMode::UpperFocus { focus_m, ratio } => (focus_m, ratio),
                scene::WarpMode::Linear => (1000.0, 0.35),
            };
            Some(DepthWarp::upper_focus(
                focus.unwrap_or(default_focus),
                ratio.unwrap_or(default_ratio),
            ))
        }
    }
}

async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read: {}", path.display()))
}

/// Run particles for `frames` simulated frames and return the last pushed
/// polylines.
fn simulate(
    engine: &mut AdvectionEngine<StdRng>,
    frames: usize,
) -> (Vec<advection::SpeedClassPolyline>, AdvectionSummary) {
    let mut scheduler = FrameScheduler::new(engine.config());
    let mut summary = AdvectionSummary::default();
    let mut polylines = engine.emit_polylines();
    let start = Instant::now();

    for frame in 0..frames {
        let action = scheduler.on_frame(start + FRAME * frame as u32);
        let report = engine.step(action.dt);
        summary.respawned += report.respawned();
        if action.push_redraw {
            polylines = engine.emit_polylines();
            summary.redraws += 1;
        }
        summary.frames += 1;
    }
    (polylines, summary)
}

#[instrument(skip(options), fields(data_dir = %options.data_dir.display()))]
pub async fn compose_scene(options: &ComposeOptions) -> Result<SceneDocument> {
    let grid_config = GridProcessorConfig::from_env();
    grid_config.validate().map_err(|e| anyhow!(e))?;

    let mut compositor = SurfaceCompositor::new(compositor_config(options)?, &grid_config)?;
    if let Some(warp) = warp_override(options, compositor.warp()) {
        compositor.set_warp(warp);
    }

    let loader = BathymetryLoader::new(FileGridSource::new(&options.data_dir), grid_config);
    let loaded = match loader.load().await {
        LoadOutcome::Loaded(loaded) => loaded,
        LoadOutcome::Cancelled => bail!("bathymetry load was cancelled"),
        LoadOutcome::Failed(reason) => bail!("no bathymetry available: {}", reason),
    };
    if let LoadStatus::Failed(reason) = &loaded.status {
        warn!(reason = %reason, "Composing over synthetic bathymetry");
    }

    let mut request = SceneRequest::new(&loaded.bathymetry);

    if let Some(path) = &options.overlay {
        let payload = GridPayload::from_slice(&read_file(path).await?)
            .with_context(|| format!("Failed to parse: {}", path.display()))?;
        let id = path.display().to_string();
        let field = ScalarField::new(id, payload.into_grid()?);
        request = request.with_overlay(FieldLayer::new("overlay", field, Placement::Bathy));
    }

    let mut advection = None;
    if let Some(path) = &options.wind {
        let field = WindPayload::from_slice(&read_file(path).await?)?.into_field()?;
        let mut config = AdvectionConfig::default();
        if let Some(count) = options.particles {
            config.particle_count = count;
        }
        let mut engine = AdvectionEngine::new(field, config, StdRng::seed_from_u64(options.seed))?;
        let (polylines, summary) = simulate(&mut engine, options.frames);
        info!(
            frames = summary.frames,
            redraws = summary.redraws,
            respawned = summary.respawned,
            "Particle simulation finished"
        );
        request = request.with_particles(ParticleLayer {
            name: "particles".to_string(),
            polylines,
            height_m: None,
        });
        advection = Some(summary);
    }

    let camera = match &options.camera {
        Some(path) => {
            let json = String::from_utf8(read_file(path).await?)?;
            Some(CameraRecord::from_json(&json)?)
        }
        None => None,
    };

    let scene = compositor.compose(&request)?;
    info!(
        traces = scene.traces.len(),
        skipped = scene.skipped.len(),
        "Composed scene"
    );

    let origin = match &loaded.origin {
        BathymetryOrigin::Source(name) => name.clone(),
        BathymetryOrigin::Synthetic => "synthetic".to_string(),
    };

    Ok(SceneDocument {
        status: loaded.status,
        origin,
        scene,
        camera,
        advection,
    })
}
