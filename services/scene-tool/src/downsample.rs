//! Offline bathymetry decimation.
//!
//! Produces the pre-downsampled source the loader tries first. Values are
//! copied unchanged (no sign normalisation) so the output loads exactly
//! like the input would.

use std::path::Path;

use anyhow::{Context, Result};
use grid_processor::{downsample_indices, DownsamplePlan};
use ocean_common::GridPayload;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownsampleSummary {
    pub from: (usize, usize),
    pub to: (usize, usize),
}

/// Keep at most `target_lon` columns and `target_lat` rows, always including
/// the first and last of each.
pub fn downsample_payload(
    payload: GridPayload,
    target_lon: usize,
    target_lat: usize,
) -> Result<(GridPayload, DownsampleSummary)> {
    let grid = payload.into_grid().context("invalid input grid")?;
    let (width, height) = (grid.width(), grid.height());

    let plan = DownsamplePlan {
        lat_indices: downsample_indices(height, target_lat.max(2)),
        lon_indices: downsample_indices(width, target_lon.max(2)),
    };
    let lon = grid.lon().select("lon", &plan.lon_indices)?;
    let lat = grid.lat().select("lat", &plan.lat_indices)?;
    let values = plan.apply(grid.values(), width);

    let z = values
        .chunks(lon.len())
        .map(|row| {
            row.iter()
                .map(|&v| v.is_finite().then_some(v as f64))
                .collect()
        })
        .collect();

    let summary = DownsampleSummary {
        from: (width, height),
        to: (lon.len(), lat.len()),
    };
    let out = GridPayload {
        lon: lon.values().to_vec(),
        lat: lat.values().to_vec(),
        z,
    };
    Ok((out, summary))
}

pub fn downsample_file(
    input: &Path,
    output: &Path,
    target_lon: usize,
    target_lat: usize,
) -> Result<DownsampleSummary> {
    let bytes =
        std::fs::read(input).with_context(|| format!("Failed to read: {}", input.display()))?;
    let payload = GridPayload::from_slice(&bytes)
        .with_context(|| format!("Failed to parse: {}", input.display()))?;

    let (out, summary) = downsample_payload(payload, target_lon, target_lat)?;

    let json = serde_json::to_vec(&out)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write: {}", output.display()))?;

    info!(
        input = %input.display(),
        output = %output.display(),
        from = ?summary.from,
        to = ?summary.to,
        "Downsampled grid"
    );
    Ok(summary)
}
