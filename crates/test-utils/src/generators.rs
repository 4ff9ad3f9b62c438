//! Deterministic generators for grids and vector fields.

use ocean_common::{CoordinateAxis, GridPayload};

/// Evenly spaced coordinates from `start` to `end` inclusive.
///
/// Both ends are exact so tests can compare them with `==`.
pub fn axis_values(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            let mut values: Vec<f64> = (0..count).map(|i| start + step * i as f64).collect();
            values[count - 1] = end;
            values
        }
    }
}

/// Validated axis; panics on bad input since it only serves tests.
pub fn axis(name: &'static str, start: f64, end: f64, count: usize) -> CoordinateAxis {
    CoordinateAxis::new(name, axis_values(start, end, count)).expect("valid test axis")
}

/// Rows of `f(lon, lat)` laid out `z[j][i]`.
pub fn rows_from_fn(lon: &[f64], lat: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<Vec<f64>> {
    lat.iter()
        .map(|&y| lon.iter().map(|&x| f(x, y)).collect())
        .collect()
}

/// A bowl-shaped basin, negative down, deepest (`-max_depth`) in the middle.
///
/// Cells where `land_above` is positive get positive elevations, giving a
/// grid with both land and ocean.
pub fn bathymetry_payload(
    width: usize,
    height: usize,
    max_depth: f64,
    land_above: f64,
) -> GridPayload {
    let lon = axis_values(-30.0, 20.0, width);
    let lat = axis_values(60.0, 80.0, height);
    let rows = rows_from_fn(&lon, &lat, |x, y| {
        let nx = (x + 5.0) / 25.0;
        let ny = (y - 70.0) / 10.0;
        let r2 = nx * nx + ny * ny;
        land_above * r2 - max_depth * (1.0 - r2).max(0.0)
    });
    GridPayload::from_rows(lon, lat, rows)
}

/// Same basin with depths stored positive-down and no land.
pub fn positive_down_payload(width: usize, height: usize, max_depth: f64) -> GridPayload {
    let mut payload = bathymetry_payload(width, height, max_depth, 0.0);
    for row in &mut payload.z {
        for cell in row.iter_mut() {
            *cell = cell.map(|v| -v);
        }
    }
    payload
}

/// Uniform `(u, v)` on a `width x height` grid.
pub fn uniform_components(width: usize, height: usize, u: f32, v: f32) -> (Vec<f32>, Vec<f32>) {
    (vec![u; width * height], vec![v; width * height])
}

/// Solid-body rotation around the grid centre: speed grows with radius.
pub fn vortex_components(width: usize, height: usize) -> (Vec<f32>, Vec<f32>) {
    let cx = (width as f32 - 1.0) / 2.0;
    let cy = (height as f32 - 1.0) / 2.0;
    let mut u = Vec::with_capacity(width * height);
    let mut v = Vec::with_capacity(width * height);
    for j in 0..height {
        for i in 0..width {
            let dx = i as f32 - cx;
            let dy = j as f32 - cy;
            u.push(-dy * 0.1);
            v.push(dx * 0.1);
        }
    }
    (u, v)
}

/// Row-major values `col * 1000 + row`, easy to trace through gathers.
pub fn indexed_values(width: usize, height: usize) -> Vec<f32> {
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        for col in 0..width {
            data.push((col * 1000 + row) as f32);
        }
    }
    data
}
