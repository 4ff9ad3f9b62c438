//! Point decimation for oversized grids.
//!
//! Decimation keeps whole rows and columns at a fixed stride. It is lossy
//! (no averaging) and deterministic, and it always keeps the first and last
//! index of each axis so the domain edges survive.

use serde::{Deserialize, Serialize};

/// Indices kept when decimating an axis of length `n` to roughly `target`.
///
/// `stride = ceil(n / target)`, indices `0, stride, 2*stride, ...`, then
/// `n - 1` if it was not already hit. When `n <= target` every index is kept.
pub fn downsample_indices(n: usize, target: usize) -> Vec<usize> {
    if n == 0 {
        return Vec::new();
    }
    if target == 0 || n <= target {
        return (0..n).collect();
    }

    let stride = n.div_ceil(target).max(1);
    let mut indices: Vec<usize> = (0..n).step_by(stride).collect();
    if indices.last() != Some(&(n - 1)) {
        indices.push(n - 1);
    }
    indices
}

/// Row and column indices selected for a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownsamplePlan {
    pub lat_indices: Vec<usize>,
    pub lon_indices: Vec<usize>,
}

impl DownsamplePlan {
    /// Number of points the plan keeps.
    pub fn point_count(&self) -> usize {
        self.lat_indices.len() * self.lon_indices.len()
    }

    /// Gather a row-major buffer of `width` columns through the plan.
    pub fn apply<T: Copy>(&self, values: &[T], width: usize) -> Vec<T> {
        let mut out = Vec::with_capacity(self.point_count());
        for &j in &self.lat_indices {
            let row = &values[j * width..(j + 1) * width];
            out.extend(self.lon_indices.iter().map(|&i| row[i]));
        }
        out
    }
}

/// Indices for an axis of length `n` keeping at most `max_kept` of them
/// (never fewer than both edges).
fn fit_axis(n: usize, max_kept: usize) -> Vec<usize> {
    if n <= max_kept {
        return (0..n).collect();
    }
    // The forced last index takes one slot on top of the strided ones.
    downsample_indices(n, max_kept.saturating_sub(1).max(1))
}

/// Plan a decimation of an `n_lat x n_lon` grid to at most `budget` points.
///
/// Returns `None` when the grid already fits. The shorter axis is planned
/// first from the aspect-preserving factor; the longer axis then gets
/// whatever budget the shorter one left, so an axis that keeps all of its
/// indices does not push the total over the budget.
pub fn plan_downsample(n_lat: usize, n_lon: usize, budget: usize) -> Option<DownsamplePlan> {
    let total = n_lat.saturating_mul(n_lon);
    if budget == 0 || total <= budget {
        return None;
    }

    let factor = (total as f64 / budget as f64).sqrt();
    let (n_short, n_long) = (n_lat.min(n_lon), n_lat.max(n_lon));

    let short = fit_axis(n_short, ((n_short as f64 / factor).floor() as usize).max(2));
    let long = fit_axis(n_long, (budget / short.len().max(1)).max(2));

    let (lat_indices, lon_indices) = if n_lat <= n_lon {
        (short, long)
    } else {
        (long, short)
    };
    Some(DownsamplePlan {
        lat_indices,
        lon_indices,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_small_axis_kept() {
        assert_eq!(downsample_indices(5, 10), vec![0, 1, 2, 3, 4]);
        assert_eq!(downsample_indices(5, 5), vec![0, 1, 2, 3, 4]);
        assert!(downsample_indices(0, 10).is_empty());
    }

    #[test]
    fn test_indices_stride_and_last() {
        // stride = ceil(10 / 4) = 3 -> 0, 3, 6, 9 (9 is already last)
        assert_eq!(downsample_indices(10, 4), vec![0, 3, 6, 9]);
        // stride = ceil(11 / 4) = 3 -> 0, 3, 6, 9, then forced 10
        assert_eq!(downsample_indices(11, 4), vec![0, 3, 6, 9, 10]);
    }

    #[test]
    fn test_plan_none_within_budget() {
        assert!(plan_downsample(100, 100, 10_000).is_none());
        assert!(plan_downsample(10, 10, 1000).is_none());
    }

    #[test]
    fn test_plan_respects_budget_and_edges() {
        let plan = plan_downsample(1000, 2000, 250_000).unwrap();
        assert!(plan.point_count() <= 250_000);
        assert_eq!(plan.lat_indices[0], 0);
        assert_eq!(*plan.lat_indices.last().unwrap(), 999);
        assert_eq!(plan.lon_indices[0], 0);
        assert_eq!(*plan.lon_indices.last().unwrap(), 1999);
        // Aspect ratio roughly kept
        let ratio = plan.lon_indices.len() as f64 / plan.lat_indices.len() as f64;
        assert!((ratio - 2.0).abs() < 0.2, "ratio {}", ratio);
    }

    #[test]
    fn test_plan_single_row_stays_within_budget() {
        let plan = plan_downsample(1, 1_000_000, 250_000).unwrap();
        assert_eq!(plan.lat_indices, vec![0]);
        assert!(plan.point_count() <= 250_000, "points {}", plan.point_count());
        assert_eq!(plan.lon_indices[0], 0);
        assert_eq!(*plan.lon_indices.last().unwrap(), 999_999);

        let plan = plan_downsample(1_000_000, 1, 250_000).unwrap();
        assert_eq!(plan.lon_indices, vec![0]);
        assert!(plan.point_count() <= 250_000);
    }

    #[test]
    fn test_plan_narrow_grid_within_budget() {
        for (n_lat, n_lon, budget) in [(3, 90_001, 1_000), (2_000, 7, 500), (10, 10_001, 5_000)] {
            let plan = plan_downsample(n_lat, n_lon, budget).unwrap();
            assert!(
                plan.point_count() <= budget,
                "{}x{} -> {} points",
                n_lat,
                n_lon,
                plan.point_count()
            );
            assert_eq!(*plan.lat_indices.last().unwrap(), n_lat - 1);
            assert_eq!(*plan.lon_indices.last().unwrap(), n_lon - 1);
        }
    }

    #[test]
    fn test_plan_is_deterministic() {
        assert_eq!(plan_downsample(777, 1234, 50_000), plan_downsample(777, 1234, 50_000));
    }

    #[test]
    fn test_apply() {
        let plan = DownsamplePlan {
            lat_indices: vec![0, 2],
            lon_indices: vec![0, 2],
        };
        let values: Vec<i32> = (0..9).collect();
        assert_eq!(plan.apply(&values, 3), vec![0, 2, 6, 8]);
    }
}
