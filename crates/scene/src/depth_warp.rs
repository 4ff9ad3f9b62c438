//! Vertical axis warping.
//!
//! The warp only ever touches geometry. Colour values, hit-test results and
//! axis labels stay in true metres; [`DepthWarp::ticks`] pairs warped tick
//! positions with their physical labels so the axis still reads in metres.

use serde::{Deserialize, Serialize};

pub const MIN_FOCUS_M: f64 = 50.0;
pub const MAX_FOCUS_M: f64 = 20_000.0;
pub const MIN_RATIO: f64 = 0.05;
pub const MAX_RATIO: f64 = 1.0;

/// Upper bound on ticks below the surface; finer steps are widened.
pub const MAX_DEPTH_TICKS: usize = 100;

/// Warp mode as written in configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum WarpMode {
    #[default]
    Linear,
    /// Linear down to `focus_m`, deeper water compressed by `ratio`.
    UpperFocus { focus_m: f64, ratio: f64 },
}

/// A monotonic, invertible transform of the z coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthWarp {
    mode: WarpMode,
}

/// One axis tick: where to draw it and what it says.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DepthTick {
    /// Warped z position.
    pub position: f64,
    /// Physical depth in metres (negative down).
    pub depth_m: f64,
}

impl DepthTick {
    pub fn label(&self) -> String {
        format!("{:.0}", self.depth_m)
    }
}

impl Default for DepthWarp {
    fn default() -> Self {
        Self::linear()
    }
}

impl DepthWarp {
    pub fn linear() -> Self {
        Self {
            mode: WarpMode::Linear,
        }
    }

    /// Upper-focus warp; `focus_m` and `ratio` are clamped into range.
    pub fn upper_focus(focus_m: f64, ratio: f64) -> Self {
        Self::new(WarpMode::UpperFocus { focus_m, ratio })
    }

    pub fn new(mode: WarpMode) -> Self {
        let mode = match mode {
            WarpMode::Linear => WarpMode::Linear,
            WarpMode::UpperFocus { focus_m, ratio } => WarpMode::UpperFocus {
                focus_m: clamp_or(focus_m, MIN_FOCUS_M, MAX_FOCUS_M, MIN_FOCUS_M),
                ratio: clamp_or(ratio, MIN_RATIO, MAX_RATIO, MAX_RATIO),
            },
        };
        Self { mode }
    }

    pub fn mode(&self) -> WarpMode {
        self.mode
    }

    pub fn is_linear(&self) -> bool {
        matches!(self.mode, WarpMode::Linear)
    }

    /// Warp a z value. Sea level and above pass through; NaN stays NaN.
    pub fn scale_z(&self, z: f64) -> f64 {
        match self.mode {
            WarpMode::Linear => z,
            WarpMode::UpperFocus { focus_m, ratio } => {
                if !(z < 0.0) {
                    return z;
                }
                let depth = -z;
                if depth <= focus_m {
                    z
                } else {
                    -(focus_m + (depth - focus_m) * ratio)
                }
            }
        }
    }

    /// Inverse of [`scale_z`](Self::scale_z).
    pub fn unscale_z(&self, z: f64) -> f64 {
        match self.mode {
            WarpMode::Linear => z,
            WarpMode::UpperFocus { focus_m, ratio } => {
                if !(z < 0.0) {
                    return z;
                }
                let depth = -z;
                if depth <= focus_m {
                    z
                } else {
                    -(focus_m + (depth - focus_m) / ratio)
                }
            }
        }
    }

    pub fn scale_f32(&self, z: f32) -> f32 {
        self.scale_z(z as f64) as f32
    }

    /// Warp a whole grid of geometry values.
    pub fn scale_all(&self, values: &[f32]) -> Vec<f32> {
        if self.is_linear() {
            return values.to_vec();
        }
        values.iter().map(|&z| self.scale_f32(z)).collect()
    }

    /// Ticks at `0, -step, -2 step, ...` down to `min_depth`.
    ///
    /// A step too fine for the depth range is widened to a whole multiple
    /// of itself so at most [`MAX_DEPTH_TICKS`] ticks sit below zero.
    pub fn ticks(&self, min_depth: f64, step: f64) -> Vec<DepthTick> {
        let mut ticks = vec![DepthTick {
            position: 0.0,
            depth_m: 0.0,
        }];
        if !(step > 0.0) || !(min_depth < 0.0) || !min_depth.is_finite() {
            return ticks;
        }
        let multiple = (-min_depth / step / MAX_DEPTH_TICKS as f64).ceil().max(1.0);
        let step = step * multiple;

        let mut k = 1u32;
        loop {
            let depth_m = -(k as f64) * step;
            if depth_m < min_depth {
                break;
            }
            ticks.push(DepthTick {
                position: self.scale_z(depth_m),
                depth_m,
            });
            k += 1;
        }
        ticks
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_is_identity() {
        let warp = DepthWarp::linear();
        for z in [-5000.0, -1.0, 0.0, 250.0] {
            assert_eq!(warp.scale_z(z), z);
            assert_eq!(warp.unscale_z(z), z);
        }
    }

    #[test]
    fn test_upper_focus_compresses_below_focus() {
        let warp = DepthWarp::upper_focus(1000.0, 0.25);
        assert_eq!(warp.scale_z(-500.0), -500.0);
        assert_eq!(warp.scale_z(-1000.0), -1000.0);
        assert_eq!(warp.scale_z(-3000.0), -1500.0);
        assert_eq!(warp.scale_z(120.0), 120.0);
    }

    #[test]
    fn test_parameters_are_clamped() {
        assert_eq!(
            DepthWarp::upper_focus(10.0, 0.0).mode(),
            WarpMode::UpperFocus {
                focus_m: 50.0,
                ratio: 0.05
            }
        );
        assert_eq!(
            DepthWarp::upper_focus(1e6, 3.0).mode(),
            WarpMode::UpperFocus {
                focus_m: 20_000.0,
                ratio: 1.0
            }
        );
    }

    #[test]
    fn test_monotonic_in_depth() {
        let warp = DepthWarp::upper_focus(800.0, 0.1);
        let mut prev = f64::NEG_INFINITY;
        for k in 0..=600 {
            let z = -6000.0 + k as f64 * 10.0;
            let w = warp.scale_z(z);
            assert!(w >= prev, "scale_z({}) = {} < {}", z, w, prev);
            prev = w;
        }
    }

    #[test]
    fn test_unscale_inverts_scale() {
        let warp = DepthWarp::upper_focus(1200.0, 0.3);
        for z in [-5500.0, -1200.0, -1199.0, -10.0, 0.0, 40.0] {
            assert!((warp.unscale_z(warp.scale_z(z)) - z).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nan_passes_through() {
        let warp = DepthWarp::upper_focus(1000.0, 0.5);
        assert!(warp.scale_z(f64::NAN).is_nan());
    }

    #[test]
    fn test_ticks_read_true_metres() {
        let warp = DepthWarp::upper_focus(1000.0, 0.5);
        let ticks = warp.ticks(-2100.0, 500.0);
        let labels: Vec<String> = ticks.iter().map(DepthTick::label).collect();
        assert_eq!(labels, vec!["0", "-500", "-1000", "-1500", "-2000"]);
        assert_eq!(ticks[3].position, -1250.0);
        assert_eq!(ticks[4].position, -1500.0);
    }

    #[test]
    fn test_tiny_tick_step_is_widened() {
        let ticks = DepthWarp::linear().ticks(-11_000.0, 1e-6);
        assert!(ticks.len() <= MAX_DEPTH_TICKS + 1, "{} ticks", ticks.len());
        assert!(ticks.len() > 50);
        assert!(ticks.last().unwrap().depth_m >= -11_000.0);
        assert!(ticks.windows(2).all(|w| w[1].depth_m < w[0].depth_m));
    }

    #[test]
    fn test_ticks_for_dry_grid() {
        assert_eq!(DepthWarp::linear().ticks(0.0, 500.0).len(), 1);
        assert_eq!(DepthWarp::linear().ticks(-900.0, 0.0).len(), 1);
    }

    #[test]
    fn test_warp_mode_from_yaml() {
        let mode: WarpMode =
            serde_yaml::from_str("mode: upper_focus\nfocus_m: 1500\nratio: 0.2\n").unwrap();
        assert_eq!(
            mode,
            WarpMode::UpperFocus {
                focus_m: 1500.0,
                ratio: 0.2
            }
        );
    }
}
