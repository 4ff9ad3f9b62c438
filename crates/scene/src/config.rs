//! Compositor configuration.
//!
//! Loaded from YAML, then overridden from the environment:
//!
//! ```yaml
//! warp:
//!   mode: upper_focus
//!   focus_m: 1000
//!   ratio: 0.25
//! plane_height_m: 0
//! relief_epsilon_m: 2
//! ocean_palette: deep
//! land_palette: topo
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::depth_warp::{DepthWarp, WarpMode};
use crate::error::{Result, SceneError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    pub warp: WarpMode,

    /// Height of surface-mode overlay planes in metres.
    pub plane_height_m: f64,

    /// Largest upward bump given to relief overlays, in metres.
    pub relief_epsilon_m: f64,

    pub ocean_palette: String,
    pub land_palette: String,
    /// Palette for particle speed classes.
    pub particle_palette: String,

    /// Physical depth band edges for ocean shading, deepest first.
    pub ocean_band_edges: Vec<f64>,

    /// Elevation band edges for the land cap, lowest first.
    pub land_band_edges: Vec<f64>,

    /// Spacing of depth axis ticks in metres.
    pub tick_step_m: f64,

    /// Colorscales kept between frames.
    pub color_cache_capacity: usize,

    pub particle_line_width: f32,
    pub marker_size: f32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            warp: WarpMode::Linear,
            plane_height_m: 0.0,
            relief_epsilon_m: 2.0,
            ocean_palette: "deep".to_string(),
            land_palette: "topo".to_string(),
            particle_palette: "speed".to_string(),
            ocean_band_edges: vec![
                -4200.0, -3500.0, -3000.0, -2500.0, -2000.0, -1500.0, -1000.0, -500.0, -200.0,
                -50.0,
            ],
            land_band_edges: vec![0.0, 100.0, 250.0, 500.0, 1000.0, 1500.0, 2000.0],
            tick_step_m: 500.0,
            color_cache_capacity: 24,
            particle_line_width: 2.0,
            marker_size: 3.0,
        }
    }
}

impl CompositorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply `DEPTH_WARP_*`, `OVERLAY_PLANE_HEIGHT`, `RELIEF_EPSILON` and
    /// `COLOR_CACHE_CAPACITY` on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("DEPTH_WARP_MODE") {
            match val.to_lowercase().as_str() {
                "linear" => self.warp = WarpMode::Linear,
                "upper_focus" | "focus" => {
                    if matches!(self.warp, WarpMode::Linear) {
                        self.warp = WarpMode::UpperFocus {
                            focus_m: 1000.0,
                            ratio: 0.25,
                        };
                    }
                }
                _ => {}
            }
        }

        if let WarpMode::UpperFocus { focus_m, ratio } = &mut self.warp {
            if let Ok(val) = std::env::var("DEPTH_WARP_FOCUS") {
                if let Ok(focus) = val.parse() {
                    *focus_m = focus;
                }
            }

            if let Ok(val) = std::env::var("DEPTH_WARP_RATIO") {
                if let Ok(r) = val.parse() {
                    *ratio = r;
                }
            }
        }

        if let Ok(val) = std::env::var("OVERLAY_PLANE_HEIGHT") {
            if let Ok(height) = val.parse() {
                self.plane_height_m = height;
            }
        }

        if let Ok(val) = std::env::var("RELIEF_EPSILON") {
            if let Ok(epsilon) = val.parse() {
                self.relief_epsilon_m = epsilon;
            }
        }

        if let Ok(val) = std::env::var("COLOR_CACHE_CAPACITY") {
            if let Ok(capacity) = val.parse() {
                self.color_cache_capacity = capacity;
            }
        }

        self
    }

    /// Warp built from the configured mode, with parameters clamped.
    pub fn depth_warp(&self) -> DepthWarp {
        DepthWarp::new(self.warp)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !self.plane_height_m.is_finite() {
            return Err(SceneError::Config("plane_height_m must be finite".to_string()));
        }

        if !self.relief_epsilon_m.is_finite() || self.relief_epsilon_m < 0.0 {
            return Err(SceneError::Config("relief_epsilon_m must be >= 0".to_string()));
        }

        if self.ocean_band_edges.len() < 2 || !is_ascending(&self.ocean_band_edges) {
            return Err(SceneError::Config(
                "ocean_band_edges needs at least two ascending values".to_string(),
            ));
        }

        if self.land_band_edges.len() < 2 || !is_ascending(&self.land_band_edges) {
            return Err(SceneError::Config(
                "land_band_edges needs at least two ascending values".to_string(),
            ));
        }

        if !(self.tick_step_m > 0.0) {
            return Err(SceneError::Config("tick_step_m must be > 0".to_string()));
        }

        if self.color_cache_capacity == 0 {
            return Err(SceneError::Config("color_cache_capacity must be > 0".to_string()));
        }

        Ok(())
    }
}

fn is_ascending(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite()) && values.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CompositorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.relief_epsilon_m, 2.0);
        assert_eq!(config.ocean_band_edges.first(), Some(&-4200.0));
        assert_eq!(config.ocean_band_edges.last(), Some(&-50.0));
        assert_eq!(config.land_band_edges.last(), Some(&2000.0));
        assert!(config.depth_warp().is_linear());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
warp:
  mode: upper_focus
  focus_m: 1500
  ratio: 0.2
plane_height_m: -500
"#;
        let config = CompositorConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.plane_height_m, -500.0);
        assert_eq!(config.ocean_palette, "deep");
        assert_eq!(config.depth_warp().scale_z(-2500.0), -1700.0);
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compositor.yaml");
        std::fs::write(&path, "relief_epsilon_m: 5\nland_palette: viridis\n").unwrap();
        let config = CompositorConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.relief_epsilon_m, 5.0);
        assert_eq!(config.land_palette, "viridis");
    }

    #[test]
    fn test_bad_yaml_is_error() {
        assert!(matches!(
            CompositorConfig::from_yaml_str("warp: [1, 2"),
            Err(SceneError::Yaml(_))
        ));
    }

    #[test]
    fn test_config_validation() {
        let mut config = CompositorConfig {
            ocean_band_edges: vec![-50.0, -4200.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = CompositorConfig {
            relief_epsilon_m: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        config = CompositorConfig {
            color_cache_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
