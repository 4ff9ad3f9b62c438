//! Advection tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Particle pool and integration settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvectionConfig {
    /// Number of particles in the pool.
    pub particle_count: usize,

    /// Trail points kept per particle, including the current position.
    pub max_trail: usize,

    /// Degrees moved per second per unit of field magnitude.
    pub speed_factor: f64,

    /// Initial lifetime range in simulated seconds.
    pub ttl_min: f64,
    pub ttl_max: f64,

    /// Clamp for the per-frame step in seconds.
    pub dt_min: f64,
    pub dt_max: f64,

    /// Random spawn positions tried before falling back to the centre.
    pub spawn_attempts: usize,

    /// Velocity magnitudes at or below this count as calm.
    pub speed_epsilon: f32,

    /// Number of speed bins for drawing.
    pub speed_classes: usize,

    /// Minimum time between redraw pushes, in milliseconds.
    pub redraw_interval_ms: u64,
}

impl Default for AdvectionConfig {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            max_trail: 12,
            speed_factor: 8.0,
            ttl_min: 2.0,
            ttl_max: 8.0,
            dt_min: 0.001,
            dt_max: 0.1,
            spawn_attempts: 20,
            speed_epsilon: 1e-6,
            speed_classes: 6,
            redraw_interval_ms: 36,
        }
    }
}

impl AdvectionConfig {
    pub fn redraw_interval(&self) -> Duration {
        Duration::from_millis(self.redraw_interval_ms)
    }

    /// Clamp an elapsed wall-clock step into the safe range.
    pub fn clamp_dt(&self, dt: f64) -> f64 {
        if !dt.is_finite() {
            return self.dt_min;
        }
        dt.clamp(self.dt_min, self.dt_max)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_trail < 2 {
            return Err("max_trail must be >= 2".to_string());
        }

        if !(self.ttl_min > 0.0 && self.ttl_max >= self.ttl_min) {
            return Err("ttl range must satisfy 0 < ttl_min <= ttl_max".to_string());
        }

        if !(self.dt_min > 0.0 && self.dt_max >= self.dt_min) {
            return Err("dt range must satisfy 0 < dt_min <= dt_max".to_string());
        }

        if !self.speed_factor.is_finite() || self.speed_factor <= 0.0 {
            return Err("speed_factor must be > 0".to_string());
        }

        if self.speed_classes == 0 {
            return Err("speed_classes must be > 0".to_string());
        }

        if self.spawn_attempts == 0 {
            return Err("spawn_attempts must be > 0".to_string());
        }

        Ok(())
    }
}
