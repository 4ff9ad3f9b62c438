//! The particle pool and its integrator.

use grid_processor::VectorField;
use ocean_common::BoundingBox;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::AdvectionConfig;
use crate::error::{AdvectionError, Result};
use crate::particle::Particle;

/// Counts from one [`AdvectionEngine::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    pub advected: usize,
    pub expired: usize,
    pub left_domain: usize,
    pub no_data: usize,
}

impl StepReport {
    pub fn respawned(&self) -> usize {
        self.expired + self.left_domain + self.no_data
    }
}

/// All trails in one speed class, flattened for a single draw call.
///
/// Particles are separated by a NaN pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedClassPolyline {
    pub class: usize,
    /// Normalised speed range `[lo, hi)` covered by the class.
    pub speed_range: (f32, f32),
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub particles: usize,
}

/// Why a particle has to be respawned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Respawn {
    Expired,
    LeftDomain,
    NoData,
}

/// Simulates a bounded pool of particles through a vector field.
pub struct AdvectionEngine<R> {
    field: VectorField,
    bounds: BoundingBox,
    max_speed: f32,
    config: AdvectionConfig,
    rng: R,
    particles: Vec<Particle>,
}

impl<R: Rng> AdvectionEngine<R> {
    /// Build the engine and spawn the full pool.
    pub fn new(field: VectorField, config: AdvectionConfig, rng: R) -> Result<Self> {
        config.validate().map_err(AdvectionError::InvalidConfig)?;
        let bounds = field.bounds();
        if bounds.is_degenerate() {
            return Err(AdvectionError::DegenerateField);
        }
        let max_speed = field.max_speed();

        let mut engine = Self {
            field,
            bounds,
            max_speed,
            config,
            rng,
            particles: Vec::new(),
        };
        let count = engine.config.particle_count;
        let particles: Vec<Particle> = (0..count).map(|_| engine.spawn()).collect();
        engine.particles = particles;

        debug!(
            particles = engine.particles.len(),
            max_speed = engine.max_speed,
            "Advection engine ready"
        );
        Ok(engine)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    pub fn config(&self) -> &AdvectionConfig {
        &self.config
    }

    /// Largest speed in the field, used to normalise speed classes.
    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    /// Random in-bounds position with usable velocity, or the domain centre
    /// with zero velocity once the attempts run out.
    fn spawn(&mut self) -> Particle {
        let ttl = self.rng.gen_range(self.config.ttl_min..=self.config.ttl_max);
        let b = self.bounds;

        for _ in 0..self.config.spawn_attempts {
            let x = self.rng.gen_range(b.min_lon..=b.max_lon);
            let y = self.rng.gen_range(b.min_lat..=b.max_lat);
            if let Some((u, v)) = self.field.sample_bilinear(x, y) {
                let speed = u.hypot(v);
                if speed > self.config.speed_epsilon {
                    return Particle::spawned(x, y, ttl, speed, self.config.max_trail);
                }
            }
        }

        let (cx, cy) = b.center();
        Particle::spawned(cx, cy, ttl, 0.0, self.config.max_trail)
    }

    /// Replace particle `index` with a fresh one.
    pub fn respawn(&mut self, index: usize) {
        if index < self.particles.len() {
            self.particles[index] = self.spawn();
        }
    }

    /// Advance every particle by one clamped step.
    pub fn step(&mut self, dt: f64) -> StepReport {
        let dt = self.config.clamp_dt(dt);
        let mut report = StepReport::default();

        for index in 0..self.particles.len() {
            match self.integrate(index, dt) {
                Ok(()) => report.advected += 1,
                Err(reason) => {
                    match reason {
                        Respawn::Expired => report.expired += 1,
                        Respawn::LeftDomain => report.left_domain += 1,
                        Respawn::NoData => report.no_data += 1,
                    }
                    self.respawn(index);
                }
            }
        }
        report
    }

    /// Midpoint step for one particle. On failure the particle is left
    /// untouched and the caller respawns it.
    fn integrate(&mut self, index: usize, dt: f64) -> std::result::Result<(), Respawn> {
        let max_trail = self.config.max_trail;
        let h = self.config.speed_factor * dt;
        let epsilon = self.config.speed_epsilon;
        let p = &self.particles[index];

        let (u0, v0) = self
            .field
            .sample_bilinear(p.x, p.y)
            .ok_or(Respawn::NoData)?;
        let mx = p.x + u0 as f64 * h * 0.5;
        let my = p.y + v0 as f64 * h * 0.5;
        let (u1, v1) = self
            .field
            .sample_bilinear(mx, my)
            .ok_or(Respawn::NoData)?;

        let speed = u1.hypot(v1);
        if speed <= epsilon {
            return Err(Respawn::NoData);
        }

        let nx = p.x + u1 as f64 * h;
        let ny = p.y + v1 as f64 * h;
        if !self.bounds.contains(nx, ny) {
            return Err(Respawn::LeftDomain);
        }

        let ttl = p.ttl - dt;
        if ttl <= 0.0 {
            return Err(Respawn::Expired);
        }

        let p = &mut self.particles[index];
        p.ttl = ttl;
        p.advance(nx, ny, speed, max_trail);
        Ok(())
    }

    /// Speed class of a particle: `floor(speed / max_speed * classes)`.
    fn speed_class(&self, speed: f32) -> usize {
        let classes = self.config.speed_classes;
        if !(self.max_speed > 0.0) || !speed.is_finite() {
            return 0;
        }
        let t = (speed / self.max_speed).clamp(0.0, 1.0);
        ((t * classes as f32) as usize).min(classes - 1)
    }

    /// One NaN-separated polyline per speed class, slowest first.
    ///
    /// Particles whose trail has a single point draw nothing and are skipped.
    pub fn emit_polylines(&self) -> Vec<SpeedClassPolyline> {
        let classes = self.config.speed_classes;
        let mut lines: Vec<SpeedClassPolyline> = (0..classes)
            .map(|class| SpeedClassPolyline {
                class,
                speed_range: (
                    class as f32 / classes as f32,
                    (class + 1) as f32 / classes as f32,
                ),
                x: Vec::new(),
                y: Vec::new(),
                particles: 0,
            })
            .collect();

        for p in &self.particles {
            if p.trail_len() < 2 {
                continue;
            }
            let line = &mut lines[self.speed_class(p.speed)];
            if line.particles > 0 {
                line.x.push(f64::NAN);
                line.y.push(f64::NAN);
            }
            for &(x, y) in p.trail() {
                line.x.push(x);
                line.y.push(y);
            }
            line.particles += 1;
        }
        lines
    }
}
