//! End-to-end advection runs over generated fields.

use std::time::{Duration, Instant};

use advection::{AdvectionConfig, AdvectionEngine, FrameScheduler};
use grid_processor::VectorField;
use rand::rngs::StdRng;
use rand::SeedableRng;
use test_utils::{axis, uniform_components, vortex_components};

const WIDTH: usize = 51;
const HEIGHT: usize = 41;

fn field(u: Vec<f32>, v: Vec<f32>) -> VectorField {
    let lon = axis("lon", -30.0, 20.0, WIDTH);
    let lat = axis("lat", 60.0, 80.0, HEIGHT);
    VectorField::new(lon, lat, u, v).unwrap()
}

fn engine(field: VectorField, seed: u64) -> AdvectionEngine<StdRng> {
    let config = AdvectionConfig {
        particle_count: 300,
        ..Default::default()
    };
    AdvectionEngine::new(field, config, StdRng::seed_from_u64(seed)).unwrap()
}

#[test]
fn test_vortex_keeps_particles_in_domain() {
    let (u, v) = vortex_components(WIDTH, HEIGHT);
    let mut engine = engine(field(u, v), 11);
    let bounds = engine.bounds();

    let mut respawned = 0;
    for _ in 0..200 {
        let report = engine.step(0.05);
        assert_eq!(report.advected + report.respawned(), 300);
        respawned += report.respawned();
    }
    assert!(respawned > 0, "lifetimes should expire within 10 simulated seconds");

    for p in engine.particles() {
        assert!(bounds.contains(p.x, p.y), "particle escaped to ({}, {})", p.x, p.y);
        assert!(p.trail_len() <= engine.config().max_trail);
        assert!(p.ttl > 0.0);
    }
}

#[test]
fn test_missing_half_is_never_entered() {
    // East of lon 0 the field has no data.
    let (mut u, mut v) = uniform_components(WIDTH, HEIGHT, 1.0, 0.0);
    for j in 0..HEIGHT {
        for i in 30..WIDTH {
            u[j * WIDTH + i] = f32::NAN;
            v[j * WIDTH + i] = f32::NAN;
        }
    }
    let mut engine = engine(field(u, v), 12);

    for _ in 0..100 {
        engine.step(0.1);
        for p in engine.particles() {
            assert!(p.x < 1.0, "particle drifted into missing data at lon {}", p.x);
        }
    }
}

#[test]
fn test_polylines_cover_every_moving_particle() {
    let (u, v) = vortex_components(WIDTH, HEIGHT);
    let mut engine = engine(field(u, v), 13);
    for _ in 0..5 {
        engine.step(0.02);
    }

    let lines = engine.emit_polylines();
    assert_eq!(lines.len(), engine.config().speed_classes);

    let moving = engine.particles().iter().filter(|p| p.trail_len() >= 2).count();
    let drawn: usize = lines.iter().map(|l| l.particles).sum();
    assert_eq!(drawn, moving);

    for line in &lines {
        assert_eq!(line.x.len(), line.y.len());
        let gaps = line.x.iter().filter(|x| x.is_nan()).count();
        assert_eq!(gaps, line.particles.saturating_sub(1));
    }
}

#[test]
fn test_polylines_serialize_gaps_as_null() {
    let (u, v) = uniform_components(WIDTH, HEIGHT, 0.5, 0.5);
    let mut engine = engine(field(u, v), 14);
    engine.step(0.02);

    let json = serde_json::to_value(engine.emit_polylines()).unwrap();
    let top = &json[engine.config().speed_classes - 1];
    let xs = top["x"].as_array().unwrap();
    assert!(xs.iter().any(|x| x.is_null()));
}

#[test]
fn test_scheduler_drives_engine() {
    let (u, v) = vortex_components(WIDTH, HEIGHT);
    let mut engine = engine(field(u, v), 15);
    let mut scheduler = FrameScheduler::new(engine.config());

    let t0 = Instant::now();
    let mut pushes = 0;
    for frame in 0..60u64 {
        let action = scheduler.on_frame(t0 + Duration::from_millis(frame * 16));
        engine.step(action.dt);
        if action.push_redraw {
            pushes += 1;
        }
    }
    // Roughly one push per three 16 ms frames.
    assert!((18..=22).contains(&pushes), "pushes = {}", pushes);
}
