use std::collections::VecDeque;

use serde::Serialize;

/// One simulated particle in lon/lat space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    /// Remaining lifetime in simulated seconds.
    pub ttl: f64,
    /// Speed sampled at the last step.
    pub speed: f32,
    trail: VecDeque<(f64, f64)>,
}

impl Particle {
    pub(crate) fn spawned(x: f64, y: f64, ttl: f64, speed: f32, max_trail: usize) -> Self {
        let mut trail = VecDeque::with_capacity(max_trail);
        trail.push_back((x, y));
        Self {
            x,
            y,
            ttl,
            speed,
            trail,
        }
    }

    /// Move to a new position and record it, dropping the oldest trail
    /// points beyond `max_trail`.
    pub(crate) fn advance(&mut self, x: f64, y: f64, speed: f32, max_trail: usize) {
        self.x = x;
        self.y = y;
        self.speed = speed;
        self.trail.push_back((x, y));
        while self.trail.len() > max_trail {
            self.trail.pop_front();
        }
    }

    /// Trail positions, oldest first; the last one is the current position.
    pub fn trail(&self) -> impl ExactSizeIterator<Item = &(f64, f64)> {
        self.trail.iter()
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }
}
