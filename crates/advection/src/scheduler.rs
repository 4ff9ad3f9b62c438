//! Frame pacing.
//!
//! The host calls [`FrameScheduler::on_frame`] once per display frame. The
//! simulation steps on every frame; redraws are only pushed once the redraw
//! interval has passed since the previous push.

use std::time::{Duration, Instant};

use crate::config::AdvectionConfig;

/// What to do for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameAction {
    /// Clamped simulation step in seconds.
    pub dt: f64,
    /// Whether the renderer should receive new polylines this frame.
    pub push_redraw: bool,
}

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    last_frame: Option<Instant>,
    last_push: Option<Instant>,
    redraw_interval: Duration,
    dt_min: f64,
    dt_max: f64,
}

impl FrameScheduler {
    pub fn new(config: &AdvectionConfig) -> Self {
        Self {
            last_frame: None,
            last_push: None,
            redraw_interval: config.redraw_interval(),
            dt_min: config.dt_min,
            dt_max: config.dt_max,
        }
    }

    pub fn redraw_interval(&self) -> Duration {
        self.redraw_interval
    }

    /// Account for a frame at `now`.
    ///
    /// The first frame steps by the minimum `dt` and always redraws.
    /// Timestamps that go backwards count as a zero-length frame.
    pub fn on_frame(&mut self, now: Instant) -> FrameAction {
        let elapsed = match self.last_frame {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f64(),
            None => self.dt_min,
        };
        self.last_frame = Some(now);

        let push_redraw = match self.last_push {
            Some(prev) => now.saturating_duration_since(prev) >= self.redraw_interval,
            None => true,
        };
        if push_redraw {
            self.last_push = Some(now);
        }

        FrameAction {
            dt: elapsed.clamp(self.dt_min, self.dt_max),
            push_redraw,
        }
    }

    /// Forget frame history, e.g. after the view was hidden.
    pub fn reset(&mut self) {
        self.last_frame = None;
        self.last_push = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_first_frame_redraws() {
        let mut scheduler = FrameScheduler::new(&AdvectionConfig::default());
        let action = scheduler.on_frame(Instant::now());
        assert!(action.push_redraw);
        assert_eq!(action.dt, 0.001);
    }

    #[test]
    fn test_redraw_is_throttled() {
        let mut scheduler = FrameScheduler::new(&AdvectionConfig::default());
        let t0 = Instant::now();
        scheduler.on_frame(t0);

        // 60 Hz frames: 16, 32 ms skip the push, 48 ms is past 36 ms.
        let a = scheduler.on_frame(t0 + ms(16));
        let b = scheduler.on_frame(t0 + ms(32));
        let c = scheduler.on_frame(t0 + ms(48));
        assert!(!a.push_redraw);
        assert!(!b.push_redraw);
        assert!(c.push_redraw);
        assert!((a.dt - 0.016).abs() < 1e-9);

        // Throttle restarts from the last push.
        assert!(!scheduler.on_frame(t0 + ms(64)).push_redraw);
        assert!(scheduler.on_frame(t0 + ms(84)).push_redraw);
    }

    #[test]
    fn test_long_pause_is_clamped() {
        let mut scheduler = FrameScheduler::new(&AdvectionConfig::default());
        let t0 = Instant::now();
        scheduler.on_frame(t0);
        let action = scheduler.on_frame(t0 + Duration::from_secs(3));
        assert_eq!(action.dt, 0.1);
        assert!(action.push_redraw);
    }

    #[test]
    fn test_reset_behaves_like_first_frame() {
        let mut scheduler = FrameScheduler::new(&AdvectionConfig::default());
        let t0 = Instant::now();
        scheduler.on_frame(t0);
        scheduler.reset();
        let action = scheduler.on_frame(t0 + ms(5));
        assert!(action.push_redraw);
        assert_eq!(action.dt, 0.001);
    }
}
