use std::time::{Duration, Instant};

/// Upper bound on one frame's delta, in seconds. Long stalls (window drags,
/// breakpoints) would otherwise teleport the camera.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Measures time between consecutive frames.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { last: start }
    }

    /// Seconds since the previous tick, clamped to [`MAX_FRAME_DT`].
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last);
        self.last = now;
        clamp_dt(elapsed)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_dt(elapsed: Duration) -> f32 {
    elapsed.as_secs_f32().min(MAX_FRAME_DT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_elapsed_time() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));
        assert!((dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn long_frames_are_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start + Duration::from_secs(3)), MAX_FRAME_DT);
    }

    #[test]
    fn backwards_time_is_zero() {
        let start = Instant::now() + Duration::from_secs(1);
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start - Duration::from_millis(500)), 0.0);
    }

    #[test]
    fn consecutive_ticks_are_relative() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        clock.tick_at(start + Duration::from_millis(50));
        let dt = clock.tick_at(start + Duration::from_millis(60));
        assert!((dt - 0.010).abs() < 1e-6);
    }
}
