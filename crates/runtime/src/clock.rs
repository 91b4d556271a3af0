use std::time::Instant;

/// Wall clock for the frame loop: elapsed time since start and the delta
/// since the previous frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_elapsed: f64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            last_elapsed: 0.0,
        }
    }

    /// Read the wall clock and return the seconds since the last call.
    pub fn tick(&mut self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f64();
        self.advance_to(elapsed)
    }

    /// Move to an explicit elapsed time. The delta is never negative.
    pub fn advance_to(&mut self, elapsed: f64) -> f32 {
        let delta = (elapsed - self.last_elapsed).max(0.0);
        self.last_elapsed = self.last_elapsed.max(elapsed);
        delta as f32
    }

    #[must_use]
    pub fn elapsed(&self) -> f64 {
        self.last_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn deltas_follow_elapsed_time() {
        let mut clock = FrameClock::new();
        assert_relative_eq!(clock.advance_to(0.5), 0.5);
        assert_relative_eq!(clock.advance_to(0.75), 0.25);
        assert_relative_eq!(clock.elapsed(), 0.75);
    }

    #[test]
    fn time_never_runs_backwards() {
        let mut clock = FrameClock::new();
        clock.advance_to(2.0);
        assert_eq!(clock.advance_to(1.0), 0.0);
        assert_relative_eq!(clock.advance_to(2.5), 0.5);
    }

    #[test]
    fn wall_clock_ticks_are_non_negative() {
        let mut clock = FrameClock::new();
        for _ in 0..10 {
            assert!(clock.tick() >= 0.0);
        }
    }
}
