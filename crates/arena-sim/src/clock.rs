//! Fixed-step simulation clock.
//!
//! Converts irregular wall-clock deltas into a whole number of fixed steps.
//! Each delta is clamped first so a stall (a backgrounded window, a
//! debugger pause) never turns into a burst of catch-up steps.

use crate::config::SimConfig;

/// Accumulator that hands out fixed steps.
#[derive(Debug, Clone)]
pub struct SimClock {
    /// Fixed step in milliseconds
    fixed_dt_ms: f32,
    /// Largest delta accepted per call
    max_frame_ms: f32,
    /// Step cap per call
    max_steps: u32,
    /// Unconsumed time
    accumulator_ms: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::from_config(&SimConfig::default())
    }
}

impl SimClock {
    /// Create a clock from simulation tunables.
    #[must_use]
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            fixed_dt_ms: config.fixed_dt_ms.max(0.001),
            max_frame_ms: config.max_frame_ms.max(0.0),
            max_steps: config.max_steps.max(1),
            accumulator_ms: 0.0,
        }
    }

    /// Fixed step length in milliseconds.
    #[must_use]
    pub fn fixed_dt_ms(&self) -> f32 {
        self.fixed_dt_ms
    }

    /// Feed an elapsed wall-clock delta; returns how many fixed steps to run.
    pub fn advance(&mut self, elapsed_ms: f32) -> u32 {
        self.accumulator_ms += elapsed_ms.clamp(0.0, self.max_frame_ms);

        let mut count = 0;
        while self.accumulator_ms >= self.fixed_dt_ms && count < self.max_steps {
            self.accumulator_ms -= self.fixed_dt_ms;
            count += 1;
        }

        // Still behind after the cap: drop the backlog.
        if self.accumulator_ms > self.fixed_dt_ms * 2.0 {
            self.accumulator_ms = 0.0;
        }

        count
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(fixed: f32, max_frame: f32, max_steps: u32) -> SimClock {
        SimClock::from_config(&SimConfig {
            fixed_dt_ms: fixed,
            max_frame_ms: max_frame,
            max_steps,
            ..SimConfig::default()
        })
    }

    #[test]
    fn test_accumulates_partial_steps() {
        let mut clock = clock(10.0, 50.0, 8);
        assert_eq!(clock.advance(4.0), 0);
        assert_eq!(clock.advance(4.0), 0);
        assert_eq!(clock.advance(4.0), 1);
        // 2 ms carried over.
        assert_eq!(clock.advance(7.0), 0);
        assert_eq!(clock.advance(1.0), 1);
    }

    #[test]
    fn test_clamps_large_delta() {
        let mut clock = clock(10.0, 50.0, 8);
        // A two-second stall only yields the clamped 50 ms.
        assert_eq!(clock.advance(2000.0), 5);
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_step_cap_drops_backlog() {
        let mut clock = clock(10.0, 100.0, 3);
        assert_eq!(clock.advance(100.0), 3);
        // Backlog beyond two steps was discarded.
        assert_eq!(clock.advance(0.0), 0);
    }

    #[test]
    fn test_negative_delta_ignored() {
        let mut clock = clock(10.0, 50.0, 8);
        assert_eq!(clock.advance(-30.0), 0);
        assert_eq!(clock.advance(9.0), 0);
        assert_eq!(clock.advance(1.0), 1);
    }
}
