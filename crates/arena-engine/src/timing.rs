//! Frame pacing for the match loop.
//!
//! In realtime mode each frame reports the measured wall-clock delta and
//! sleeps off the rest of its budget. Otherwise frames report a fixed
//! delta and run back to back, so a whole match simulates in moments.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame pacing and frame-time statistics.
#[derive(Debug)]
pub struct FramePacer {
    /// Nominal frame length in milliseconds
    frame_ms: f32,
    /// Time budget per frame
    frame_budget: Duration,
    /// Time of last frame start
    last_frame: Instant,
    /// Measure and sleep against the wall clock
    realtime: bool,
    /// Total time handed out so far
    elapsed_ms: f64,
    /// Recent frame times for averaging
    frame_times: VecDeque<f32>,
    /// Maximum samples for averaging
    max_samples: usize,
}

impl FramePacer {
    /// Create a pacer with the given nominal frame length.
    #[must_use]
    pub fn new(frame_ms: f32, realtime: bool) -> Self {
        let frame_ms = frame_ms.max(1.0);
        Self {
            frame_ms,
            frame_budget: Duration::from_secs_f32(frame_ms / 1000.0),
            last_frame: Instant::now(),
            realtime,
            elapsed_ms: 0.0,
            frame_times: VecDeque::with_capacity(120),
            max_samples: 120,
        }
    }

    /// Delta for the frame starting now, in milliseconds.
    pub fn delta_ms(&mut self) -> f32 {
        let dt = if self.realtime {
            let now = Instant::now();
            let dt = (now - self.last_frame).as_secs_f32() * 1000.0;
            self.last_frame = now;
            dt
        } else {
            self.frame_ms
        };

        self.elapsed_ms += f64::from(dt);
        self.frame_times.push_back(dt);
        if self.frame_times.len() > self.max_samples {
            self.frame_times.pop_front();
        }
        dt
    }

    /// Sleep for the remainder of the frame budget (realtime only).
    pub fn sleep_remainder(&self) {
        if !self.realtime {
            return;
        }
        let elapsed = self.last_frame.elapsed();
        if elapsed < self.frame_budget {
            std::thread::sleep(self.frame_budget - elapsed);
        }
    }

    /// Total time handed out, in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_ms / 1000.0
    }

    /// Average frame time over recent frames, in milliseconds.
    #[must_use]
    pub fn average_frame_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_frames_are_fixed() {
        let mut pacer = FramePacer::new(20.0, false);
        for _ in 0..50 {
            assert_eq!(pacer.delta_ms(), 20.0);
        }
        assert!((pacer.elapsed_secs() - 1.0).abs() < 1e-6);
        assert!((pacer.average_frame_ms() - 20.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_window_is_bounded() {
        let mut pacer = FramePacer::new(10.0, false);
        for _ in 0..500 {
            pacer.delta_ms();
        }
        assert_eq!(pacer.frame_times.len(), 120);
    }

    #[test]
    fn test_realtime_measures_wall_clock() {
        let mut pacer = FramePacer::new(5.0, true);
        pacer.delta_ms();
        pacer.sleep_remainder();
        let dt = pacer.delta_ms();
        assert!(dt >= 4.0);
    }
}
