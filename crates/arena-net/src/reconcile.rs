//! Guest position reconciliation.

use arena_common::Vec2;

use crate::config::SyncConfig;

/// How a predicted position was corrected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Already exact
    None,
    /// Error recorded, worked off over the following ticks
    Blended,
    /// Jumped to the authoritative position
    Snapped,
}

/// Pulls a predicted position toward the authoritative one.
///
/// Each snapshot measures the error. Errors above `snap_threshold` are
/// corrected immediately; smaller ones are kept as an outstanding offset
/// and `blend` of what remains is applied every tick, so the error never
/// grows between snapshots absent new drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reconciler {
    snap_threshold: f32,
    blend: f32,
    /// Correction not yet applied
    outstanding: Vec2,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}

impl Reconciler {
    /// Create from sync tunables.
    #[must_use]
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            snap_threshold: config.snap_threshold.max(0.0),
            blend: config.blend.clamp(0.0, 1.0),
            outstanding: Vec2::ZERO,
        }
    }

    /// Measure a fresh authoritative position against the prediction.
    ///
    /// Returns the position to use now. A new measurement replaces any
    /// correction still outstanding, since it already includes it.
    pub fn correct(&mut self, predicted: Vec2, authoritative: Vec2) -> (Vec2, Correction) {
        let error = authoritative - predicted;
        let distance = error.length();
        if distance == 0.0 {
            self.outstanding = Vec2::ZERO;
            (predicted, Correction::None)
        } else if distance > self.snap_threshold {
            self.outstanding = Vec2::ZERO;
            (authoritative, Correction::Snapped)
        } else {
            self.outstanding = error;
            (predicted, Correction::Blended)
        }
    }

    /// Apply one tick's share of the outstanding correction.
    pub fn smooth(&mut self, position: Vec2) -> Vec2 {
        let step = self.outstanding * self.blend;
        self.outstanding -= step;
        position + step
    }

    /// Correction still to be applied.
    #[must_use]
    pub fn outstanding(&self) -> Vec2 {
        self.outstanding
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_large_drift_snaps() {
        let mut reconciler = Reconciler::default();
        let authoritative = Vec2::new(500.0, 300.0);

        let (position, correction) = reconciler.correct(Vec2::new(400.0, 300.0), authoritative);

        assert_eq!(correction, Correction::Snapped);
        assert!(position.distance(authoritative) < 1e-4);
        assert_eq!(reconciler.outstanding(), Vec2::ZERO);
    }

    #[test]
    fn test_small_drift_blends_per_tick() {
        let mut reconciler = Reconciler::default();
        let predicted = Vec2::new(100.0, 100.0);

        let (position, correction) = reconciler.correct(predicted, Vec2::new(150.0, 100.0));
        assert_eq!(correction, Correction::Blended);
        assert_eq!(position, predicted);

        let position = reconciler.smooth(position);
        assert!((position.x - 110.0).abs() < 1e-4);
        let position = reconciler.smooth(position);
        assert!((position.x - 118.0).abs() < 1e-4);
        assert!((reconciler.outstanding().x - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_new_measurement_replaces_outstanding() {
        let mut reconciler = Reconciler::default();
        reconciler.correct(Vec2::ZERO, Vec2::new(50.0, 0.0));
        reconciler.smooth(Vec2::ZERO);

        reconciler.correct(Vec2::new(10.0, 0.0), Vec2::new(10.0, 20.0));

        assert!(reconciler.outstanding().distance(Vec2::new(0.0, 20.0)) < 1e-4);
    }

    #[test]
    fn test_exact_is_untouched() {
        let mut reconciler = Reconciler::default();
        let point = Vec2::new(5.0, 5.0);
        assert_eq!(reconciler.correct(point, point), (point, Correction::None));
        assert_eq!(reconciler.smooth(point), point);
    }

    proptest! {
        #[test]
        fn prop_error_never_grows(
            px in -1000.0f32..1000.0,
            py in -1000.0f32..1000.0,
            dx in -79.0f32..79.0,
            dy in -79.0f32..79.0,
        ) {
            let mut reconciler = Reconciler::default();
            let authoritative = Vec2::new(px, py);
            let mut predicted = authoritative + Vec2::new(dx, dy) * 0.7;
            let mut last = predicted.distance(authoritative);
            // A snapshot every third tick.
            for tick in 0..30 {
                if tick % 3 == 0 {
                    predicted = reconciler.correct(predicted, authoritative).0;
                }
                predicted = reconciler.smooth(predicted);
                let now = predicted.distance(authoritative);
                prop_assert!(now <= last + 1e-3);
                last = now;
            }
        }
    }
}
