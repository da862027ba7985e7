//! Sync and link tunables.

use serde::{Deserialize, Serialize};

/// Host/guest synchronization tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Milliseconds between host snapshots
    pub snapshot_interval_ms: f32,
    /// Guest position error above which the guest snaps
    pub snap_threshold: f32,
    /// Fraction of the outstanding error removed per tick below the threshold
    pub blend: f32,
    /// How long the guest keeps its own move target before deferring to
    /// the host's, if no snapshot has confirmed the move
    pub move_ack_timeout_ms: f32,
    /// Capacity of each loopback channel direction
    pub channel_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 50.0,
            snap_threshold: 80.0,
            blend: 0.2,
            move_ack_timeout_ms: 500.0,
            channel_capacity: 256,
        }
    }
}

impl SyncConfig {
    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        self.snapshot_interval_ms = self.snapshot_interval_ms.clamp(1.0, 1000.0);
        self.snap_threshold = self.snap_threshold.max(0.0);
        self.blend = self.blend.clamp(0.01, 1.0);
        self.move_ack_timeout_ms = self.move_ack_timeout_ms.clamp(0.0, 10_000.0);
        self.channel_capacity = self.channel_capacity.clamp(1, 65_536);
    }
}

/// Simulated network conditions for an in-process link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// One-way delay in milliseconds
    pub latency_ms: f32,
    /// Fraction of outbound messages silently dropped
    pub drop_rate: f32,
    /// Seed for the drop decision
    pub seed: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            latency_ms: 60.0,
            drop_rate: 0.05,
            seed: 0x11_4e7,
        }
    }
}

impl LinkConfig {
    /// A link with no delay and no loss.
    #[must_use]
    pub fn perfect() -> Self {
        Self {
            latency_ms: 0.0,
            drop_rate: 0.0,
            ..Self::default()
        }
    }

    /// Clamp values to usable ranges.
    pub fn validate(&mut self) {
        self.latency_ms = self.latency_ms.clamp(0.0, 5000.0);
        self.drop_rate = self.drop_rate.clamp(0.0, 1.0);
    }
}
