//! Visual effect events.
//!
//! Effects are advisory output for a renderer. Nothing in the simulation
//! reads them back, so dropping them never changes an outcome.

use arena_common::Vec2;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::{Deserialize, Serialize};

/// Kind of visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    /// Expanding ring (area bursts, self-buffs)
    Ring,
    /// Filled burst (zone detonation)
    Explosion,
    /// Shield soaked a hit
    Impact,
    /// Shield broke
    Shatter,
    /// Dash landing
    Shockwave,
    /// Movement command acknowledgement
    MoveMarker,
}

/// A transient visual effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectEvent {
    /// Effect kind
    #[serde(rename = "type")]
    pub kind: EffectKind,
    /// Centre
    pub position: Vec2,
    /// Color
    pub color: String,
    /// Radius
    pub radius: f32,
    /// Lifetime in milliseconds
    pub duration_ms: f32,
}

impl EffectEvent {
    /// Create an effect event.
    #[must_use]
    pub fn new(
        kind: EffectKind,
        position: Vec2,
        color: impl Into<String>,
        radius: f32,
        duration_ms: f32,
    ) -> Self {
        Self {
            kind,
            position,
            color: color.into(),
            radius,
            duration_ms,
        }
    }
}

/// Destination for effect events.
pub trait EffectSink {
    /// Emit one event.
    fn emit(&mut self, event: EffectEvent);
}

impl EffectSink for Vec<EffectEvent> {
    fn emit(&mut self, event: EffectEvent) {
        self.push(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EffectSink for NullSink {
    fn emit(&mut self, _event: EffectEvent) {}
}

/// Channel-backed effect bus for a presentation layer on another thread.
#[derive(Debug)]
pub struct EffectBus {
    /// Sender for publishing effects
    sender: Sender<EffectEvent>,
    /// Receiver for collecting effects
    receiver: Receiver<EffectEvent>,
    /// Channel capacity
    capacity: usize,
}

impl Default for EffectBus {
    fn default() -> Self {
        Self::new(256)
    }
}

impl EffectBus {
    /// Creates a new effect bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity.max(1));
        Self {
            sender,
            receiver,
            capacity: capacity.max(1),
        }
    }

    /// Publishes an effect. Dropped if the bus is full.
    pub fn publish(&self, event: EffectEvent) {
        let _ = self.sender.try_send(event);
    }

    /// Drains all pending effects.
    pub fn drain(&self) -> Vec<EffectEvent> {
        self.receiver.try_iter().collect()
    }

    /// Returns the number of pending effects.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    /// Returns the channel capacity.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Creates a receiver handle for a consumer.
    #[must_use]
    pub fn subscriber(&self) -> Receiver<EffectEvent> {
        self.receiver.clone()
    }
}

impl EffectSink for EffectBus {
    fn emit(&mut self, event: EffectEvent) {
        self.publish(event);
    }
}
