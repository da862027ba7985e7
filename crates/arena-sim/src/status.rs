//! Timed status effects and their stacking rules.
//!
//! At most one effect of each [`StatusKind`] is active on a combatant.
//! Re-applying a kind keeps the longer timer; shields add their absorption
//! pool, every other kind takes the incoming value.

use serde::{Deserialize, Serialize};

/// Slow magnitude used when an effect carries no value.
pub const DEFAULT_SLOW: f32 = 0.3;
/// Burn damage per second used when an effect carries no value.
pub const DEFAULT_BURN_PER_SEC: f32 = 10.0;

/// Kind of a timed modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// Damage over time, bypasses shields.
    Burn,
    /// Fractional movement speed reduction.
    Slow,
    /// No movement, auto-attacks or casting.
    Stun,
    /// Damage absorption pool.
    Shield,
    /// Flat movement speed bonus.
    Speed,
}

/// A timed modifier attached to a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEffect {
    /// Effect kind
    #[serde(rename = "type")]
    pub kind: StatusKind,
    /// Remaining time in milliseconds
    #[serde(rename = "timer")]
    pub timer_ms: f32,
    /// Magnitude (slow fraction, speed bonus, burn rate, shield pool)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f32>,
}

impl StatusEffect {
    /// Create an effect without a value.
    #[must_use]
    pub const fn new(kind: StatusKind, timer_ms: f32) -> Self {
        Self {
            kind,
            timer_ms,
            value: None,
        }
    }

    /// Set the magnitude.
    #[must_use]
    pub const fn with_value(mut self, value: f32) -> Self {
        self.value = Some(value);
        self
    }

    /// Magnitude with the per-kind default filled in.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        match (self.kind, self.value) {
            (_, Some(v)) => v,
            (StatusKind::Slow, None) => DEFAULT_SLOW,
            (StatusKind::Burn, None) => DEFAULT_BURN_PER_SEC,
            (StatusKind::Stun | StatusKind::Shield | StatusKind::Speed, None) => 0.0,
        }
    }
}

/// Result of running damage through a shield.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShieldOutcome {
    /// No shield was active; the full amount passes through.
    Unshielded,
    /// The shield soaked everything.
    Absorbed,
    /// The shield broke; `remaining` passes through to HP.
    Broken {
        /// Damage left after the shield pool was consumed
        remaining: f32,
    },
}

/// Ordered list of active effects, one per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet {
    effects: Vec<StatusEffect>,
}

impl StatusSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an effect using the stacking rules.
    pub fn apply(&mut self, incoming: &StatusEffect) {
        if let Some(existing) = self.effects.iter_mut().find(|e| e.kind == incoming.kind) {
            existing.timer_ms = existing.timer_ms.max(incoming.timer_ms);
            if incoming.kind == StatusKind::Shield {
                existing.value =
                    Some(existing.value.unwrap_or(0.0) + incoming.value.unwrap_or(0.0));
            } else {
                existing.value = incoming.value;
            }
        } else {
            self.effects.push(incoming.clone());
        }
    }

    /// Get the active effect of a kind.
    #[must_use]
    pub fn get(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.effects.iter().find(|e| e.kind == kind)
    }

    /// Check whether a kind is active.
    #[must_use]
    pub fn has(&self, kind: StatusKind) -> bool {
        self.get(kind).is_some()
    }

    /// Check whether the holder is stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.has(StatusKind::Stun)
    }

    /// Remaining shield pool.
    #[must_use]
    pub fn shield_value(&self) -> f32 {
        self.get(StatusKind::Shield).map_or(0.0, |s| s.value.unwrap_or(0.0))
    }

    /// Movement speed after slows and speed buffs, never negative.
    #[must_use]
    pub fn effective_speed(&self, base: f32) -> f32 {
        let slow = self.get(StatusKind::Slow).map_or(0.0, StatusEffect::magnitude);
        let bonus = self.get(StatusKind::Speed).map_or(0.0, StatusEffect::magnitude);
        (base * (1.0 - slow) + bonus).max(0.0)
    }

    /// Run `amount` of damage through the shield, consuming or removing it.
    pub fn absorb(&mut self, amount: f32) -> ShieldOutcome {
        let Some(index) = self.effects.iter().position(|e| e.kind == StatusKind::Shield) else {
            return ShieldOutcome::Unshielded;
        };
        let pool = self.effects[index].value.unwrap_or(0.0);
        if pool >= amount {
            self.effects[index].value = Some(pool - amount);
            ShieldOutcome::Absorbed
        } else {
            self.effects.remove(index);
            ShieldOutcome::Broken {
                remaining: amount - pool,
            }
        }
    }

    /// Advance all timers by `dt_ms`, removing expired effects.
    ///
    /// Returns the burn damage accrued over the step. Burn only counts the
    /// part of the step it was still active for.
    pub fn tick(&mut self, dt_ms: f32) -> f32 {
        let mut burn = 0.0;
        for effect in &mut self.effects {
            if effect.kind == StatusKind::Burn {
                let active_ms = dt_ms.min(effect.timer_ms).max(0.0);
                burn += effect.magnitude() * active_ms / 1000.0;
            }
            effect.timer_ms = (effect.timer_ms - dt_ms).max(0.0);
        }
        self.effects.retain(|e| e.timer_ms > 0.0);
        burn
    }

    /// Iterate over active effects.
    pub fn iter(&self) -> impl Iterator<Item = &StatusEffect> {
        self.effects.iter()
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    /// Check if no effect is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Remove every effect.
    pub fn clear(&mut self) {
        self.effects.clear();
    }
}
