//! Combatant statistics.
//!
//! Health and mana are clamped on every mutation: `0 <= hp <= max_hp` and
//! `0 <= mana <= max_mana` hold at all times.

use serde::{Deserialize, Serialize};

/// Core statistics of a combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    /// Current health points.
    pub hp: f32,
    /// Maximum health points.
    pub max_hp: f32,
    /// Current mana.
    pub mana: f32,
    /// Maximum mana.
    pub max_mana: f32,
    /// Mana regenerated per second.
    pub mana_regen: f32,
    /// Base movement speed in units per second.
    pub move_speed: f32,
    /// Damage of a single auto-attack.
    pub base_attack_damage: f32,
    /// Centre-to-centre distance within which auto-attacks fire.
    pub attack_range: f32,
    /// Auto-attacks per second.
    pub attack_speed: f32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            hp: 500.0,
            max_hp: 500.0,
            mana: 150.0,
            max_mana: 150.0,
            mana_regen: 6.0,
            move_speed: 280.0,
            base_attack_damage: 20.0,
            attack_range: 100.0,
            attack_speed: 1.0,
        }
    }
}

impl StatBlock {
    /// Create stats with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set current and maximum HP.
    #[must_use]
    pub fn with_hp(mut self, hp: f32) -> Self {
        self.hp = hp;
        self.max_hp = hp;
        self
    }

    /// Set current and maximum mana plus regeneration.
    #[must_use]
    pub fn with_mana(mut self, mana: f32, regen: f32) -> Self {
        self.mana = mana;
        self.max_mana = mana;
        self.mana_regen = regen;
        self
    }

    /// Set movement speed.
    #[must_use]
    pub fn with_move_speed(mut self, speed: f32) -> Self {
        self.move_speed = speed;
        self
    }

    /// Set auto-attack damage, range and rate.
    #[must_use]
    pub fn with_attack(mut self, damage: f32, range: f32, per_second: f32) -> Self {
        self.base_attack_damage = damage;
        self.attack_range = range;
        self.attack_speed = per_second;
        self
    }

    /// Check if alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }

    /// Get HP ratio (0.0-1.0).
    #[must_use]
    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp <= 0.0 {
            0.0
        } else {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        }
    }

    /// Remove HP directly, ignoring shields. Returns the HP actually lost.
    pub fn lose_hp(&mut self, amount: f32) -> f32 {
        let actual = amount.max(0.0).min(self.hp);
        self.hp = (self.hp - actual).max(0.0);
        actual
    }

    /// Spend mana if enough is available.
    pub fn spend_mana(&mut self, cost: f32) -> bool {
        if self.mana >= cost {
            self.mana = (self.mana - cost).max(0.0);
            true
        } else {
            false
        }
    }

    /// Regenerate mana over `dt_secs` seconds.
    pub fn regen_mana(&mut self, dt_secs: f32) {
        self.mana = (self.mana + self.mana_regen * dt_secs).clamp(0.0, self.max_mana);
    }

    /// Milliseconds between auto-attacks.
    #[must_use]
    pub fn attack_interval_ms(&self) -> f32 {
        if self.attack_speed > 0.0 {
            1000.0 / self.attack_speed
        } else {
            f32::INFINITY
        }
    }

    /// Restore the HP and mana invariants.
    pub fn clamp(&mut self) {
        self.max_hp = self.max_hp.max(0.0);
        self.max_mana = self.max_mana.max(0.0);
        self.hp = self.hp.clamp(0.0, self.max_hp);
        self.mana = self.mana.clamp(0.0, self.max_mana);
    }
}
