//! Combatant entities.

use arena_common::{AbilityKey, Side, Vec2};
use serde::{Deserialize, Serialize};

use crate::effects::{EffectEvent, EffectKind, EffectSink};
use crate::stats::StatBlock;
use crate::status::{ShieldOutcome, StatusEffect, StatusSet};
use crate::template::{Ability, CharacterTemplate};

const SHIELD_COLOR: &str = "#FFD700";

/// Discrete movement state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveState {
    /// Standing at the target
    #[default]
    Idle,
    /// Travelling toward the target
    Moving,
}

/// One of the two combatants.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Which side this combatant is on
    pub side: Side,
    /// Centre position
    pub position: Vec2,
    /// Movement target
    pub target: Vec2,
    /// Facing in radians
    pub angle: f32,
    /// Collision radius
    pub radius: f32,
    /// Current statistics
    pub stats: StatBlock,
    /// Active status effects
    pub statuses: StatusSet,
    /// Owned template copy holding cooldown state
    pub template: CharacterTemplate,
    /// Milliseconds until the next auto-attack
    pub attack_timer_ms: f32,
    /// Movement state
    pub move_state: MoveState,
}

impl Entity {
    /// Spawn a combatant from a template, standing still at `position`.
    #[must_use]
    pub fn spawn(side: Side, template: &CharacterTemplate, position: Vec2, radius: f32) -> Self {
        let angle = match side {
            Side::Local => 0.0,
            Side::Remote => std::f32::consts::PI,
        };
        let mut template = template.clone();
        for ability in &mut template.abilities {
            ability.current_cooldown_ms = 0.0;
        }
        let mut stats = template.stats.clone();
        stats.clamp();
        Self {
            side,
            position,
            target: position,
            angle,
            radius,
            stats,
            statuses: StatusSet::new(),
            template,
            attack_timer_ms: 0.0,
            move_state: MoveState::Idle,
        }
    }

    /// Check if alive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }

    /// Check if stunned.
    #[must_use]
    pub fn is_stunned(&self) -> bool {
        self.statuses.is_stunned()
    }

    /// Whether the combatant may move, attack or cast this tick.
    #[must_use]
    pub fn can_act(&self) -> bool {
        self.is_alive() && !self.is_stunned()
    }

    /// Movement speed after status modifiers.
    #[must_use]
    pub fn effective_speed(&self) -> f32 {
        self.statuses.effective_speed(self.stats.move_speed)
    }

    /// Look up an ability by key.
    #[must_use]
    pub fn ability(&self, key: AbilityKey) -> Option<&Ability> {
        self.template.ability(key)
    }

    /// Deal damage, letting an active shield absorb it first.
    ///
    /// Returns the HP actually lost. Dead combatants take no damage.
    pub fn apply_damage(&mut self, amount: f32, sink: &mut impl EffectSink) -> f32 {
        if !self.is_alive() || amount <= 0.0 {
            return 0.0;
        }
        match self.statuses.absorb(amount) {
            ShieldOutcome::Unshielded => self.stats.lose_hp(amount),
            ShieldOutcome::Absorbed => {
                sink.emit(EffectEvent::new(
                    EffectKind::Impact,
                    self.position,
                    SHIELD_COLOR,
                    40.0,
                    200.0,
                ));
                0.0
            },
            ShieldOutcome::Broken { remaining } => {
                sink.emit(EffectEvent::new(
                    EffectKind::Shatter,
                    self.position,
                    SHIELD_COLOR,
                    70.0,
                    500.0,
                ));
                self.stats.lose_hp(remaining)
            },
        }
    }

    /// Apply a status effect. Ignored on dead combatants.
    pub fn apply_status(&mut self, effect: &StatusEffect) {
        if self.is_alive() {
            self.statuses.apply(effect);
        }
    }

    /// Advance timers, cooldowns, burn damage and mana regeneration.
    ///
    /// Runs for stunned combatants too: a stun never pauses a timer.
    pub fn tick_timers(&mut self, dt_ms: f32) {
        if !self.is_alive() {
            return;
        }
        let burn = self.statuses.tick(dt_ms);
        if burn > 0.0 {
            self.stats.lose_hp(burn);
        }
        self.template.tick_cooldowns(dt_ms);
        self.stats.regen_mana(dt_ms / 1000.0);
    }
}
