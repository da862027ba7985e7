//! Character templates, abilities and the roster.
//!
//! A template is the static description of a fighter. Each combatant owns
//! a clone of its template, so per-ability cooldown state lives with it.

use arena_common::{AbilityKey, DataError};
use serde::{Deserialize, Serialize};

use crate::stats::StatBlock;
use crate::status::{StatusEffect, StatusKind};

// ============================================================================
// Abilities
// ============================================================================

/// Behavioural archetype of an ability and its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Travelling projectile aimed at a point.
    Projectile {
        /// Travel distance before expiring
        range: f32,
        /// Units per second
        speed: f32,
        /// Collision radius
        radius: f32,
    },
    /// Instant burst around the caster.
    Area {
        /// Burst radius
        radius: f32,
    },
    /// Short-range relocation toward a point.
    Dash {
        /// Maximum travel distance
        range: f32,
    },
    /// Applies the ability's effect to the caster.
    SelfBuff,
    /// Zone that detonates at a point after a delay.
    DelayedZone {
        /// Detonation radius
        radius: f32,
        /// Delay before detonation in milliseconds
        #[serde(rename = "delayMs")]
        delay_ms: f32,
    },
}

impl AbilityKind {
    /// Reach of the ability, if it has one.
    #[must_use]
    pub fn range(&self) -> Option<f32> {
        match self {
            Self::Projectile { range, .. } | Self::Dash { range } => Some(*range),
            Self::Area { .. } | Self::SelfBuff | Self::DelayedZone { .. } => None,
        }
    }
}

/// An ability slot on a character template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Key the ability is bound to
    pub key: AbilityKey,
    /// Display name
    pub name: String,
    /// Archetype and parameters
    pub kind: AbilityKind,
    /// Mana cost
    pub mana_cost: f32,
    /// Full cooldown in milliseconds
    #[serde(rename = "cooldown")]
    pub cooldown_ms: f32,
    /// Remaining cooldown in milliseconds
    #[serde(default, rename = "currentCooldown")]
    pub current_cooldown_ms: f32,
    /// Damage dealt on hit
    pub damage: f32,
    /// Presentation color
    pub color: String,
    /// Effect applied on hit (or to the caster for self-buffs)
    #[serde(default)]
    pub effect: Option<StatusEffect>,
}

impl Ability {
    /// Create an ability with no cost, cooldown or damage.
    #[must_use]
    pub fn new(key: AbilityKey, name: impl Into<String>, kind: AbilityKind) -> Self {
        Self {
            key,
            name: name.into(),
            kind,
            mana_cost: 0.0,
            cooldown_ms: 0.0,
            current_cooldown_ms: 0.0,
            damage: 0.0,
            color: String::from("#ffffff"),
            effect: None,
        }
    }

    /// Set mana cost and cooldown.
    #[must_use]
    pub fn with_cost(mut self, mana: f32, cooldown_ms: f32) -> Self {
        self.mana_cost = mana;
        self.cooldown_ms = cooldown_ms;
        self
    }

    /// Set damage.
    #[must_use]
    pub fn with_damage(mut self, damage: f32) -> Self {
        self.damage = damage;
        self
    }

    /// Set presentation color.
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Attach a status effect.
    #[must_use]
    pub fn with_effect(mut self, effect: StatusEffect) -> Self {
        self.effect = Some(effect);
        self
    }

    /// Check if off cooldown.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.current_cooldown_ms <= 0.0
    }

    /// Start the full cooldown.
    pub fn start_cooldown(&mut self) {
        self.current_cooldown_ms = self.cooldown_ms.max(0.0);
    }

    /// Count the cooldown down, never below zero.
    pub fn tick_cooldown(&mut self, dt_ms: f32) {
        self.current_cooldown_ms = (self.current_cooldown_ms - dt_ms).max(0.0);
    }

    /// Kind of the attached effect, if any.
    #[must_use]
    pub fn effect_kind(&self) -> Option<StatusKind> {
        self.effect.as_ref().map(|e| e.kind)
    }
}

// ============================================================================
// Templates
// ============================================================================

/// Fighting style. Decides auto-attack behaviour and AI spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterStyle {
    /// Ranged caster
    Mage,
    /// Melee bruiser
    Warrior,
    /// Ranged marksman
    Ranger,
    /// Melee skirmisher
    Assassin,
}

impl CharacterStyle {
    /// Auto-attacks fire basic projectiles.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::Mage | Self::Ranger)
    }

    /// Auto-attacks hit instantly and the AI closes distance.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        !self.is_ranged()
    }
}

/// Static description of a fighter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    /// Unique id
    pub id: String,
    /// Display name
    pub name: String,
    /// Fighting style
    pub style: CharacterStyle,
    /// Presentation color
    pub color: String,
    /// Starting stats
    pub stats: StatBlock,
    /// Abilities in slot order
    pub abilities: Vec<Ability>,
}

impl CharacterTemplate {
    /// Look up an ability by key.
    #[must_use]
    pub fn ability(&self, key: AbilityKey) -> Option<&Ability> {
        self.abilities.iter().find(|a| a.key == key)
    }

    /// Look up an ability by key, mutably.
    pub fn ability_mut(&mut self, key: AbilityKey) -> Option<&mut Ability> {
        self.abilities.iter_mut().find(|a| a.key == key)
    }

    /// Count every cooldown down.
    pub fn tick_cooldowns(&mut self, dt_ms: f32) {
        for ability in &mut self.abilities {
            ability.tick_cooldown(dt_ms);
        }
    }
}

// ============================================================================
// Roster
// ============================================================================

/// Set of selectable characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    /// Characters in display order
    pub characters: Vec<CharacterTemplate>,
}

impl Default for Roster {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Roster {
    /// Parse a roster from RON.
    pub fn from_ron(source: &str) -> Result<Self, DataError> {
        ron::from_str(source).map_err(|e| DataError::Parse {
            what: "roster",
            reason: e.to_string(),
        })
    }

    /// Serialize the roster to pretty RON.
    pub fn to_ron(&self) -> Result<String, DataError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()).map_err(|e| {
            DataError::Parse {
                what: "roster",
                reason: e.to_string(),
            }
        })
    }

    /// Look up a character by id.
    pub fn get(&self, id: &str) -> Result<&CharacterTemplate, DataError> {
        self.characters
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| DataError::UnknownId {
                what: "character",
                id: id.to_string(),
            })
    }

    /// The four built-in characters.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            characters: vec![ignis(), kratos(), lyra(), vesper()],
        }
    }
}

fn ignis() -> CharacterTemplate {
    CharacterTemplate {
        id: "ignis".into(),
        name: "Ignis".into(),
        style: CharacterStyle::Mage,
        color: "#ff6b35".into(),
        stats: StatBlock::new()
            .with_hp(500.0)
            .with_mana(200.0, 8.0)
            .with_move_speed(260.0)
            .with_attack(18.0, 450.0, 1.0),
        abilities: vec![
            Ability::new(
                AbilityKey::A,
                "Fireball",
                AbilityKind::Projectile {
                    range: 900.0,
                    speed: 1400.0,
                    radius: 12.0,
                },
            )
            .with_cost(20.0, 1500.0)
            .with_damage(80.0)
            .with_color("#ff6b35")
            .with_effect(StatusEffect::new(StatusKind::Burn, 2000.0).with_value(10.0)),
            Ability::new(AbilityKey::S, "Frost Nova", AbilityKind::Area { radius: 160.0 })
                .with_cost(40.0, 6000.0)
                .with_damage(40.0)
                .with_color("#7dd3fc")
                .with_effect(StatusEffect::new(StatusKind::Slow, 2000.0).with_value(0.4)),
            Ability::new(AbilityKey::D, "Blink", AbilityKind::Dash { range: 300.0 })
                .with_cost(30.0, 5000.0)
                .with_color("#c084fc"),
            Ability::new(
                AbilityKey::F,
                "Meteor",
                AbilityKind::DelayedZone {
                    radius: 140.0,
                    delay_ms: 800.0,
                },
            )
            .with_cost(80.0, 15_000.0)
            .with_damage(200.0)
            .with_color("#f97316")
            .with_effect(StatusEffect::new(StatusKind::Stun, 1000.0)),
        ],
    }
}

fn kratos() -> CharacterTemplate {
    CharacterTemplate {
        id: "kratos".into(),
        name: "Kratos".into(),
        style: CharacterStyle::Warrior,
        color: "#facc15".into(),
        stats: StatBlock::new()
            .with_hp(800.0)
            .with_mana(120.0, 5.0)
            .with_move_speed(280.0)
            .with_attack(35.0, 80.0, 1.2),
        abilities: vec![
            Ability::new(AbilityKey::A, "Cleave", AbilityKind::Area { radius: 110.0 })
                .with_cost(15.0, 2500.0)
                .with_damage(60.0)
                .with_color("#facc15"),
            Ability::new(AbilityKey::S, "Bulwark", AbilityKind::SelfBuff)
                .with_cost(40.0, 10_000.0)
                .with_color("#ffd700")
                .with_effect(StatusEffect::new(StatusKind::Shield, 4000.0).with_value(150.0)),
            Ability::new(AbilityKey::D, "Charge", AbilityKind::Dash { range: 350.0 })
                .with_cost(25.0, 6000.0)
                .with_color("#fde68a"),
            Ability::new(AbilityKey::F, "Earthshatter", AbilityKind::Area { radius: 220.0 })
                .with_cost(70.0, 14_000.0)
                .with_damage(150.0)
                .with_color("#a16207")
                .with_effect(StatusEffect::new(StatusKind::Stun, 1500.0)),
        ],
    }
}

fn lyra() -> CharacterTemplate {
    CharacterTemplate {
        id: "lyra".into(),
        name: "Lyra".into(),
        style: CharacterStyle::Ranger,
        color: "#34d399".into(),
        stats: StatBlock::new()
            .with_hp(550.0)
            .with_mana(160.0, 7.0)
            .with_move_speed(300.0)
            .with_attack(22.0, 550.0, 1.5),
        abilities: vec![
            Ability::new(
                AbilityKey::A,
                "Piercing Arrow",
                AbilityKind::Projectile {
                    range: 1100.0,
                    speed: 1800.0,
                    radius: 10.0,
                },
            )
            .with_cost(15.0, 1200.0)
            .with_damage(70.0)
            .with_color("#34d399"),
            Ability::new(AbilityKey::S, "Crystal Ward", AbilityKind::SelfBuff)
                .with_cost(35.0, 9000.0)
                .with_color("#a5f3fc")
                .with_effect(StatusEffect::new(StatusKind::Shield, 3000.0).with_value(100.0)),
            Ability::new(
                AbilityKey::D,
                "Frost Trap",
                AbilityKind::DelayedZone {
                    radius: 120.0,
                    delay_ms: 800.0,
                },
            )
            .with_cost(25.0, 7000.0)
            .with_damage(50.0)
            .with_color("#38bdf8")
            .with_effect(StatusEffect::new(StatusKind::Slow, 3000.0).with_value(0.5)),
            Ability::new(
                AbilityKey::F,
                "Storm Volley",
                AbilityKind::Projectile {
                    range: 1200.0,
                    speed: 1600.0,
                    radius: 20.0,
                },
            )
            .with_cost(70.0, 14_000.0)
            .with_damage(180.0)
            .with_color("#22d3ee")
            .with_effect(StatusEffect::new(StatusKind::Stun, 1000.0)),
        ],
    }
}

fn vesper() -> CharacterTemplate {
    CharacterTemplate {
        id: "vesper".into(),
        name: "Vesper".into(),
        style: CharacterStyle::Assassin,
        color: "#8b5cf6".into(),
        stats: StatBlock::new()
            .with_hp(600.0)
            .with_mana(140.0, 6.0)
            .with_move_speed(340.0)
            .with_attack(30.0, 90.0, 1.6),
        abilities: vec![
            Ability::new(
                AbilityKey::A,
                "Void Bolt",
                AbilityKind::Projectile {
                    range: 800.0,
                    speed: 1500.0,
                    radius: 12.0,
                },
            )
            .with_cost(15.0, 1800.0)
            .with_damage(60.0)
            .with_color("#8b5cf6"),
            Ability::new(AbilityKey::S, "Shadow Step", AbilityKind::Dash { range: 400.0 })
                .with_cost(20.0, 4000.0)
                .with_color("#4c1d95"),
            Ability::new(AbilityKey::D, "Haste", AbilityKind::SelfBuff)
                .with_cost(25.0, 8000.0)
                .with_color("#e879f9")
                .with_effect(StatusEffect::new(StatusKind::Speed, 3000.0).with_value(150.0)),
            Ability::new(
                AbilityKey::F,
                "Void Rift",
                AbilityKind::DelayedZone {
                    radius: 150.0,
                    delay_ms: 800.0,
                },
            )
            .with_cost(75.0, 15_000.0)
            .with_damage(220.0)
            .with_color("#6d28d9")
            .with_effect(StatusEffect::new(StatusKind::Stun, 1200.0)),
        ],
    }
}
