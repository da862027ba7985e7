//! AI opponent controller.
//!
//! A reactive state machine evaluated on a throttled cadence. It reads the
//! world and returns [`Intent`]s; the driver applies them like any other
//! player input.

use arena_common::{direction_from_angle, AbilityKey, Side, Vec2};
use tracing::trace;

use crate::config::AiConfig;
use crate::entity::Entity;
use crate::projectile::Projectile;
use crate::status::StatusKind;
use crate::template::Ability;
use crate::world::{Intent, World};

// ============================================================================
// Posture
// ============================================================================

/// Own health ratio below which the AI panics.
pub const PANIC_BELOW: f32 = 0.2;
/// Opponent health ratio below which the AI turns aggressive.
pub const FINISH_BELOW: f32 = 0.3;
/// Own health ratio below which the AI plays defensively.
pub const DEFENSIVE_BELOW: f32 = 0.5;
/// Own health ratio below which the AI shields even without a threat.
pub const SHIELD_BELOW: f32 = 0.4;

/// Tactical stance derived from health ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Posture {
    /// Low health, run
    Panic,
    /// Press the advantage
    Aggressive,
    /// Keep distance
    Defensive,
    /// Hold the preferred range
    #[default]
    Neutral,
}

impl Posture {
    /// Classify from own and opponent health ratios.
    #[must_use]
    pub fn classify(own: f32, opponent: f32) -> Self {
        if own < PANIC_BELOW {
            Self::Panic
        } else if opponent < FINISH_BELOW || (own > 0.7 && opponent < 0.6) {
            Self::Aggressive
        } else if own < DEFENSIVE_BELOW {
            Self::Defensive
        } else {
            Self::Neutral
        }
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Drives one side of a match.
#[derive(Debug, Clone)]
pub struct AiController {
    side: Side,
    config: AiConfig,
    rng: fastrand::Rng,
    /// Active ticks seen so far
    tick: u64,
    /// Decisions left before strategic movement resumes after a dodge
    dodge_hold: u32,
    posture: Posture,
}

impl AiController {
    /// Create a controller for `side`.
    #[must_use]
    pub fn new(side: Side, config: AiConfig) -> Self {
        Self {
            side,
            rng: fastrand::Rng::with_seed(config.seed),
            config,
            tick: 0,
            dodge_hold: 0,
            posture: Posture::Neutral,
        }
    }

    /// Side this controller drives.
    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Posture from the last decision.
    #[must_use]
    pub fn posture(&self) -> Posture {
        self.posture
    }

    /// Decide what to do this tick.
    ///
    /// Returns nothing during the countdown, after the match, or while the
    /// controlled combatant is dead or stunned.
    pub fn think(&mut self, world: &World) -> Vec<Intent> {
        let me = world.entity(self.side);
        let foe = world.entity(self.side.opponent());
        if !world.in_battle() || !me.can_act() {
            return Vec::new();
        }

        self.tick += 1;
        if self.tick % u64::from(self.config.decision_every.max(1)) != 0 {
            return Vec::new();
        }

        let mut intents = Vec::new();
        self.posture = Posture::classify(me.stats.hp_ratio(), foe.stats.hp_ratio());
        let threat = self.find_threat(me, world.projectiles());

        if let Some(projectile) = threat {
            intents.push(Intent::Move {
                target: self.dodge_target(me, projectile),
            });
            self.dodge_hold = self.config.dodge_hold_ticks;
        } else if self.dodge_hold > 0 {
            self.dodge_hold -= 1;
        } else if self.tick % u64::from(self.config.movement_every.max(1)) == 0 {
            if let Some(target) = self.strategic_target(me, foe) {
                intents.push(Intent::Move { target });
            }
        }

        if self.tick % u64::from(self.config.ability_every.max(1)) == 0 {
            self.choose_casts(me, foe, threat.is_some(), &mut intents);
        }

        if !intents.is_empty() {
            trace!(side = %self.side, posture = ?self.posture, count = intents.len(), "AI intents");
        }
        intents
    }

    /// Nearest hostile projectile inside the threat radius moving toward `me`.
    fn find_threat<'w>(&self, me: &Entity, projectiles: &'w [Projectile]) -> Option<&'w Projectile> {
        projectiles
            .iter()
            .filter(|p| {
                p.owner != self.side
                    && p.position.distance(me.position) <= self.config.threat_radius
                    && p.velocity.dot(me.position - p.position) > 0.0
            })
            .min_by(|a, b| {
                let da = a.position.distance_squared(me.position);
                let db = b.position.distance_squared(me.position);
                da.total_cmp(&db)
            })
    }

    /// Sidestep perpendicular to the projectile's path, away from its line.
    fn dodge_target(&self, me: &Entity, projectile: &Projectile) -> Vec2 {
        let perp = Vec2::new(-projectile.velocity.y, projectile.velocity.x).normalize_or_zero();
        let offset = me.position - projectile.position;
        let away = if offset.dot(perp) >= 0.0 { perp } else { -perp };
        me.position + away * self.config.dodge_distance
    }

    fn strategic_target(&mut self, me: &Entity, foe: &Entity) -> Option<Vec2> {
        let away = me.position - foe.position;
        let away_angle = away.y.atan2(away.x);
        let distance = away.length();
        let melee = me.template.style.is_melee();

        match self.posture {
            Posture::Aggressive => Some(foe.position),
            Posture::Defensive | Posture::Neutral if melee => Some(foe.position),
            Posture::Panic | Posture::Defensive => {
                let jitter = (self.rng.f32() - 0.5) * self.config.retreat_jitter;
                Some(me.position + direction_from_angle(away_angle + jitter) * self.config.retreat_distance)
            },
            Posture::Neutral => {
                let preferred = self.config.preferred_range;
                let tolerance = self.config.range_tolerance;
                if distance < preferred - tolerance {
                    Some(me.position + direction_from_angle(away_angle) * self.config.back_off_distance)
                } else if distance > preferred + tolerance {
                    Some(foe.position)
                } else {
                    None
                }
            },
        }
    }

    /// Ability priorities: shield, crowd control, ultimate, poke.
    fn choose_casts(&self, me: &Entity, foe: &Entity, threatened: bool, intents: &mut Vec<Intent>) {
        let distance = me.position.distance(foe.position);
        let foe_stunned = foe.is_stunned();
        let mut mana = me.stats.mana;
        let mut used: Vec<AbilityKey> = Vec::new();

        let mut pick = |filter: &dyn Fn(&Ability) -> bool, mana: &mut f32| -> Option<Ability> {
            let found = me.template.abilities.iter().find(|a| {
                a.is_ready() && *mana >= a.mana_cost && !used.contains(&a.key) && filter(a)
            })?;
            *mana -= found.mana_cost;
            used.push(found.key);
            Some(found.clone())
        };

        if threatened || me.stats.hp_ratio() < SHIELD_BELOW {
            if let Some(shield) = pick(&|a: &Ability| a.effect_kind() == Some(StatusKind::Shield), &mut mana) {
                intents.push(Intent::Cast {
                    key: shield.key,
                    target: me.position,
                });
            }
        }

        if !foe_stunned {
            let is_cc = |a: &Ability| {
                matches!(a.effect_kind(), Some(StatusKind::Stun | StatusKind::Slow))
                    && distance < a.kind.range().unwrap_or(self.config.default_cc_range)
            };
            if let Some(cc) = pick(&is_cc, &mut mana) {
                intents.push(Intent::Cast {
                    key: cc.key,
                    target: foe.position,
                });
            }
        }

        if foe.stats.hp_ratio() < FINISH_BELOW || foe_stunned {
            if let Some(ult) = pick(&|a: &Ability| a.key == AbilityKey::F, &mut mana) {
                intents.push(Intent::Cast {
                    key: ult.key,
                    target: foe.position,
                });
            }
        }

        let is_poke = |a: &Ability| {
            matches!(a.key, AbilityKey::A | AbilityKey::D)
                && distance < a.kind.range().unwrap_or(self.config.default_poke_range)
        };
        if let Some(poke) = pick(&is_poke, &mut mana) {
            let lead = foe.position + (foe.target - foe.position) * self.config.lead_factor;
            intents.push(Intent::Cast {
                key: poke.key,
                target: lead,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::ArenaLayout;
    use crate::config::SimConfig;
    use crate::status::StatusEffect;
    use crate::template::Roster;
    use arena_common::ObjectId;

    fn battle(local: &str, remote: &str) -> World {
        let roster = Roster::builtin();
        let mut world = World::new(
            SimConfig::default(),
            ArenaLayout::open(),
            roster.get(local).expect("local"),
            roster.get(remote).expect("remote"),
        );
        world.skip_countdown();
        world
    }

    /// Run `n` thinks and collect every intent.
    fn think_n(ai: &mut AiController, world: &World, n: usize) -> Vec<Intent> {
        (0..n).flat_map(|_| ai.think(world)).collect()
    }

    fn incoming(at: Vec2, velocity: Vec2) -> Projectile {
        Projectile {
            id: ObjectId::from_raw(99),
            position: at,
            velocity,
            radius: 12.0,
            damage: 10.0,
            owner: Side::Local,
            life_secs: 1.0,
            effect: None,
            color: "#fff".into(),
        }
    }

    #[test]
    fn test_posture_thresholds() {
        assert_eq!(Posture::classify(0.1, 0.1), Posture::Panic);
        assert_eq!(Posture::classify(0.9, 0.25), Posture::Aggressive);
        assert_eq!(Posture::classify(0.8, 0.5), Posture::Aggressive);
        assert_eq!(Posture::classify(0.45, 0.9), Posture::Defensive);
        assert_eq!(Posture::classify(0.6, 0.9), Posture::Neutral);
    }

    #[test]
    fn test_idle_during_countdown_and_stun() {
        let roster = Roster::builtin();
        let mut world = World::new(
            SimConfig::default(),
            ArenaLayout::open(),
            roster.get("ignis").expect("ignis"),
            roster.get("vesper").expect("vesper"),
        );
        let mut ai = AiController::new(Side::Remote, AiConfig::default());
        assert!(think_n(&mut ai, &world, 20).is_empty());

        world.skip_countdown();
        world
            .entity_mut(Side::Remote)
            .apply_status(&StatusEffect::new(StatusKind::Stun, 1000.0));
        assert!(think_n(&mut ai, &world, 20).is_empty());
    }

    #[test]
    fn test_melee_closes_distance() {
        let world = battle("ignis", "vesper");
        let mut ai = AiController::new(Side::Remote, AiConfig::default());
        let foe = world.entity(Side::Local).position;

        let intents = think_n(&mut ai, &world, 10);

        assert!(intents.contains(&Intent::Move { target: foe }));
    }

    #[test]
    fn test_dodges_perpendicular_and_away() {
        let mut world = battle("ignis", "lyra");
        let me = world.entity(Side::Remote).position;
        // Bolt travelling right, slightly below the AI's line.
        world.replace_projectiles(vec![incoming(me + Vec2::new(-200.0, 10.0), Vec2::new(1400.0, 0.0))]);
        let mut ai = AiController::new(Side::Remote, AiConfig::default());

        let intents = think_n(&mut ai, &world, 2);

        let Some(Intent::Move { target }) = intents.first().copied() else {
            panic!("expected a dodge, got {intents:?}");
        };
        assert!((target.x - me.x).abs() < 1e-3);
        // The bolt is below, so step up.
        assert!((target.y - (me.y - 150.0)).abs() < 1e-3);
    }

    #[test]
    fn test_ignores_receding_and_own_projectiles() {
        let mut world = battle("ignis", "lyra");
        let me = world.entity(Side::Remote).position;
        let mut own = incoming(me + Vec2::new(-100.0, 0.0), Vec2::new(1000.0, 0.0));
        own.owner = Side::Remote;
        world.replace_projectiles(vec![
            incoming(me + Vec2::new(100.0, 0.0), Vec2::new(1000.0, 0.0)),
            own,
        ]);
        let mut ai = AiController::new(Side::Remote, AiConfig::default());

        let intents = think_n(&mut ai, &world, 2);

        assert!(intents.is_empty());
    }

    #[test]
    fn test_shields_when_low() {
        let mut world = battle("ignis", "kratos");
        world.entity_mut(Side::Remote).stats.hp = 250.0;
        let mut ai = AiController::new(Side::Remote, AiConfig::default());

        let intents = think_n(&mut ai, &world, 8);

        assert!(intents.iter().any(|i| matches!(i, Intent::Cast { key: AbilityKey::S, .. })));
    }

    #[test]
    fn test_ultimate_on_stunned_foe() {
        let mut world = battle("kratos", "ignis");
        world
            .entity_mut(Side::Local)
            .apply_status(&StatusEffect::new(StatusKind::Stun, 5000.0));
        let mut ai = AiController::new(Side::Remote, AiConfig::default());

        let intents = think_n(&mut ai, &world, 8);

        let foe = world.entity(Side::Local).position;
        assert!(intents.contains(&Intent::Cast {
            key: AbilityKey::F,
            target: foe,
        }));
    }

    #[test]
    fn test_poke_leads_target() {
        let mut world = battle("kratos", "lyra");
        world.entity_mut(Side::Local).position = Vec2::new(600.0, 400.0);
        world.entity_mut(Side::Local).target = Vec2::new(600.0, 100.0);
        let mut ai = AiController::new(Side::Remote, AiConfig::default());

        let intents = think_n(&mut ai, &world, 8);

        let aim = intents.iter().find_map(|i| match i {
            Intent::Cast { key: AbilityKey::A, target } => Some(*target),
            _ => None,
        });
        let aim = aim.expect("poke cast");
        assert!(aim.distance(Vec2::new(600.0, 310.0)) < 1e-3);
    }

    #[test]
    fn test_same_seed_same_decisions() {
        let mut world = battle("ignis", "lyra");
        world.entity_mut(Side::Remote).stats.hp = 50.0;
        let config = AiConfig::default().with_seed(7);
        let mut a = AiController::new(Side::Remote, config.clone());
        let mut b = AiController::new(Side::Remote, config);

        let first = think_n(&mut a, &world, 30);
        let second = think_n(&mut b, &world, 30);

        assert_eq!(a.posture(), Posture::Panic);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }
}
