//! The simulation world.
//!
//! A [`World`] is owned by exactly one driver (solo match, host session or
//! guest session). Intents are applied between steps, never during one.

use arena_common::{AbilityKey, ObjectIdAllocator, Side, Vec2};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};

use crate::ability::{self, CastRejection};
use crate::arena::ArenaLayout;
use crate::config::SimConfig;
use crate::effects::{EffectEvent, EffectKind, EffectSink};
use crate::entity::Entity;
use crate::movement;
use crate::projectile::{self, Projectile, Zone};
use crate::template::CharacterTemplate;

/// A command from a player or the AI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Intent {
    /// Walk toward a point
    Move {
        /// Destination
        target: Vec2,
    },
    /// Cast an ability aimed at a point
    Cast {
        /// Ability slot
        key: AbilityKey,
        /// Aim point
        target: Vec2,
    },
}

/// Phase of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchPhase {
    /// Pre-battle countdown
    Countdown,
    /// Combat running
    Battle,
    /// A side has won
    Over {
        /// Winning side
        winner: Side,
    },
}

/// Complete state of one match.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) config: SimConfig,
    pub(crate) arena: ArenaLayout,
    pub(crate) entities: [Entity; 2],
    pub(crate) projectiles: Vec<Projectile>,
    pub(crate) zones: Vec<Zone>,
    pub(crate) effects: Vec<EffectEvent>,
    pub(crate) ids: ObjectIdAllocator,
    countdown_ms: f32,
    tick: u64,
    winner: Option<Side>,
}

impl World {
    /// Set up a match: both combatants at their spawn points, countdown
    /// running.
    #[must_use]
    pub fn new(
        config: SimConfig,
        arena: ArenaLayout,
        local: &CharacterTemplate,
        remote: &CharacterTemplate,
    ) -> Self {
        let spawn = |side, template| {
            Entity::spawn(
                side,
                template,
                arena.spawn_point(side, config.spawn_inset),
                config.entity_radius,
            )
        };
        let entities = [spawn(Side::Local, local), spawn(Side::Remote, remote)];
        info!(
            local = %local.id,
            remote = %remote.id,
            arena = %arena.id,
            "Match created"
        );
        Self {
            countdown_ms: config.countdown_ms,
            config,
            arena,
            entities,
            projectiles: Vec::new(),
            zones: Vec::new(),
            effects: Vec::new(),
            ids: ObjectIdAllocator::new(),
            tick: 0,
            winner: None,
        }
    }

    // === Accessors ===

    /// Simulation tunables.
    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Arena layout.
    #[must_use]
    pub fn arena(&self) -> &ArenaLayout {
        &self.arena
    }

    /// Combatant on a side.
    #[must_use]
    pub fn entity(&self, side: Side) -> &Entity {
        &self.entities[side.index()]
    }

    /// Combatant on a side, mutably.
    pub fn entity_mut(&mut self, side: Side) -> &mut Entity {
        &mut self.entities[side.index()]
    }

    /// Projectiles in flight.
    #[must_use]
    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    /// Zones waiting to detonate.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Effects emitted since the last drain.
    #[must_use]
    pub fn pending_effects(&self) -> &[EffectEvent] {
        &self.effects
    }

    /// Remaining countdown in milliseconds.
    #[must_use]
    pub fn countdown_ms(&self) -> f32 {
        self.countdown_ms
    }

    /// Number of steps taken.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Winner, once decided.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> MatchPhase {
        match self.winner {
            Some(winner) => MatchPhase::Over { winner },
            None if self.countdown_ms > 0.0 => MatchPhase::Countdown,
            None => MatchPhase::Battle,
        }
    }

    /// Countdown elapsed and no winner yet.
    #[must_use]
    pub fn in_battle(&self) -> bool {
        self.phase() == MatchPhase::Battle
    }

    /// A winner has been decided.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    // === Replacement (used by mirrors of a remote world) ===

    /// Replace all projectiles.
    pub fn replace_projectiles(&mut self, projectiles: Vec<Projectile>) {
        self.projectiles = projectiles;
    }

    /// Replace all zones.
    pub fn replace_zones(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
    }

    /// Overwrite the countdown.
    pub fn set_countdown_ms(&mut self, countdown_ms: f32) {
        self.countdown_ms = countdown_ms.max(0.0);
    }

    /// Overwrite the tick counter.
    pub fn set_tick(&mut self, tick: u64) {
        self.tick = tick;
    }

    /// End the match with a known winner.
    pub fn declare_winner(&mut self, winner: Side) {
        if self.winner.is_none() {
            info!(winner = %winner, tick = self.tick, "Match over");
            self.winner = Some(winner);
        }
    }

    /// Skip the pre-battle countdown.
    pub fn skip_countdown(&mut self) {
        self.countdown_ms = 0.0;
    }

    // === Commands ===

    /// Set a combatant's movement target. Dropped once the match is over or
    /// the combatant is dead.
    pub fn set_move_target(&mut self, side: Side, target: Vec2) -> bool {
        if self.is_over() || !self.entity(side).is_alive() {
            trace!(side = %side, "Move dropped");
            return false;
        }
        let entity = &mut self.entities[side.index()];
        entity.target = target;
        let color = entity.template.color.clone();
        self.effects
            .emit(EffectEvent::new(EffectKind::MoveMarker, target, color, 10.0, 250.0));
        true
    }

    /// Apply one intent. Returns whether it took effect.
    pub fn apply_intent(&mut self, side: Side, intent: &Intent) -> bool {
        match *intent {
            Intent::Move { target } => self.set_move_target(side, target),
            Intent::Cast { key, target } => match self.cast(side, key, target) {
                Ok(()) => true,
                Err(reason) => {
                    trace!(side = %side, ?key, %reason, "Cast dropped");
                    false
                },
            },
        }
    }

    /// Cast an ability. See [`ability::cast`].
    pub fn cast(&mut self, side: Side, key: AbilityKey, target: Vec2) -> Result<(), CastRejection> {
        ability::cast(self, side, key, target)
    }

    // === Simulation ===

    /// Advance the world by one fixed step of `dt_ms`.
    ///
    /// Returns the winner if the match ended during this step.
    pub fn step(&mut self, dt_ms: f32) -> Option<Side> {
        if self.is_over() {
            return None;
        }
        self.tick += 1;

        if self.countdown_ms > 0.0 {
            self.countdown_ms = (self.countdown_ms - dt_ms).max(0.0);
            return None;
        }

        // Movement and auto-attacks.
        for side in Side::BOTH {
            let (me, other) = split_pair(&mut self.entities, side);
            movement::steer(me, &self.arena, &self.config, dt_ms);
            movement::auto_attack(
                me,
                other,
                &mut self.projectiles,
                &mut self.ids,
                &self.config,
                &mut self.effects,
            );
            movement::tick_attack_timer(me, dt_ms);
        }

        // Projectiles and zones.
        projectile::step_projectiles(
            &mut self.projectiles,
            &mut self.entities,
            &self.arena,
            self.config.wall_padding,
            dt_ms,
            &mut self.effects,
        );
        projectile::step_zones(&mut self.zones, &mut self.entities, dt_ms, &mut self.effects);

        // Status effects, cooldowns, regeneration.
        for entity in &mut self.entities {
            entity.tick_timers(dt_ms);
        }

        self.check_winner()
    }

    /// Steer one combatant without any combat resolution.
    ///
    /// Used for client-side prediction: same steering and collision rule as
    /// [`World::step`], nothing else.
    pub fn predict_movement(&mut self, side: Side, dt_ms: f32) {
        if self.is_over() || self.countdown_ms > 0.0 {
            return;
        }
        let entity = &mut self.entities[side.index()];
        movement::steer(entity, &self.arena, &self.config, dt_ms);
    }

    /// Take the effects emitted since the last drain.
    pub fn drain_effects(&mut self) -> Vec<EffectEvent> {
        std::mem::take(&mut self.effects)
    }

    /// Forward pending effects to a sink.
    pub fn flush_effects(&mut self, sink: &mut dyn EffectSink) {
        for event in self.effects.drain(..) {
            sink.emit(event);
        }
    }

    fn check_winner(&mut self) -> Option<Side> {
        // Local is checked first, so a double knockout goes to Remote.
        let winner = if !self.entity(Side::Local).is_alive() {
            Side::Remote
        } else if !self.entity(Side::Remote).is_alive() {
            Side::Local
        } else {
            return None;
        };
        self.declare_winner(winner);
        Some(winner)
    }
}

/// Split the pair into `(side, side.opponent())`.
pub(crate) fn split_pair(entities: &mut [Entity; 2], side: Side) -> (&mut Entity, &mut Entity) {
    let [local, remote] = entities;
    match side {
        Side::Local => (local, remote),
        Side::Remote => (remote, local),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::Roster;

    const DT: f32 = 1000.0 / 60.0;

    fn world(local: &str, remote: &str) -> World {
        let roster = Roster::builtin();
        World::new(
            SimConfig::default(),
            ArenaLayout::open(),
            roster.get(local).expect("local"),
            roster.get(remote).expect("remote"),
        )
    }

    #[test]
    fn test_spawn_positions() {
        let world = world("ignis", "kratos");
        assert_eq!(world.entity(Side::Local).position, Vec2::new(150.0, 400.0));
        assert_eq!(world.entity(Side::Remote).position, Vec2::new(1050.0, 400.0));
        assert_eq!(world.phase(), MatchPhase::Countdown);
    }

    #[test]
    fn test_countdown_freezes_combat() {
        let mut world = world("vesper", "kratos");
        world.set_move_target(Side::Local, Vec2::new(600.0, 400.0));
        let start = world.entity(Side::Local).position;

        let mut steps = 0;
        while world.countdown_ms() > 0.0 {
            world.step(100.0);
            steps += 1;
            assert_eq!(world.entity(Side::Local).position, start);
        }
        assert_eq!(steps, 12);
        assert!(world.in_battle());

        world.step(DT);
        assert!(world.entity(Side::Local).position.x > start.x);
    }

    #[test]
    fn test_move_intent_emits_marker() {
        let mut world = world("vesper", "kratos");
        assert!(world.apply_intent(Side::Local, &Intent::Move { target: Vec2::new(300.0, 300.0) }));
        let effects = world.drain_effects();
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].kind, EffectKind::MoveMarker);
        assert!(world.pending_effects().is_empty());
    }

    #[test]
    fn test_winner_detected_once() {
        let mut world = world("vesper", "kratos");
        world.skip_countdown();
        world.entity_mut(Side::Remote).stats.hp = 0.0;

        assert_eq!(world.step(DT), Some(Side::Local));
        assert_eq!(world.phase(), MatchPhase::Over { winner: Side::Local });
        assert_eq!(world.step(DT), None);
        assert!(!world.set_move_target(Side::Local, Vec2::ZERO));
    }

    #[test]
    fn test_double_knockout_goes_to_remote() {
        let mut world = world("vesper", "kratos");
        world.skip_countdown();
        world.entity_mut(Side::Local).stats.hp = 0.0;
        world.entity_mut(Side::Remote).stats.hp = 0.0;
        assert_eq!(world.step(DT), Some(Side::Remote));
    }

    #[test]
    fn test_melee_duel_reaches_a_winner() {
        let mut world = world("kratos", "vesper");
        world.skip_countdown();
        world.set_move_target(Side::Local, Vec2::new(600.0, 400.0));
        world.set_move_target(Side::Remote, Vec2::new(600.0, 400.0));

        let mut winner = None;
        for _ in 0..60 * 120 {
            if let Some(w) = world.step(DT) {
                winner = Some(w);
                break;
            }
        }
        assert!(winner.is_some());
        let loser = world.entity(winner.map_or(Side::Local, Side::opponent));
        assert_eq!(loser.stats.hp, 0.0);
    }

    #[test]
    fn test_intent_wire_shape() {
        let intent = Intent::Cast {
            key: AbilityKey::D,
            target: Vec2::new(1.0, 2.0),
        };
        let json = serde_json::to_string(&intent).expect("serialize");
        assert_eq!(json, r#"{"action":"cast","key":"d","target":[1.0,2.0]}"#);
    }
}
