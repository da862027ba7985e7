//! World snapshots.
//!
//! A snapshot is self-contained: applying the newest one fully describes the
//! authoritative state, so a dropped snapshot is simply superseded.

use arena_common::{AbilityKey, Side, Vec2};
use arena_sim::{EffectEvent, Entity, MoveState, Projectile, StatBlock, StatusSet, World, Zone};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Remaining cooldown of one ability slot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CooldownState {
    /// Ability slot
    pub key: AbilityKey,
    /// Remaining cooldown in milliseconds
    pub remaining_ms: f32,
}

/// Full state of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityState {
    /// Side, from the sender's perspective
    pub side: Side,
    /// Character template id
    pub template_id: String,
    /// Position
    pub position: Vec2,
    /// Movement target
    pub target: Vec2,
    /// Facing in radians
    pub angle: f32,
    /// Collision radius
    pub radius: f32,
    /// Stats
    pub stats: StatBlock,
    /// Active status effects
    pub statuses: StatusSet,
    /// Milliseconds until the next auto-attack
    pub attack_timer_ms: f32,
    /// Movement state
    pub move_state: MoveState,
    /// Per-slot remaining cooldowns
    pub cooldowns: Vec<CooldownState>,
}

impl EntityState {
    /// Capture an entity.
    #[must_use]
    pub fn capture(entity: &Entity) -> Self {
        Self {
            side: entity.side,
            template_id: entity.template.id.clone(),
            position: entity.position,
            target: entity.target,
            angle: entity.angle,
            radius: entity.radius,
            stats: entity.stats.clone(),
            statuses: entity.statuses.clone(),
            attack_timer_ms: entity.attack_timer_ms,
            move_state: entity.move_state,
            cooldowns: entity
                .template
                .abilities
                .iter()
                .map(|a| CooldownState {
                    key: a.key,
                    remaining_ms: a.current_cooldown_ms,
                })
                .collect(),
        }
    }

    /// Overwrite the authoritative combat state: stats, effects, cooldowns
    /// and the attack timer. Position is left alone.
    pub fn apply_combat_state(&self, entity: &mut Entity) {
        if entity.template.id != self.template_id {
            debug!(
                expected = %entity.template.id,
                received = %self.template_id,
                "Snapshot template mismatch"
            );
        }
        entity.stats = self.stats.clone();
        entity.statuses = self.statuses.clone();
        entity.attack_timer_ms = self.attack_timer_ms;
        for cooldown in &self.cooldowns {
            if let Some(ability) = entity.template.ability_mut(cooldown.key) {
                ability.current_cooldown_ms = cooldown.remaining_ms.max(0.0);
            }
        }
    }

    /// Overwrite everything.
    pub fn apply_to(&self, entity: &mut Entity) {
        self.apply_combat_state(entity);
        entity.position = self.position;
        entity.target = self.target;
        entity.angle = self.angle;
        entity.radius = self.radius;
        entity.move_state = self.move_state;
    }
}

/// Authoritative world state sent from host to guest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Host tick the snapshot was taken at
    pub tick: u64,
    /// Both combatants, indexed by side
    pub entities: [EntityState; 2],
    /// Projectiles in flight
    pub projectiles: Vec<Projectile>,
    /// Pending zones
    pub zones: Vec<Zone>,
    /// Effects emitted since the previous snapshot
    pub vfx_events: Vec<EffectEvent>,
    /// Remaining countdown in milliseconds
    pub countdown: f32,
}

impl Snapshot {
    /// Capture `world` together with the effects it emitted since the last
    /// snapshot.
    #[must_use]
    pub fn capture(world: &World, vfx_events: Vec<EffectEvent>) -> Self {
        Self {
            tick: world.tick(),
            entities: [
                EntityState::capture(world.entity(Side::Local)),
                EntityState::capture(world.entity(Side::Remote)),
            ],
            projectiles: world.projectiles().to_vec(),
            zones: world.zones().to_vec(),
            vfx_events,
            countdown: world.countdown_ms(),
        }
    }

    /// State of the combatant on `side`.
    #[must_use]
    pub fn entity(&self, side: Side) -> &EntityState {
        &self.entities[side.index()]
    }

    /// The same snapshot seen from the other peer: sides swapped.
    #[must_use]
    pub fn flipped(mut self) -> Self {
        self.entities.swap(0, 1);
        for entity in &mut self.entities {
            entity.side = entity.side.opponent();
        }
        for projectile in &mut self.projectiles {
            projectile.owner = projectile.owner.opponent();
        }
        for zone in &mut self.zones {
            zone.owner = zone.owner.opponent();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_sim::{ArenaLayout, Roster, SimConfig};

    fn world() -> World {
        let roster = Roster::builtin();
        let mut world = World::new(
            SimConfig::default(),
            ArenaLayout::open(),
            roster.get("ignis").expect("ignis"),
            roster.get("kratos").expect("kratos"),
        );
        world.skip_countdown();
        world
    }

    #[test]
    fn test_capture_records_cooldowns() {
        let mut world = world();
        world
            .cast(Side::Local, AbilityKey::A, Vec2::new(600.0, 400.0))
            .expect("fireball");

        let snapshot = Snapshot::capture(&world, world.pending_effects().to_vec());

        let local = snapshot.entity(Side::Local);
        assert_eq!(local.template_id, "ignis");
        assert_eq!(local.cooldowns[0].key, AbilityKey::A);
        assert_eq!(local.cooldowns[0].remaining_ms, 1500.0);
        assert_eq!(snapshot.projectiles.len(), 1);
        assert_eq!(snapshot.countdown, 0.0);
    }

    #[test]
    fn test_flip_swaps_perspective() {
        let mut world = world();
        world
            .cast(Side::Local, AbilityKey::A, Vec2::new(600.0, 400.0))
            .expect("fireball");
        let snapshot = Snapshot::capture(&world, Vec::new());

        let flipped = snapshot.clone().flipped();

        assert_eq!(flipped.entity(Side::Remote).template_id, "ignis");
        assert_eq!(flipped.entity(Side::Remote).side, Side::Remote);
        assert_eq!(flipped.entity(Side::Local).template_id, "kratos");
        assert_eq!(flipped.projectiles[0].owner, Side::Remote);
        assert_eq!(flipped.flipped(), snapshot);
    }

    #[test]
    fn test_apply_combat_state_keeps_position() {
        let source = world();
        let mut state = EntityState::capture(source.entity(Side::Local));
        state.stats.hp = 123.0;
        state.position = Vec2::new(999.0, 999.0);
        state.cooldowns[1].remaining_ms = 4000.0;

        let mut target = world();
        let entity = target.entity_mut(Side::Local);
        let before = entity.position;
        state.apply_combat_state(entity);

        assert_eq!(entity.stats.hp, 123.0);
        assert_eq!(entity.position, before);
        assert_eq!(entity.template.abilities[1].current_cooldown_ms, 4000.0);

        state.apply_to(entity);
        assert_eq!(entity.position, Vec2::new(999.0, 999.0));
    }

    #[test]
    fn test_wire_field_names() {
        let snapshot = Snapshot::capture(&world(), Vec::new());
        let json = serde_json::to_value(&snapshot).expect("serialize");

        assert!(json.get("vfxEvents").is_some());
        assert!(json.get("countdown").is_some());
        let entity = &json["entities"][0];
        assert_eq!(entity["side"], "local");
        assert_eq!(entity["templateId"], "ignis");
        assert!(entity.get("attackTimerMs").is_some());
    }
}
