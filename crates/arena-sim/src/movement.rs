//! Steering, obstacle collision and auto-attacks.

use arena_common::{ObjectIdAllocator, Vec2};

use crate::arena::ArenaLayout;
use crate::config::SimConfig;
use crate::effects::EffectSink;
use crate::entity::{Entity, MoveState};
use crate::projectile::Projectile;

/// Step an entity toward its target at its effective speed.
///
/// Each axis is tried on its own, so a blocked X step does not cancel an
/// unblocked Y step and the body slides along obstacle edges. Dead or
/// stunned entities stay put.
pub fn steer(entity: &mut Entity, arena: &ArenaLayout, config: &SimConfig, dt_ms: f32) {
    if !entity.can_act() {
        entity.move_state = MoveState::Idle;
        return;
    }

    let to_target = entity.target - entity.position;
    let distance = to_target.length();
    if distance <= config.arrival_threshold {
        entity.move_state = MoveState::Idle;
        return;
    }

    let direction = to_target / distance;
    entity.angle = direction.y.atan2(direction.x);
    let step = (entity.effective_speed() * dt_ms / 1000.0).min(distance);
    let delta = direction * step;

    let padding = config.wall_padding;
    let try_x = Vec2::new(entity.position.x + delta.x, entity.position.y);
    if !arena.is_blocked(try_x, entity.radius, padding) {
        entity.position.x = try_x.x;
    }
    let try_y = Vec2::new(entity.position.x, entity.position.y + delta.y);
    if !arena.is_blocked(try_y, entity.radius, padding) {
        entity.position.y = try_y.y;
    }
    entity.move_state = MoveState::Moving;
}

/// Fire an auto-attack from `attacker` at `defender` if one is due.
///
/// The range check is omnidirectional. Ranged styles spawn a basic
/// projectile, melee styles deal damage directly. Returns whether an attack
/// fired.
pub fn auto_attack(
    attacker: &mut Entity,
    defender: &mut Entity,
    projectiles: &mut Vec<Projectile>,
    ids: &mut ObjectIdAllocator,
    config: &SimConfig,
    sink: &mut impl EffectSink,
) -> bool {
    if !attacker.can_act() || !defender.is_alive() || attacker.attack_timer_ms > 0.0 {
        return false;
    }
    let offset = defender.position - attacker.position;
    if offset.length() >= attacker.stats.attack_range {
        return false;
    }

    if attacker.template.style.is_ranged() {
        let speed = config.basic_projectile_speed;
        projectiles.push(Projectile {
            id: ids.allocate(),
            position: attacker.position,
            velocity: offset.normalize_or_zero() * speed,
            radius: config.basic_projectile_radius,
            damage: attacker.stats.base_attack_damage,
            owner: attacker.side,
            life_secs: attacker.stats.attack_range / speed,
            effect: None,
            color: attacker.template.color.clone(),
        });
    } else {
        defender.apply_damage(attacker.stats.base_attack_damage, sink);
    }
    attacker.attack_timer_ms = attacker.stats.attack_interval_ms();
    true
}

/// Count the attack timer down. Runs whether or not the entity is stunned.
pub fn tick_attack_timer(entity: &mut Entity, dt_ms: f32) {
    entity.attack_timer_ms = (entity.attack_timer_ms - dt_ms).max(0.0);
}
