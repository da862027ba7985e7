//! Ability resolution.
//!
//! [`cast`] validates a cast request and executes one of the five ability
//! archetypes. A request that fails validation changes nothing; the reason
//! comes back as a [`CastRejection`] for callers that care.

use arena_common::{angle_between, circles_overlap, direction_from_angle, AbilityKey, Side, Vec2};
use thiserror::Error;
use tracing::debug;

use crate::effects::{EffectEvent, EffectKind, EffectSink};
use crate::projectile::{Projectile, Zone};
use crate::template::AbilityKind;
use crate::world::{split_pair, World};

/// Why a cast was not executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CastRejection {
    /// Countdown still running or the match is over
    #[error("match is not in battle")]
    NotInBattle,
    /// Caster has no HP left
    #[error("caster is dead")]
    CasterDead,
    /// Caster is stunned
    #[error("caster is stunned")]
    Stunned,
    /// Caster's template has no ability on this key
    #[error("no ability bound to {0:?}")]
    UnknownAbility(AbilityKey),
    /// Ability still cooling down
    #[error("ability is on cooldown")]
    OnCooldown,
    /// Not enough mana for the cost
    #[error("not enough mana")]
    InsufficientMana,
}

/// Cast the ability bound to `key` for `side`, aimed at `target`.
pub fn cast(world: &mut World, side: Side, key: AbilityKey, target: Vec2) -> Result<(), CastRejection> {
    if !world.in_battle() {
        return Err(CastRejection::NotInBattle);
    }

    let World {
        config,
        arena,
        entities,
        projectiles,
        zones,
        effects,
        ids,
        ..
    } = world;
    let (caster, opponent) = split_pair(entities, side);

    if !caster.is_alive() {
        return Err(CastRejection::CasterDead);
    }
    if caster.is_stunned() {
        return Err(CastRejection::Stunned);
    }
    let ability = caster
        .ability(key)
        .ok_or(CastRejection::UnknownAbility(key))?
        .clone();
    if !ability.is_ready() {
        return Err(CastRejection::OnCooldown);
    }
    if !caster.stats.spend_mana(ability.mana_cost) {
        return Err(CastRejection::InsufficientMana);
    }
    if let Some(slot) = caster.template.ability_mut(key) {
        slot.start_cooldown();
    }
    debug!(side = %side, ability = %ability.name, "Cast");

    let aim = direction_from_angle(angle_between(caster.position, target));
    match ability.kind {
        AbilityKind::Projectile {
            range,
            speed,
            radius,
        } => {
            let speed = speed.max(1.0);
            projectiles.push(Projectile {
                id: ids.allocate(),
                position: caster.position + aim * (caster.radius + config.cast_offset),
                velocity: aim * speed,
                radius,
                damage: ability.damage,
                owner: side,
                life_secs: range / speed,
                effect: ability.effect.clone(),
                color: ability.color.clone(),
            });
        },
        AbilityKind::Area { radius } => {
            effects.emit(EffectEvent::new(
                EffectKind::Ring,
                caster.position,
                ability.color.clone(),
                radius,
                400.0,
            ));
            if opponent.is_alive()
                && circles_overlap(caster.position, radius, opponent.position, opponent.radius)
            {
                opponent.apply_damage(ability.damage, effects);
                if let Some(effect) = &ability.effect {
                    opponent.apply_status(effect);
                }
            }
        },
        AbilityKind::Dash { range } => {
            let steps = config.dash_steps.max(1);
            let origin = caster.position;
            for i in (0..=steps).rev() {
                let candidate = origin + aim * (range * i as f32 / steps as f32);
                if !arena.is_blocked(candidate, caster.radius, config.wall_padding) {
                    caster.position = candidate;
                    caster.target = candidate;
                    break;
                }
            }
            effects.emit(EffectEvent::new(
                EffectKind::Shockwave,
                caster.position,
                ability.color.clone(),
                120.0,
                300.0,
            ));
        },
        AbilityKind::SelfBuff => {
            effects.emit(EffectEvent::new(
                EffectKind::Ring,
                caster.position,
                ability.color.clone(),
                caster.radius * 2.0,
                300.0,
            ));
            if let Some(effect) = &ability.effect {
                caster.apply_status(effect);
            }
        },
        AbilityKind::DelayedZone { radius, delay_ms } => {
            zones.push(Zone {
                id: ids.allocate(),
                position: target,
                radius,
                timer_ms: delay_ms,
                max_timer_ms: delay_ms,
                damage: ability.damage,
                owner: side,
                effect: ability.effect.clone(),
                color: ability.color.clone(),
            });
        },
    }
    Ok(())
}
