//! Projectile and delayed-zone lifecycle.
//!
//! Every projectile resolves exactly once: it hits the opposing combatant,
//! expires, or is stopped by an obstacle. Every zone detonates exactly once
//! when its delay runs out, whether or not anything is inside it.

use arena_common::{circles_overlap, ObjectId, Side, Vec2};
use serde::{Deserialize, Serialize};

use crate::arena::ArenaLayout;
use crate::effects::{EffectEvent, EffectKind, EffectSink};
use crate::entity::Entity;
use crate::status::StatusEffect;

/// A travelling projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    /// Unique id
    pub id: ObjectId,
    /// Centre position
    pub position: Vec2,
    /// Velocity in units per second
    pub velocity: Vec2,
    /// Collision radius
    pub radius: f32,
    /// Damage on hit
    pub damage: f32,
    /// Side that fired it
    pub owner: Side,
    /// Remaining lifetime in seconds
    pub life_secs: f32,
    /// Effect applied on hit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<StatusEffect>,
    /// Presentation color
    pub color: String,
}

/// A zone waiting to detonate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    /// Unique id
    pub id: ObjectId,
    /// Centre position
    pub position: Vec2,
    /// Detonation radius
    pub radius: f32,
    /// Milliseconds until detonation
    pub timer_ms: f32,
    /// Initial delay, for presentation
    pub max_timer_ms: f32,
    /// Damage on detonation
    pub damage: f32,
    /// Side that placed it
    pub owner: Side,
    /// Effect applied on detonation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<StatusEffect>,
    /// Presentation color
    pub color: String,
}

/// How a projectile left play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileFate {
    /// Struck the opposing combatant
    Hit,
    /// Ran out of lifetime
    Expired,
    /// Hit an obstacle or the arena boundary
    Blocked,
}

/// Advance every projectile by `dt_ms` and resolve impacts.
///
/// Returns the fate of each projectile removed this step.
pub fn step_projectiles(
    projectiles: &mut Vec<Projectile>,
    entities: &mut [Entity; 2],
    arena: &ArenaLayout,
    padding: f32,
    dt_ms: f32,
    sink: &mut impl EffectSink,
) -> Vec<(ObjectId, ProjectileFate)> {
    let dt_secs = dt_ms / 1000.0;
    let mut resolved = Vec::new();

    projectiles.retain_mut(|p| {
        p.position += p.velocity * dt_secs;
        p.life_secs -= dt_secs;

        let target = &mut entities[p.owner.opponent().index()];
        let fate = if target.is_alive()
            && circles_overlap(p.position, p.radius, target.position, target.radius)
        {
            target.apply_damage(p.damage, sink);
            if let Some(effect) = &p.effect {
                target.apply_status(effect);
            }
            Some(ProjectileFate::Hit)
        } else if p.life_secs <= 0.0 {
            Some(ProjectileFate::Expired)
        } else if arena.is_blocked(p.position, p.radius, padding) {
            Some(ProjectileFate::Blocked)
        } else {
            None
        };

        match fate {
            Some(fate) => {
                resolved.push((p.id, fate));
                false
            },
            None => true,
        }
    });

    resolved
}

/// Count every zone down by `dt_ms` and detonate the ones that reach zero.
///
/// Returns `(id, hit)` for each zone that detonated this step.
pub fn step_zones(
    zones: &mut Vec<Zone>,
    entities: &mut [Entity; 2],
    dt_ms: f32,
    sink: &mut impl EffectSink,
) -> Vec<(ObjectId, bool)> {
    let mut detonated = Vec::new();

    zones.retain_mut(|z| {
        z.timer_ms -= dt_ms;
        if z.timer_ms > 0.0 {
            return true;
        }

        let target = &mut entities[z.owner.opponent().index()];
        let hit = target.is_alive()
            && circles_overlap(z.position, z.radius, target.position, target.radius);
        if hit {
            target.apply_damage(z.damage, sink);
            if let Some(effect) = &z.effect {
                target.apply_status(effect);
            }
        }
        sink.emit(EffectEvent::new(
            EffectKind::Explosion,
            z.position,
            z.color.clone(),
            z.radius,
            400.0,
        ));
        detonated.push((z.id, hit));
        false
    });

    detonated
}
