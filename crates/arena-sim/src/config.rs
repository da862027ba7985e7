//! Simulation and AI tunables.
//!
//! Both structs deserialize with `#[serde(default)]`, so a config file only
//! needs to name the values it overrides.

use serde::{Deserialize, Serialize};

/// Simulation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Clock ===
    /// Fixed simulation step in milliseconds
    pub fixed_dt_ms: f32,
    /// Largest wall-clock delta accepted per clock invocation
    pub max_frame_ms: f32,
    /// Maximum fixed steps per clock invocation
    pub max_steps: u32,
    /// Pre-battle countdown in milliseconds
    pub countdown_ms: f32,

    // === Bodies ===
    /// Collision radius of a combatant
    pub entity_radius: f32,
    /// Distance of the spawn points from the left and right arena edges
    pub spawn_inset: f32,
    /// Distance under which a combatant counts as arrived
    pub arrival_threshold: f32,
    /// Extra padding added to radii for obstacle and boundary tests
    pub wall_padding: f32,

    // === Abilities ===
    /// Distance beyond the caster's edge at which projectiles spawn
    pub cast_offset: f32,
    /// Number of sample points tried by a dash
    pub dash_steps: u32,
    /// Travel speed of auto-attack projectiles (units per second)
    pub basic_projectile_speed: f32,
    /// Radius of auto-attack projectiles
    pub basic_projectile_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt_ms: 1000.0 / 60.0,
            max_frame_ms: 50.0,
            max_steps: 8,
            countdown_ms: 1200.0,

            entity_radius: 25.0,
            spawn_inset: 150.0,
            arrival_threshold: 5.0,
            wall_padding: 2.0,

            cast_offset: 15.0,
            dash_steps: 10,
            basic_projectile_speed: 1200.0,
            basic_projectile_radius: 6.0,
        }
    }
}

impl SimConfig {
    /// Clamp values to ranges the simulation can run with.
    pub fn validate(&mut self) {
        self.fixed_dt_ms = self.fixed_dt_ms.clamp(1.0, 100.0);
        self.max_frame_ms = self.max_frame_ms.clamp(self.fixed_dt_ms, 1000.0);
        self.max_steps = self.max_steps.clamp(1, 64);
        self.countdown_ms = self.countdown_ms.clamp(0.0, 10_000.0);

        self.entity_radius = self.entity_radius.clamp(1.0, 200.0);
        self.spawn_inset = self.spawn_inset.max(self.entity_radius + self.wall_padding + 1.0);
        self.arrival_threshold = self.arrival_threshold.clamp(0.1, 50.0);
        self.wall_padding = self.wall_padding.clamp(0.0, 20.0);

        self.cast_offset = self.cast_offset.clamp(0.0, 100.0);
        self.dash_steps = self.dash_steps.clamp(1, 100);
        self.basic_projectile_speed = self.basic_projectile_speed.clamp(50.0, 10_000.0);
        self.basic_projectile_radius = self.basic_projectile_radius.clamp(1.0, 50.0);
    }
}

/// AI opponent tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Seed for the retreat jitter
    pub seed: u64,

    // === Cadence (in simulation ticks) ===
    /// Ticks between decisions
    pub decision_every: u32,
    /// Ticks between strategic movement updates
    pub movement_every: u32,
    /// Ticks between ability attempts
    pub ability_every: u32,
    /// Decisions a dodge overrides strategic movement for
    pub dodge_hold_ticks: u32,

    // === Distances ===
    /// Radius in which hostile projectiles count as a threat
    pub threat_radius: f32,
    /// Sidestep distance when dodging
    pub dodge_distance: f32,
    /// Retreat distance when defensive or panicking
    pub retreat_distance: f32,
    /// Total angular spread of the retreat direction in radians
    pub retreat_jitter: f32,
    /// Preferred distance to the opponent in neutral posture
    pub preferred_range: f32,
    /// Tolerance around the preferred distance
    pub range_tolerance: f32,
    /// Step taken away from the opponent when too close in neutral posture
    pub back_off_distance: f32,

    // === Abilities ===
    /// Fraction of the opponent's remaining path used to lead shots
    pub lead_factor: f32,
    /// Crowd-control range for abilities without one
    pub default_cc_range: f32,
    /// Poke range for abilities without one
    pub default_poke_range: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed_a2e4,

            decision_every: 2,
            movement_every: 10,
            ability_every: 8,
            dodge_hold_ticks: 15,

            threat_radius: 300.0,
            dodge_distance: 150.0,
            retreat_distance: 300.0,
            retreat_jitter: 0.5,
            preferred_range: 400.0,
            range_tolerance: 50.0,
            back_off_distance: 150.0,

            lead_factor: 0.3,
            default_cc_range: 600.0,
            default_poke_range: 800.0,
        }
    }
}

impl AiConfig {
    /// Use the given jitter seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Clamp values to sensible ranges.
    pub fn validate(&mut self) {
        self.decision_every = self.decision_every.max(1);
        self.movement_every = self.movement_every.max(1);
        self.ability_every = self.ability_every.max(1);
        self.dodge_hold_ticks = self.dodge_hold_ticks.min(600);

        self.threat_radius = self.threat_radius.clamp(0.0, 2000.0);
        self.dodge_distance = self.dodge_distance.clamp(0.0, 1000.0);
        self.retreat_distance = self.retreat_distance.clamp(0.0, 2000.0);
        self.retreat_jitter = self.retreat_jitter.clamp(0.0, std::f32::consts::PI);
        self.preferred_range = self.preferred_range.clamp(0.0, 2000.0);
        self.range_tolerance = self.range_tolerance.clamp(0.0, self.preferred_range);
        self.back_off_distance = self.back_off_distance.clamp(0.0, 1000.0);

        self.lead_factor = self.lead_factor.clamp(0.0, 1.0);
        self.default_cc_range = self.default_cc_range.max(0.0);
        self.default_poke_range = self.default_poke_range.max(0.0);
    }
}
