//! # Arena Sim
//!
//! The combat simulation core of the arena duel engine.
//!
//! This crate owns everything that decides an outcome:
//! - Stats, status effects and character templates
//! - Arena layouts and obstacle collision
//! - Ability resolution, auto-attacks and movement
//! - Projectile and delayed-zone lifecycle
//! - The AI opponent
//! - The fixed-step clock and the solo match driver

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod ability;
pub mod ai;
pub mod arena;
pub mod clock;
pub mod config;
pub mod effects;
pub mod entity;
pub mod movement;
pub mod projectile;
pub mod solo;
pub mod stats;
pub mod status;
pub mod template;
pub mod world;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ability::*;
    pub use crate::ai::*;
    pub use crate::arena::*;
    pub use crate::clock::*;
    pub use crate::config::*;
    pub use crate::effects::*;
    pub use crate::entity::*;
    pub use crate::movement::*;
    pub use crate::projectile::*;
    pub use crate::solo::*;
    pub use crate::stats::*;
    pub use crate::status::*;
    pub use crate::template::*;
    pub use crate::world::*;
}

pub use prelude::*;
