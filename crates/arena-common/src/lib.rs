//! # Arena Common
//!
//! Common types and shared abstractions for the arena duel engine.
//!
//! This crate provides foundational types used by the simulation and the
//! network layer:
//! - Side and ability identifiers
//! - Arena-space geometry
//! - Version information for the wire protocol
//! - Common error types
//! - Prelude for convenient imports

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod coords;
pub mod error;
pub mod ids;
pub mod version;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::coords::*;
    pub use crate::error::*;
    pub use crate::ids::*;
    pub use crate::version::*;
}

pub use prelude::*;
