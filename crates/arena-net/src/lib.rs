//! # Arena Net
//!
//! Host-authoritative synchronization for two-peer battles.
//!
//! The host runs the full simulation and streams snapshots. The guest
//! forwards its commands, predicts its own movement and reconciles against
//! each snapshot it receives:
//! - Wire messages and the versioned JSON codec
//! - World snapshots with perspective flipping
//! - Transport port with loopback and lossy in-process links
//! - Host and guest sessions
//! - Match outcome observer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod guest;
pub mod host;
pub mod message;
pub mod observer;
pub mod reconcile;
pub mod session;
pub mod snapshot;
pub mod transport;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::*;
    pub use crate::guest::*;
    pub use crate::host::*;
    pub use crate::message::{decode, encode, BattleInput, Message};
    pub use crate::observer::*;
    pub use crate::reconcile::*;
    pub use crate::session::SessionStatus;
    pub use crate::snapshot::*;
    pub use crate::transport::*;
}

pub use prelude::*;
