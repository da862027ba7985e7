//! Protocol version carried by every wire envelope.

use serde::{Deserialize, Serialize};

/// Major/minor protocol version.
///
/// Peers with the same major version understand each other; a minor bump
/// only adds optional fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Bumped on breaking wire changes
    pub major: u16,
    /// Bumped on additive wire changes
    pub minor: u16,
}

impl SchemaVersion {
    /// Host/guest battle protocol spoken by this build.
    pub const BATTLE_PROTOCOL: Self = Self { major: 1, minor: 0 };

    /// Whether a peer speaking `other` can be decoded.
    #[must_use]
    pub const fn can_read(&self, other: &Self) -> bool {
        self.major == other.major
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
