//! ID types for combatants, abilities, and spawned objects.

use serde::{Deserialize, Serialize};

/// Which of the two combatants an entity or object belongs to.
///
/// Sides are always relative to the process that owns the world: the
/// host's `Local` entity is the guest's `Remote` entity and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The combatant controlled by this process.
    Local,
    /// The opposing combatant (AI in solo mode, the peer otherwise).
    Remote,
}

impl Side {
    /// Both sides, `Local` first.
    pub const BOTH: [Self; 2] = [Self::Local, Self::Remote];

    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Local => Self::Remote,
            Self::Remote => Self::Local,
        }
    }

    /// Index into a two-element per-side array.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Local => 0,
            Self::Remote => 1,
        }
    }

    /// Wire tag for this side.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key an ability is bound to on a character template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbilityKey {
    /// First slot, usually the basic poke.
    A,
    /// Second slot.
    S,
    /// Third slot.
    D,
    /// Fourth slot, the ultimate.
    F,
}

impl AbilityKey {
    /// All keys in slot order.
    pub const ALL: [Self; 4] = [Self::A, Self::S, Self::D, Self::F];
}

/// Identifier for a spawned projectile or zone.
///
/// Allocated by the world that spawns the object, so ids are deterministic
/// for a given sequence of ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Creates an object ID from a raw value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Monotonic allocator for [`ObjectId`]s.
#[derive(Debug, Clone, Default)]
pub struct ObjectIdAllocator {
    next: u64,
}

impl ObjectIdAllocator {
    /// Creates an allocator whose first id is 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns the next unused id.
    pub fn allocate(&mut self) -> ObjectId {
        let id = ObjectId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}
