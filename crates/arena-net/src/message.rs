//! Wire messages and their codec.
//!
//! Messages are JSON objects tagged by `type`, wrapped in an envelope that
//! carries the protocol version.

use arena_common::{AbilityKey, CodecError, SchemaVersion, Side, Vec2};
use arena_sim::Intent;
use serde::{Deserialize, Serialize};

use crate::snapshot::Snapshot;

/// Guest command forwarded to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum BattleInput {
    /// New movement target
    Move {
        /// Target x
        x: f32,
        /// Target y
        y: f32,
    },
    /// Cast attempt aimed at a point
    Cast {
        /// Aim x
        x: f32,
        /// Aim y
        y: f32,
        /// Ability slot
        #[serde(rename = "abilityId")]
        ability_id: AbilityKey,
    },
}

impl BattleInput {
    /// Convert from a simulation intent.
    #[must_use]
    pub fn from_intent(intent: &Intent) -> Self {
        match *intent {
            Intent::Move { target } => Self::Move {
                x: target.x,
                y: target.y,
            },
            Intent::Cast { key, target } => Self::Cast {
                x: target.x,
                y: target.y,
                ability_id: key,
            },
        }
    }

    /// Convert to a simulation intent.
    #[must_use]
    pub fn to_intent(&self) -> Intent {
        match *self {
            Self::Move { x, y } => Intent::Move {
                target: Vec2::new(x, y),
            },
            Self::Cast { x, y, ability_id } => Intent::Cast {
                key: ability_id,
                target: Vec2::new(x, y),
            },
        }
    }
}

/// A message on the battle channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    /// Guest to host: a command
    BattleInput(BattleInput),
    /// Host to guest: authoritative state
    BattleSync(Snapshot),
    /// Host to guest: the match ended
    BattleOver {
        /// Winner from the host's perspective
        #[serde(rename = "winnerSide")]
        winner_side: Side,
    },
}

impl Message {
    /// Short name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BattleInput(_) => "battle_input",
            Self::BattleSync(_) => "battle_sync",
            Self::BattleOver { .. } => "battle_over",
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: SchemaVersion,
    message: &'a Message,
}

#[derive(Deserialize)]
struct RawEnvelope {
    version: SchemaVersion,
    message: serde_json::Value,
}

/// Encode a message with the current protocol version.
pub fn encode(message: &Message) -> Result<Vec<u8>, CodecError> {
    let envelope = EnvelopeRef {
        version: SchemaVersion::BATTLE_PROTOCOL,
        message,
    };
    serde_json::to_vec(&envelope).map_err(|e| CodecError::Malformed(e.to_string()))
}

/// Decode a message, rejecting payloads from an incompatible protocol.
pub fn decode(bytes: &[u8]) -> Result<Message, CodecError> {
    let raw: RawEnvelope =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;
    if !SchemaVersion::BATTLE_PROTOCOL.can_read(&raw.version) {
        return Err(CodecError::VersionMismatch {
            expected: SchemaVersion::BATTLE_PROTOCOL.to_string(),
            actual: raw.version.to_string(),
        });
    }
    serde_json::from_value(raw.message).map_err(|e| CodecError::Malformed(e.to_string()))
}
