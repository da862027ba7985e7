//! Error types for the arena engine.
//!
//! The simulation itself never fails: invalid commands are dropped and
//! numeric state is clamped. These errors cover the edges of the system,
//! where data is loaded or bytes cross a channel.

use thiserror::Error;

/// Message channel errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer closed the channel or it was dropped.
    #[error("channel closed")]
    Closed,

    /// The outbound queue is full; the message was not sent.
    #[error("outbound queue full")]
    Full,
}

/// Wire encoding/decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Payload could not be parsed.
    #[error("malformed payload: {0}")]
    Malformed(String),

    /// Payload was produced by an incompatible protocol version.
    #[error("protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// Version this build speaks
        expected: String,
        /// Version found in the envelope
        actual: String,
    },
}

/// Errors loading templates or arena layouts.
#[derive(Debug, Error)]
pub enum DataError {
    /// RON parse failure
    #[error("failed to parse {what}: {reason}")]
    Parse {
        /// What was being parsed
        what: &'static str,
        /// Parser message
        reason: String,
    },

    /// Requested id does not exist
    #[error("unknown {what} id: {id}")]
    UnknownId {
        /// Kind of record
        what: &'static str,
        /// Requested id
        id: String,
    },
}
