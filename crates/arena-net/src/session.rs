//! State shared by host and guest sessions.

use arena_common::{Side, TransportError};
use tracing::{debug, info, warn};

use crate::message::{self, Message};
use crate::observer::{AbortReason, MatchObserver};
use crate::transport::Transport;

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Match in progress
    Running,
    /// Match ended with a winner, from this peer's perspective
    Finished(Side),
    /// Match aborted
    Aborted(AbortReason),
}

impl SessionStatus {
    /// Whether the session still steps.
    #[must_use]
    pub fn is_running(self) -> bool {
        self == Self::Running
    }

    /// Whether the session was aborted.
    #[must_use]
    pub fn is_aborted(self) -> bool {
        matches!(self, Self::Aborted(_))
    }
}

/// Transport plus end-of-match bookkeeping.
#[derive(Debug)]
pub(crate) struct Channel<T: Transport> {
    transport: T,
    status: SessionStatus,
    role: &'static str,
}

impl<T: Transport> Channel<T> {
    pub(crate) fn new(transport: T, role: &'static str) -> Self {
        Self {
            transport,
            status: SessionStatus::Running,
            role,
        }
    }

    pub(crate) fn status(&self) -> SessionStatus {
        self.status
    }

    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Encode and send. A full queue drops the message; a closed channel
    /// aborts a running session. Finished sessions may still send.
    pub(crate) fn send(&mut self, message: &Message, observer: &mut dyn MatchObserver) {
        if self.status.is_aborted() {
            return;
        }
        let bytes = match message::encode(message) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(role = self.role, kind = message.kind(), error = %e, "Encode failed");
                return;
            },
        };
        match self.transport.send(bytes) {
            Ok(()) => {},
            Err(TransportError::Full) => {
                debug!(role = self.role, kind = message.kind(), "Outbound queue full, dropped");
            },
            Err(TransportError::Closed) => self.abort(AbortReason::ChannelClosed, observer),
        }
    }

    /// Drain every decodable inbound message. Undecodable payloads are
    /// dropped; a closed channel aborts the session.
    pub(crate) fn drain(&mut self, observer: &mut dyn MatchObserver) -> Vec<Message> {
        let mut inbound = Vec::new();
        while self.status.is_running() {
            match self.transport.try_recv() {
                Ok(Some(bytes)) => match message::decode(&bytes) {
                    Ok(message) => inbound.push(message),
                    Err(e) => debug!(role = self.role, error = %e, "Dropped inbound message"),
                },
                Ok(None) => break,
                Err(_) => self.abort(AbortReason::ChannelClosed, observer),
            }
        }
        inbound
    }

    /// End the match with a winner. Only the first end is reported.
    pub(crate) fn finish(&mut self, winner: Side, observer: &mut dyn MatchObserver) {
        if self.status.is_running() {
            info!(role = self.role, winner = %winner, "Match finished");
            self.status = SessionStatus::Finished(winner);
            observer.on_match_over(winner);
        }
    }

    /// Abort the match. Only the first end is reported.
    pub(crate) fn abort(&mut self, reason: AbortReason, observer: &mut dyn MatchObserver) {
        if self.status.is_running() {
            warn!(role = self.role, %reason, "Match aborted");
            self.status = SessionStatus::Aborted(reason);
            self.transport.close();
            observer.on_aborted(reason);
        }
    }
}
