//! Match outcome port.

use arena_common::Side;

/// Why a match ended without a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The peer closed the channel or it dropped
    ChannelClosed,
    /// This side closed the session
    LocalClose,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ChannelClosed => write!(f, "channel closed"),
            Self::LocalClose => write!(f, "closed locally"),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// A side won, from the observer's perspective
    Winner(Side),
    /// The match was aborted
    Aborted(AbortReason),
}

/// Receives the end of a match. Sessions call exactly one method, once.
pub trait MatchObserver {
    /// The match ended with a winner, from this peer's perspective.
    fn on_match_over(&mut self, winner: Side);

    /// The match was aborted.
    fn on_aborted(&mut self, reason: AbortReason);
}

/// Observer that remembers every notification.
#[derive(Debug, Clone, Default)]
pub struct OutcomeRecorder {
    outcomes: Vec<MatchOutcome>,
}

impl OutcomeRecorder {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First recorded outcome.
    #[must_use]
    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcomes.first().copied()
    }

    /// Number of notifications received.
    #[must_use]
    pub fn count(&self) -> usize {
        self.outcomes.len()
    }
}

impl MatchObserver for OutcomeRecorder {
    fn on_match_over(&mut self, winner: Side) {
        self.outcomes.push(MatchOutcome::Winner(winner));
    }

    fn on_aborted(&mut self, reason: AbortReason) {
        self.outcomes.push(MatchOutcome::Aborted(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_keeps_first() {
        let mut recorder = OutcomeRecorder::new();
        assert_eq!(recorder.outcome(), None);

        recorder.on_match_over(Side::Local);
        recorder.on_aborted(AbortReason::ChannelClosed);

        assert_eq!(recorder.outcome(), Some(MatchOutcome::Winner(Side::Local)));
        assert_eq!(recorder.count(), 2);
    }
}
