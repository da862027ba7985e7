//! Solo match driver.
//!
//! Owns a [`World`], its [`SimClock`] and the AI for the remote side. The
//! local player's intents are queued and applied at the next step boundary.

use std::collections::VecDeque;

use arena_common::Side;
use tracing::info;

use crate::ai::AiController;
use crate::clock::SimClock;
use crate::config::AiConfig;
use crate::effects::EffectSink;
use crate::world::{Intent, World};

/// A match against the AI.
#[derive(Debug)]
pub struct SoloMatch {
    world: World,
    clock: SimClock,
    opponent: AiController,
    /// Optional AI playing the local side (headless runs)
    autopilot: Option<AiController>,
    /// Local intents waiting for the next step
    pending: VecDeque<Intent>,
    /// Set once the winner has been reported
    reported: bool,
}

impl SoloMatch {
    /// Start a match. The remote side is AI-controlled.
    #[must_use]
    pub fn new(world: World, ai: AiConfig) -> Self {
        let clock = SimClock::from_config(world.config());
        Self {
            world,
            clock,
            opponent: AiController::new(Side::Remote, ai),
            autopilot: None,
            pending: VecDeque::new(),
            reported: false,
        }
    }

    /// Let an AI drive the local side too.
    #[must_use]
    pub fn with_autopilot(mut self, config: AiConfig) -> Self {
        self.autopilot = Some(AiController::new(Side::Local, config));
        self
    }

    /// The world being simulated.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The remote AI.
    #[must_use]
    pub fn opponent(&self) -> &AiController {
        &self.opponent
    }

    /// Queue a local intent.
    pub fn queue(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Number of intents waiting for the next step.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Feed elapsed wall-clock time and run the resulting fixed steps.
    ///
    /// Effects are flushed to `sink` after every step. Returns the winner the
    /// first time the match ends.
    pub fn advance(&mut self, elapsed_ms: f32, sink: &mut dyn EffectSink) -> Option<Side> {
        let steps = self.clock.advance(elapsed_ms);
        for _ in 0..steps {
            self.step(sink);
            if self.world.is_over() {
                break;
            }
        }

        if self.reported {
            return None;
        }
        let winner = self.world.winner()?;
        self.reported = true;
        info!(winner = %winner, tick = self.world.tick(), "Solo match finished");
        Some(winner)
    }

    fn step(&mut self, sink: &mut dyn EffectSink) {
        while let Some(intent) = self.pending.pop_front() {
            self.world.apply_intent(Side::Local, &intent);
        }

        for ai in std::iter::once(&mut self.opponent).chain(self.autopilot.as_mut()) {
            for intent in ai.think(&self.world) {
                self.world.apply_intent(ai.side(), &intent);
            }
        }

        self.world.step(self.clock.fixed_dt_ms());
        self.world.flush_effects(sink);
    }
}
