//! Authoritative host session.
//!
//! The host runs the full simulation for both combatants. The guest's
//! commands arrive as `battle_input` and drive the `Remote` side; the
//! host's own commands drive `Local`.

use std::collections::VecDeque;

use arena_common::Side;
use arena_sim::{EffectEvent, EffectSink, Intent, SimClock, World};
use tracing::{debug, trace};

use crate::config::SyncConfig;
use crate::message::Message;
use crate::observer::{AbortReason, MatchObserver};
use crate::session::{Channel, SessionStatus};
use crate::snapshot::Snapshot;
use crate::transport::Transport;

/// Absorbs float error when whole steps add up to the snapshot interval.
const CADENCE_SLACK_MS: f32 = 1e-3;

/// Which of two peers hosts: the one with the smaller client id.
#[must_use]
pub fn is_host(local_id: &str, remote_id: &str) -> bool {
    local_id < remote_id
}

/// Host end of a battle.
#[derive(Debug)]
pub struct HostSession<T: Transport> {
    world: World,
    clock: SimClock,
    channel: Channel<T>,
    config: SyncConfig,
    /// Local intents waiting for the next step
    pending: VecDeque<Intent>,
    /// Effects emitted since the last snapshot
    unsent_vfx: Vec<EffectEvent>,
    since_snapshot_ms: f32,
    snapshots_sent: u64,
}

impl<T: Transport> HostSession<T> {
    /// Start hosting `world` over `transport`.
    #[must_use]
    pub fn new(world: World, transport: T, config: SyncConfig) -> Self {
        let clock = SimClock::from_config(world.config());
        Self {
            world,
            clock,
            channel: Channel::new(transport, "host"),
            // First step sends a snapshot straight away.
            since_snapshot_ms: config.snapshot_interval_ms,
            config,
            pending: VecDeque::new(),
            unsent_vfx: Vec::new(),
            snapshots_sent: 0,
        }
    }

    /// The authoritative world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// The authoritative world, mutably.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.channel.status()
    }

    /// Snapshots sent so far.
    #[must_use]
    pub fn snapshots_sent(&self) -> u64 {
        self.snapshots_sent
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        self.channel.transport()
    }

    /// The underlying transport, mutably.
    pub fn transport_mut(&mut self) -> &mut T {
        self.channel.transport_mut()
    }

    /// Queue an intent for the host's own combatant.
    pub fn queue(&mut self, intent: Intent) {
        self.pending.push_back(intent);
    }

    /// Close the session from this side.
    pub fn close(&mut self, observer: &mut dyn MatchObserver) {
        self.channel.abort(AbortReason::LocalClose, observer);
    }

    /// Feed elapsed wall-clock time and run the resulting fixed steps.
    pub fn advance(
        &mut self,
        elapsed_ms: f32,
        sink: &mut dyn EffectSink,
        observer: &mut dyn MatchObserver,
    ) -> SessionStatus {
        let steps = self.clock.advance(elapsed_ms);
        for _ in 0..steps {
            if self.channel.status().is_aborted() {
                break;
            }
            self.step(sink, observer);
        }
        self.channel.status()
    }

    /// Run one fixed step.
    ///
    /// After the match ends the step only repeats the final snapshot at
    /// the snapshot cadence, so a guest that lost `battle_over` still sees
    /// the knockout.
    pub fn step(&mut self, sink: &mut dyn EffectSink, observer: &mut dyn MatchObserver) {
        for message in self.channel.drain(observer) {
            match message {
                Message::BattleInput(input) => {
                    let intent = input.to_intent();
                    if !self.world.apply_intent(Side::Remote, &intent) {
                        trace!(?intent, "Guest intent dropped");
                    }
                },
                other => debug!(kind = other.kind(), "Unexpected message from guest"),
            }
        }
        match self.channel.status() {
            SessionStatus::Running => {},
            SessionStatus::Finished(_) => {
                self.linger(observer);
                return;
            },
            SessionStatus::Aborted(_) => return,
        }

        while let Some(intent) = self.pending.pop_front() {
            self.world.apply_intent(Side::Local, &intent);
        }

        let dt_ms = self.clock.fixed_dt_ms();
        let winner = self.world.step(dt_ms);

        for event in self.world.drain_effects() {
            self.unsent_vfx.push(event.clone());
            sink.emit(event);
        }

        self.since_snapshot_ms += dt_ms;
        let due = self.since_snapshot_ms + CADENCE_SLACK_MS >= self.config.snapshot_interval_ms;
        if due || winner.is_some() {
            self.send_snapshot(observer);
        }

        if let Some(winner) = winner {
            self.channel
                .send(&Message::BattleOver { winner_side: winner }, observer);
            self.channel.finish(winner, observer);
        }
    }

    fn linger(&mut self, observer: &mut dyn MatchObserver) {
        if self.channel.transport().is_closed() {
            return;
        }
        self.since_snapshot_ms += self.clock.fixed_dt_ms();
        if self.since_snapshot_ms + CADENCE_SLACK_MS >= self.config.snapshot_interval_ms {
            self.send_snapshot(observer);
        }
    }

    fn send_snapshot(&mut self, observer: &mut dyn MatchObserver) {
        let vfx = std::mem::take(&mut self.unsent_vfx);
        let snapshot = Snapshot::capture(&self.world, vfx);
        trace!(tick = snapshot.tick, "Snapshot sent");
        self.channel.send(&Message::BattleSync(snapshot), observer);
        self.since_snapshot_ms = 0.0;
        self.snapshots_sent += 1;
    }
}
