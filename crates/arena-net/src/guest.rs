//! Non-authoritative guest session.
//!
//! The guest mirrors the host's world. It predicts only its own movement;
//! every combat outcome comes from host snapshots. Sides are flipped on
//! receipt, so the guest's own combatant is always `Local`.
//!
//! A move the guest sends keeps steering the prediction until a snapshot
//! shows the host has the same target, or the ack timeout passes. From
//! then on the host's target wins, which is how dashes and other
//! host-side relocations reach the guest.

use std::collections::VecDeque;

use arena_common::{Side, Vec2};
use arena_sim::{EffectKind, EffectSink, Intent, SimClock, World};
use tracing::{debug, trace};

use crate::config::SyncConfig;
use crate::message::{BattleInput, Message};
use crate::observer::{AbortReason, MatchObserver};
use crate::reconcile::{Correction, Reconciler};
use crate::session::{Channel, SessionStatus};
use crate::snapshot::Snapshot;
use crate::transport::Transport;

/// Distance within which the host's target confirms a sent move.
const TARGET_MATCH_EPSILON: f32 = 0.01;

/// A move sent to the host and not yet seen in a snapshot.
#[derive(Debug, Clone, Copy)]
struct UnackedMove {
    target: Vec2,
    age_ms: f32,
}

/// Guest end of a battle.
#[derive(Debug)]
pub struct GuestSession<T: Transport> {
    world: World,
    clock: SimClock,
    channel: Channel<T>,
    reconciler: Reconciler,
    move_ack_timeout_ms: f32,
    /// Local intents waiting for the next step
    pending: VecDeque<Intent>,
    unacked_move: Option<UnackedMove>,
    /// Tick of the newest snapshot applied
    last_tick: Option<u64>,
    snaps: u64,
}

impl<T: Transport> GuestSession<T> {
    /// Join a match. `world` is the guest's mirror with its own combatant
    /// on the `Local` side.
    #[must_use]
    pub fn new(world: World, transport: T, config: &SyncConfig) -> Self {
        let clock = SimClock::from_config(world.config());
        Self {
            world,
            clock,
            channel: Channel::new(transport, "guest"),
            reconciler: Reconciler::from_config(config),
            move_ack_timeout_ms: config.move_ack_timeout_ms,
            pending: VecDeque::new(),
            unacked_move: None,
            last_tick: None,
            snaps: 0,
        }
    }

    /// The mirrored world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.channel.status()
    }

    /// Host tick of the newest snapshot applied.
    #[must_use]
    pub fn last_tick(&self) -> Option<u64> {
        self.last_tick
    }

    /// Times the own position was snapped rather than blended.
    #[must_use]
    pub fn snap_count(&self) -> u64 {
        self.snaps
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

    /// Queue an intent for the guest's combatant.
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
            if !self.channel.status().is_running() {
                break;
            }
            self.step(sink, observer);
        }
        self.channel.status()
    }

    /// Run one fixed step.
    pub fn step(&mut self, sink: &mut dyn EffectSink, observer: &mut dyn MatchObserver) {
        let mut newest: Option<Snapshot> = None;
        let mut winner = None;
        for message in self.channel.drain(observer) {
            match message {
                Message::BattleSync(snapshot) => {
                    let floor = newest.as_ref().map(|s| s.tick).or(self.last_tick);
                    if floor.is_some_and(|tick| snapshot.tick <= tick) {
                        debug!(tick = snapshot.tick, "Stale snapshot dropped");
                    } else {
                        newest = Some(snapshot);
                    }
                },
                Message::BattleOver { winner_side } => winner = Some(winner_side.opponent()),
                other @ Message::BattleInput(_) => {
                    debug!(kind = other.kind(), "Unexpected message from host");
                },
            }
        }
        if !self.channel.status().is_running() {
            return;
        }

        if let Some(snapshot) = newest {
            self.apply_snapshot(snapshot.flipped(), sink);
            winner = winner.or_else(|| self.knockout());
        }

        while let Some(intent) = self.pending.pop_front() {
            self.send_intent(intent, observer);
        }

        let dt_ms = self.clock.fixed_dt_ms();
        self.world.predict_movement(Side::Local, dt_ms);
        let own = self.world.entity_mut(Side::Local);
        own.position = self.reconciler.smooth(own.position);
        if let Some(unacked) = &mut self.unacked_move {
            unacked.age_ms += dt_ms;
        }
        self.world.flush_effects(sink);

        if let Some(winner) = winner {
            self.world.declare_winner(winner);
            self.channel.finish(winner, observer);
        }
    }

    fn send_intent(&mut self, intent: Intent, observer: &mut dyn MatchObserver) {
        if let Intent::Move { target } = intent {
            // Predicted locally; the host confirms through snapshots.
            if self.world.set_move_target(Side::Local, target) {
                self.unacked_move = Some(UnackedMove { target, age_ms: 0.0 });
            }
        }
        let input = BattleInput::from_intent(&intent);
        self.channel.send(&Message::BattleInput(input), observer);
    }

    /// Apply a snapshot already flipped to this peer's perspective.
    fn apply_snapshot(&mut self, snapshot: Snapshot, sink: &mut dyn EffectSink) {
        snapshot
            .entity(Side::Remote)
            .apply_to(self.world.entity_mut(Side::Remote));

        let own = snapshot.entity(Side::Local);
        let keep_prediction = match self.unacked_move {
            Some(unacked) if own.target.distance(unacked.target) <= TARGET_MATCH_EPSILON => {
                self.unacked_move = None;
                false
            },
            Some(unacked) if unacked.age_ms < self.move_ack_timeout_ms => true,
            Some(_) => {
                debug!("Move never confirmed, deferring to host target");
                self.unacked_move = None;
                false
            },
            None => false,
        };
        let entity = self.world.entity_mut(Side::Local);
        own.apply_combat_state(entity);
        let (position, correction) = self.reconciler.correct(entity.position, own.position);
        entity.position = position;
        if !keep_prediction {
            entity.target = own.target;
            entity.angle = own.angle;
        }
        if correction == Correction::Snapped {
            self.snaps += 1;
        }

        self.world.replace_projectiles(snapshot.projectiles);
        self.world.replace_zones(snapshot.zones);
        self.world.set_countdown_ms(snapshot.countdown);
        self.world.set_tick(snapshot.tick);
        // Move markers are feedback for whoever gave the command; the
        // guest already drew its own.
        for event in snapshot.vfx_events {
            if event.kind != EffectKind::MoveMarker {
                sink.emit(event);
            }
        }

        trace!(tick = snapshot.tick, ?correction, "Snapshot applied");
        self.last_tick = Some(snapshot.tick);
    }

    /// Winner implied by a knockout in the mirrored state. Checked in the
    /// host's order: the host's `Local` is this side's `Remote`.
    fn knockout(&self) -> Option<Side> {
        if !self.world.entity(Side::Remote).is_alive() {
            Some(Side::Local)
        } else if !self.world.entity(Side::Local).is_alive() {
            Some(Side::Remote)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::HostSession;
    use crate::message::encode;
    use crate::observer::{MatchOutcome, OutcomeRecorder};
    use crate::transport::LoopbackTransport;
    use arena_common::{AbilityKey, Vec2};
    use arena_sim::{ArenaLayout, EffectEvent, NullSink, Roster, SimConfig};

    fn mirror(local: &str, remote: &str) -> World {
        let roster = Roster::builtin();
        World::new(
            SimConfig::default(),
            ArenaLayout::colosseum(),
            roster.get(local).expect("local"),
            roster.get(remote).expect("remote"),
        )
    }

    fn pair() -> (HostSession<LoopbackTransport>, GuestSession<LoopbackTransport>) {
        let (a, b) = LoopbackTransport::pair(256);
        let config = SyncConfig::default();
        let host = HostSession::new(mirror("kratos", "lyra"), a, config.clone());
        let guest = GuestSession::new(mirror("lyra", "kratos"), b, &config);
        (host, guest)
    }

    fn run(
        host: &mut HostSession<LoopbackTransport>,
        guest: &mut GuestSession<LoopbackTransport>,
        steps: usize,
        observers: &mut (OutcomeRecorder, OutcomeRecorder),
    ) {
        for _ in 0..steps {
            host.step(&mut NullSink, &mut observers.0);
            guest.step(&mut NullSink, &mut observers.1);
        }
    }

    fn snapshot_at(host: &HostSession<LoopbackTransport>, tick: u64) -> Vec<u8> {
        let mut snapshot = Snapshot::capture(host.world(), Vec::new());
        snapshot.tick = tick;
        encode(&Message::BattleSync(snapshot)).expect("encode")
    }

    #[test]
    fn test_first_snapshot_flips_sides() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());

        run(&mut host, &mut guest, 1, &mut observers);

        // The guest's own combatant is the host's Remote.
        let own = guest.world().entity(Side::Local);
        assert_eq!(own.template.id, "lyra");
        assert_eq!(own.position, host.world().entity(Side::Remote).position);
        assert_eq!(
            guest.world().entity(Side::Remote).position,
            host.world().entity(Side::Local).position
        );
        assert_eq!(guest.snap_count(), 1);
        assert_eq!(guest.last_tick(), Some(1));
    }

    #[test]
    fn test_move_is_predicted_and_forwarded() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        host.world_mut().skip_countdown();
        run(&mut host, &mut guest, 1, &mut observers);

        let target = Vec2::new(900.0, 600.0);
        guest.queue(Intent::Move { target });
        let before = guest.world().entity(Side::Local).position;
        guest.step(&mut NullSink, &mut observers.1);

        // Moved locally before the host has seen the command.
        assert_eq!(guest.world().entity(Side::Local).target, target);
        assert_ne!(guest.world().entity(Side::Local).position, before);

        host.step(&mut NullSink, &mut observers.0);
        assert_eq!(host.world().entity(Side::Remote).target, target);
    }

    #[test]
    fn test_cast_is_not_resolved_locally() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        host.world_mut().skip_countdown();
        run(&mut host, &mut guest, 1, &mut observers);

        let mana = guest.world().entity(Side::Local).stats.mana;
        guest.queue(Intent::Cast {
            key: AbilityKey::A,
            target: Vec2::new(150.0, 400.0),
        });
        guest.step(&mut NullSink, &mut observers.1);
        assert_eq!(guest.world().entity(Side::Local).stats.mana, mana);
        assert!(guest.world().projectiles().is_empty());

        // Host resolves it; the next snapshot carries the result.
        run(&mut host, &mut guest, 3, &mut observers);
        assert!(guest.world().entity(Side::Local).stats.mana < mana);
        assert!(guest
            .world()
            .projectiles()
            .iter()
            .any(|p| p.owner == Side::Local && p.damage == 70.0));
    }

    #[test]
    fn test_stale_snapshot_dropped() {
        let (host, b) = {
            let (a, b) = LoopbackTransport::pair(16);
            (HostSession::new(mirror("kratos", "lyra"), a, SyncConfig::default()), b)
        };
        let (mut to_guest, guest_end) = LoopbackTransport::pair(16);
        drop(b);
        let mut guest = GuestSession::new(mirror("lyra", "kratos"), guest_end, &SyncConfig::default());
        let mut observer = OutcomeRecorder::new();

        to_guest.send(snapshot_at(&host, 5)).expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(guest.last_tick(), Some(5));

        to_guest.send(snapshot_at(&host, 3)).expect("send");
        to_guest.send(snapshot_at(&host, 5)).expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(guest.last_tick(), Some(5));

        to_guest.send(snapshot_at(&host, 9)).expect("send");
        to_guest.send(snapshot_at(&host, 7)).expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(guest.last_tick(), Some(9));
    }

    #[test]
    fn test_drift_snaps_then_blends() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        run(&mut host, &mut guest, 1, &mut observers);
        let snaps = guest.snap_count();

        // Authority moves the guest far away: one snapshot snaps it.
        let far = Vec2::new(600.0, 650.0);
        host.world_mut().entity_mut(Side::Remote).position = far;
        host.world_mut().entity_mut(Side::Remote).target = far;
        run(&mut host, &mut guest, 3, &mut observers);
        assert!(guest.world().entity(Side::Local).position.distance(far) < 1e-3);
        assert_eq!(guest.snap_count(), snaps + 1);

        // Small drift closes monotonically.
        let near = far + Vec2::new(40.0, 0.0);
        host.world_mut().entity_mut(Side::Remote).position = near;
        host.world_mut().entity_mut(Side::Remote).target = near;
        let mut last = f32::MAX;
        for _ in 0..10 {
            run(&mut host, &mut guest, 3, &mut observers);
            let error = guest.world().entity(Side::Local).position.distance(near);
            assert!(error <= last);
            last = error;
        }
        assert!(last < 5.0);
        assert_eq!(guest.snap_count(), snaps + 1);
    }

    #[test]
    fn test_battle_over_flips_winner() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        host.world_mut().skip_countdown();
        run(&mut host, &mut guest, 1, &mut observers);

        host.world_mut().entity_mut(Side::Local).stats.hp = 0.0;
        run(&mut host, &mut guest, 2, &mut observers);

        assert_eq!(observers.0.outcome(), Some(MatchOutcome::Winner(Side::Remote)));
        assert_eq!(observers.1.outcome(), Some(MatchOutcome::Winner(Side::Local)));
        assert_eq!(observers.1.count(), 1);
        assert_eq!(guest.status(), SessionStatus::Finished(Side::Local));
        assert_eq!(guest.world().winner(), Some(Side::Local));
        assert_eq!(guest.world().entity(Side::Remote).stats.hp, 0.0);
    }

    #[test]
    fn test_host_close_aborts_guest() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        run(&mut host, &mut guest, 2, &mut observers);

        host.close(&mut observers.0);
        run(&mut host, &mut guest, 2, &mut observers);

        assert_eq!(
            observers.0.outcome(),
            Some(MatchOutcome::Aborted(AbortReason::LocalClose))
        );
        assert_eq!(
            observers.1.outcome(),
            Some(MatchOutcome::Aborted(AbortReason::ChannelClosed))
        );
        assert_eq!(observers.1.count(), 1);
    }

    #[test]
    fn test_snapshot_effects_reach_sink_without_markers() {
        let (host, b) = {
            let (a, b) = LoopbackTransport::pair(16);
            (HostSession::new(mirror("kratos", "lyra"), a, SyncConfig::default()), b)
        };
        let (mut to_guest, guest_end) = LoopbackTransport::pair(16);
        drop(b);
        let mut guest = GuestSession::new(mirror("lyra", "kratos"), guest_end, &SyncConfig::default());
        let mut observer = OutcomeRecorder::new();
        let marker = EffectEvent::new(EffectKind::MoveMarker, Vec2::new(300.0, 400.0), "#fff", 10.0, 250.0);
        let blast = EffectEvent::new(EffectKind::Explosion, Vec2::new(500.0, 400.0), "#f80", 60.0, 400.0);
        let snapshot = Snapshot::capture(host.world(), vec![marker, blast.clone()]);
        to_guest
            .send(encode(&Message::BattleSync(snapshot)).expect("encode"))
            .expect("send");
        let mut fx: Vec<EffectEvent> = Vec::new();

        guest.step(&mut fx, &mut observer);

        assert_eq!(fx, vec![blast]);
    }

    #[test]
    fn test_own_move_marker_drawn_once() {
        let (mut host, mut guest) = pair();
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        host.world_mut().skip_countdown();
        run(&mut host, &mut guest, 1, &mut observers);
        let mut fx: Vec<EffectEvent> = Vec::new();

        guest.queue(Intent::Move {
            target: Vec2::new(900.0, 200.0),
        });
        for _ in 0..6 {
            host.step(&mut NullSink, &mut observers.0);
            guest.step(&mut fx, &mut observers.1);
        }

        let markers = fx.iter().filter(|e| e.kind == EffectKind::MoveMarker).count();
        assert_eq!(markers, 1);
    }

    #[test]
    fn test_host_dash_reaches_guest_prediction() {
        let (a, b) = LoopbackTransport::pair(256);
        let config = SyncConfig::default();
        let roster = Roster::builtin();
        let world = || {
            World::new(
                SimConfig::default(),
                ArenaLayout::open(),
                roster.get("kratos").expect("kratos"),
                roster.get("kratos").expect("kratos"),
            )
        };
        let mut host = HostSession::new(world(), a, config.clone());
        let mut guest = GuestSession::new(world(), b, &config);
        let mut observers = (OutcomeRecorder::new(), OutcomeRecorder::new());
        host.world_mut().skip_countdown();
        run(&mut host, &mut guest, 1, &mut observers);

        guest.queue(Intent::Move {
            target: Vec2::new(1050.0, 100.0),
        });
        run(&mut host, &mut guest, 120, &mut observers);
        guest.queue(Intent::Cast {
            key: AbilityKey::D,
            target: Vec2::new(550.0, 100.0),
        });
        run(&mut host, &mut guest, 240, &mut observers);

        let authoritative = host.world().entity(Side::Remote);
        let predicted = guest.world().entity(Side::Local);
        assert!(authoritative.position.x < 800.0, "dash happened on the host");
        assert!(predicted.position.distance(authoritative.position) < 1.0);
        assert_eq!(predicted.target, authoritative.target);
    }

    #[test]
    fn test_unconfirmed_move_defers_to_host() {
        let (host, b) = {
            let (a, b) = LoopbackTransport::pair(16);
            (HostSession::new(mirror("kratos", "lyra"), a, SyncConfig::default()), b)
        };
        let (mut to_guest, guest_end) = LoopbackTransport::pair(64);
        drop(b);
        let mut guest = GuestSession::new(mirror("lyra", "kratos"), guest_end, &SyncConfig::default());
        let mut observer = OutcomeRecorder::new();
        let host_target = host.world().entity(Side::Remote).target;

        guest.queue(Intent::Move {
            target: Vec2::new(700.0, 700.0),
        });
        guest.step(&mut NullSink, &mut observer);

        // Snapshots that predate the move leave the prediction alone.
        to_guest.send(snapshot_at(&host, 1)).expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(guest.world().entity(Side::Local).target, Vec2::new(700.0, 700.0));

        // The move never arrives; past the timeout the host's target wins.
        for _ in 0..40 {
            guest.step(&mut NullSink, &mut observer);
        }
        to_guest.send(snapshot_at(&host, 2)).expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(guest.world().entity(Side::Local).target, host_target);
    }

    #[test]
    fn test_knockout_in_snapshot_ends_match() {
        let (mut host, b) = {
            let (a, b) = LoopbackTransport::pair(16);
            (HostSession::new(mirror("kratos", "lyra"), a, SyncConfig::default()), b)
        };
        let (mut to_guest, guest_end) = LoopbackTransport::pair(16);
        drop(b);
        let mut guest = GuestSession::new(mirror("lyra", "kratos"), guest_end, &SyncConfig::default());
        let mut observer = OutcomeRecorder::new();
        host.world_mut().entity_mut(Side::Local).stats.hp = 0.0;

        // No battle_over: the knockout alone settles it.
        to_guest.send(snapshot_at(&host, 8)).expect("send");
        guest.step(&mut NullSink, &mut observer);

        assert_eq!(observer.outcome(), Some(MatchOutcome::Winner(Side::Local)));
        assert_eq!(guest.status(), SessionStatus::Finished(Side::Local));

        // A late battle_over is not reported again.
        to_guest
            .send(encode(&Message::BattleOver { winner_side: Side::Remote }).expect("encode"))
            .expect("send");
        guest.step(&mut NullSink, &mut observer);
        assert_eq!(observer.count(), 1);
    }
}
