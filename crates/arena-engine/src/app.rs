//! Match runner.
//!
//! Builds the roster, arena and world from configuration, then runs either
//! a solo match or a host/guest pair over a lossy in-process link until a
//! side wins, the channel closes or the time limit passes.

use anyhow::{Context, Result};
use arena_common::Side;
use arena_net::{
    AbortReason, GuestSession, HostSession, LatencyLink, LinkConfig, LoopbackTransport,
    MatchOutcome, OutcomeRecorder,
};
use arena_sim::{AiController, ArenaLayout, EffectBus, EffectKind, Roster, SimClock, SoloMatch, World};
use std::collections::HashMap;
use std::fs;
use tracing::{debug, info, warn};

use crate::config::{EngineConfig, MatchMode};
use crate::timing::FramePacer;

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// A side won (local perspective)
    Winner(Side),
    /// The channel closed mid-match
    Aborted(AbortReason),
    /// Time limit reached without a winner
    TimedOut,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct MatchReport {
    /// Outcome from the local side's perspective
    pub outcome: RunOutcome,
    /// Simulated seconds
    pub sim_secs: f64,
    /// Simulation ticks
    pub ticks: u64,
    /// Remaining health per side
    pub hp: [f32; 2],
    /// Effects seen, by kind
    pub effects: HashMap<EffectKind, u32>,
}

impl std::fmt::Display for MatchReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.outcome {
            RunOutcome::Winner(side) => write!(f, "{side} wins")?,
            RunOutcome::Aborted(reason) => write!(f, "aborted ({reason})")?,
            RunOutcome::TimedOut => write!(f, "no winner (time limit)")?,
        }
        write!(
            f,
            " after {:.1}s / {} ticks, hp local {:.0} remote {:.0}",
            self.sim_secs, self.ticks, self.hp[0], self.hp[1]
        )
    }
}

/// Run one match as configured.
pub fn run(config: &EngineConfig) -> Result<MatchReport> {
    let roster = load_roster(config)?;
    let arena = load_arena(config)?;
    let local = roster
        .get(&config.local_character)
        .context("local character")?;
    let remote = roster
        .get(&config.remote_character)
        .context("remote character")?;

    info!(
        mode = ?config.mode,
        local = %local.id,
        remote = %remote.id,
        arena = %arena.id,
        "Starting match"
    );

    let report = match config.mode {
        MatchMode::Solo => {
            let world = World::new(config.sim.clone(), arena, local, remote);
            run_solo(config, world)
        },
        MatchMode::Loopback => {
            let host_world = World::new(config.sim.clone(), arena.clone(), local, remote);
            let guest_world = World::new(config.sim.clone(), arena, remote, local);
            run_loopback(config, host_world, guest_world)
        },
    };

    info!(ticks = report.ticks, "Match complete: {report}");
    Ok(report)
}

fn load_roster(config: &EngineConfig) -> Result<Roster> {
    match &config.roster_path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading roster {}", path.display()))?;
            Ok(Roster::from_ron(&source)?)
        },
        None => Ok(Roster::builtin()),
    }
}

fn load_arena(config: &EngineConfig) -> Result<ArenaLayout> {
    match &config.arenas_path {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("reading arenas {}", path.display()))?;
            ArenaLayout::list_from_ron(&source)?
                .into_iter()
                .find(|a| a.id == config.arena)
                .with_context(|| format!("arena {} not in {}", config.arena, path.display()))
        },
        None => Ok(ArenaLayout::builtin(&config.arena)?),
    }
}

/// Tally drained effects by kind.
fn count_effects(bus: &EffectBus, counts: &mut HashMap<EffectKind, u32>) {
    for event in bus.drain() {
        *counts.entry(event.kind).or_default() += 1;
    }
}

fn run_solo(config: &EngineConfig, world: World) -> MatchReport {
    let mut game = SoloMatch::new(world, config.ai_for(2)).with_autopilot(config.ai_for(1));
    let mut pacer = FramePacer::new(config.frame_ms, config.realtime);
    let mut bus = EffectBus::default();
    let mut effects = HashMap::new();

    let outcome = loop {
        let dt = pacer.delta_ms();
        if let Some(winner) = game.advance(dt, &mut bus) {
            count_effects(&bus, &mut effects);
            break RunOutcome::Winner(winner);
        }
        count_effects(&bus, &mut effects);
        if pacer.elapsed_secs() >= f64::from(config.max_match_secs) {
            break RunOutcome::TimedOut;
        }
        pacer.sleep_remainder();
    };
    debug!(avg_frame_ms = pacer.average_frame_ms(), "Solo loop finished");

    let world = game.world();
    MatchReport {
        outcome,
        sim_secs: pacer.elapsed_secs(),
        ticks: world.tick(),
        hp: [
            world.entity(Side::Local).stats.hp,
            world.entity(Side::Remote).stats.hp,
        ],
        effects,
    }
}

fn run_loopback(config: &EngineConfig, host_world: World, guest_world: World) -> MatchReport {
    let (host_end, guest_end) = LoopbackTransport::pair(config.sync.channel_capacity);
    let guest_link = LinkConfig {
        seed: config.link.seed.wrapping_add(1),
        ..config.link.clone()
    };
    let mut host = HostSession::new(
        host_world,
        LatencyLink::new(host_end, config.link.clone()),
        config.sync.clone(),
    );
    let mut guest = GuestSession::new(guest_world, LatencyLink::new(guest_end, guest_link), &config.sync);

    let mut host_ai = AiController::new(Side::Local, config.ai_for(1));
    let mut guest_ai = AiController::new(Side::Local, config.ai_for(2));
    let mut host_seen = OutcomeRecorder::new();
    let mut guest_seen = OutcomeRecorder::new();

    let mut clock = SimClock::from_config(&config.sim);
    let dt_ms = clock.fixed_dt_ms();
    let mut pacer = FramePacer::new(config.frame_ms, config.realtime);
    let mut bus = EffectBus::default();
    let mut effects = HashMap::new();

    // Run until the guest has heard the result too, or the link gives up.
    while guest.status().is_running() {
        for _ in 0..clock.advance(pacer.delta_ms()) {
            if host.status().is_running() {
                for intent in host_ai.think(host.world()) {
                    host.queue(intent);
                }
            }
            for intent in guest_ai.think(guest.world()) {
                guest.queue(intent);
            }

            host.step(&mut bus, &mut host_seen);
            guest.step(&mut bus, &mut guest_seen);

            if let Err(e) = host.transport_mut().advance(dt_ms) {
                debug!(error = %e, "Host link closed");
            }
            if let Err(e) = guest.transport_mut().advance(dt_ms) {
                debug!(error = %e, "Guest link closed");
            }
        }
        count_effects(&bus, &mut effects);

        if pacer.elapsed_secs() >= f64::from(config.max_match_secs) {
            break;
        }
        pacer.sleep_remainder();
    }

    let outcome = match host_seen.outcome() {
        Some(MatchOutcome::Winner(winner)) => RunOutcome::Winner(winner),
        Some(MatchOutcome::Aborted(reason)) => RunOutcome::Aborted(reason),
        None => RunOutcome::TimedOut,
    };
    let expected = match outcome {
        RunOutcome::Winner(winner) => Some(MatchOutcome::Winner(winner.opponent())),
        _ => None,
    };
    if expected.is_some() && guest_seen.outcome() != expected {
        warn!(host = ?host_seen.outcome(), guest = ?guest_seen.outcome(), "Peers disagree on the result");
    }
    info!(
        host_dropped = host.transport().dropped(),
        guest_dropped = guest.transport().dropped(),
        snapshots = host.snapshots_sent(),
        avg_frame_ms = pacer.average_frame_ms(),
        guest_snaps = guest.snap_count(),
        "Link stats"
    );

    let world = host.world();
    MatchReport {
        outcome,
        sim_secs: pacer.elapsed_secs(),
        ticks: world.tick(),
        hp: [
            world.entity(Side::Local).stats.hp,
            world.entity(Side::Remote).stats.hp,
        ],
        effects,
    }
}
