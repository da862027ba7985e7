//! # Arena Engine
//!
//! Headless runner for two-combatant arena duels.
//!
//! This crate ties together:
//! - Sim: combat simulation and the AI opponent
//! - Net: host-authoritative sync over an in-process link
//! - Config: TOML engine config with command-line overrides

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod cli;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("arena=info".parse()?)
                .add_directive("arena_engine=info".parse()?)
                .add_directive("arena_sim=info".parse()?)
                .add_directive("arena_net=info".parse()?),
        )
        .init();

    let args = cli::parse_args();

    info!("Arena starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = EngineConfig::load_from(&args.config);
    args.apply(&mut config);
    config.validate();

    if let Some(path) = &args.write_config {
        config.save_to(path)?;
        return Ok(());
    }

    let report = app::run(&config)?;
    println!("{report}");

    info!("Arena shutdown complete");
    Ok(())
}
