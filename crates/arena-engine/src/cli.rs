//! Command-line interface for the match runner.

use clap::Parser;
use std::path::PathBuf;

use crate::config::{EngineConfig, MatchMode, CONFIG_FILE};

/// Headless arena duel runner
#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Run an arena duel headless and print the winner")]
#[command(version)]
pub struct Args {
    /// TOML config file
    #[arg(long, value_name = "CONFIG_FILE", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Override the match mode
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Override the local character id
    #[arg(long)]
    pub local: Option<String>,

    /// Override the remote character id
    #[arg(long)]
    pub remote: Option<String>,

    /// Override the arena layout id
    #[arg(long)]
    pub arena: Option<String>,

    /// Override the AI seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Pace the loop against the wall clock
    #[arg(long)]
    pub realtime: bool,

    /// Write the effective config to this path and exit
    #[arg(long, value_name = "OUTPUT_PATH")]
    pub write_config: Option<PathBuf>,
}

/// Match mode as a CLI value.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeArg {
    /// AI opponent
    Solo,
    /// Host and guest over an in-process link
    Loopback,
}

impl Args {
    /// Apply command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut EngineConfig) {
        if let Some(mode) = self.mode {
            config.mode = match mode {
                ModeArg::Solo => MatchMode::Solo,
                ModeArg::Loopback => MatchMode::Loopback,
            };
        }
        if let Some(local) = &self.local {
            config.local_character.clone_from(local);
        }
        if let Some(remote) = &self.remote {
            config.remote_character.clone_from(remote);
        }
        if let Some(arena) = &self.arena {
            config.arena.clone_from(arena);
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.realtime {
            config.realtime = true;
        }
    }
}

/// Parse process arguments.
pub fn parse_args() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "arena", "--mode", "loopback", "--remote", "lyra", "--seed", "9",
        ]);
        let mut config = EngineConfig::default();

        args.apply(&mut config);

        assert_eq!(config.mode, MatchMode::Loopback);
        assert_eq!(config.remote_character, "lyra");
        assert_eq!(config.local_character, "kratos");
        assert_eq!(config.seed, Some(9));
        assert_eq!(args.config, PathBuf::from(CONFIG_FILE));
    }
}
