//! Engine configuration.
//!
//! Selects the match to run and carries the simulation, AI, sync and link
//! tunables as nested tables. Configuration can be loaded from and saved to
//! a TOML file.

use arena_net::{LinkConfig, SyncConfig};
use arena_sim::{AiConfig, SimConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Configuration file name.
pub const CONFIG_FILE: &str = "arena.toml";

/// How the second combatant is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// AI opponent, simulated in-process
    #[default]
    Solo,
    /// Host and guest sessions connected by an in-process lossy link
    Loopback,
}

/// Engine configuration parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Match ===
    /// Solo or loopback
    pub mode: MatchMode,
    /// Character id for the local side
    pub local_character: String,
    /// Character id for the remote side
    pub remote_character: String,
    /// Arena layout id
    pub arena: String,
    /// Seed for both AI controllers (None = fixed default)
    pub seed: Option<u64>,

    // === Data ===
    /// RON roster replacing the built-in characters
    pub roster_path: Option<PathBuf>,
    /// RON list of arena layouts replacing the built-in set
    pub arenas_path: Option<PathBuf>,

    // === Pacing ===
    /// Pace the loop against the wall clock instead of running flat out
    pub realtime: bool,
    /// Frame length in milliseconds
    pub frame_ms: f32,
    /// Give up after this many simulated seconds
    pub max_match_secs: u32,

    // === Tunables ===
    /// Simulation tunables
    pub sim: SimConfig,
    /// AI tunables
    pub ai: AiConfig,
    /// Host/guest sync tunables
    pub sync: SyncConfig,
    /// Simulated network conditions (loopback mode)
    pub link: LinkConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Solo,
            local_character: String::from("kratos"),
            remote_character: String::from("ignis"),
            arena: String::from("colosseum"),
            seed: None,

            roster_path: None,
            arenas_path: None,

            realtime: false,
            frame_ms: 1000.0 / 60.0,
            max_match_secs: 300,

            sim: SimConfig::default(),
            ai: AiConfig::default(),
            sync: SyncConfig::default(),
            link: LinkConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a specific path.
    /// Returns default config if file doesn't exist or is invalid.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            info!("Config file not found, using defaults");
            return Self::default();
        }

        match fs::File::open(path) {
            Ok(mut file) => {
                let mut contents = String::new();
                if let Err(e) = file.read_to_string(&mut contents) {
                    warn!("Failed to read config file: {e}");
                    return Self::default();
                }

                match toml::from_str::<Self>(&contents) {
                    Ok(mut config) => {
                        info!("Loaded config from {}", path.display());
                        config.validate();
                        config
                    },
                    Err(e) => {
                        warn!("Failed to parse config file: {e}");
                        Self::default()
                    },
                }
            },
            Err(e) => {
                warn!("Failed to open config file: {e}");
                Self::default()
            },
        }
    }

    /// Save configuration to a specific path.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let mut file = fs::File::create(path)?;
        file.write_all(contents.as_bytes())?;

        info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Validate and clamp configuration values to sensible ranges.
    pub fn validate(&mut self) {
        self.frame_ms = self.frame_ms.clamp(1.0, 250.0);
        self.max_match_secs = self.max_match_secs.clamp(1, 3600);

        self.sim.validate();
        self.ai.validate();
        self.sync.validate();
        self.link.validate();
    }

    /// AI config for one side, with the configured seed mixed in.
    #[must_use]
    pub fn ai_for(&self, salt: u64) -> AiConfig {
        let base = self.seed.unwrap_or(self.ai.seed);
        self.ai.clone().with_seed(base.wrapping_add(salt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.mode, MatchMode::Solo);
        assert_eq!(config.arena, "colosseum");
        assert_eq!(config.sync.snapshot_interval_ms, 50.0);
        assert!(!config.realtime);
    }

    #[test]
    fn test_config_validation() {
        let mut config = EngineConfig::default();
        config.frame_ms = 0.0;
        config.max_match_secs = 0;
        config.sync.blend = 5.0;
        config.ai.decision_every = 0;

        config.validate();

        assert_eq!(config.frame_ms, 1.0);
        assert_eq!(config.max_match_secs, 1);
        assert_eq!(config.sync.blend, 1.0);
        assert_eq!(config.ai.decision_every, 1);
    }

    #[test]
    fn test_config_save_load() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join(CONFIG_FILE);

        let mut config = EngineConfig::default();
        config.mode = MatchMode::Loopback;
        config.remote_character = String::from("vesper");
        config.seed = Some(12345);
        config.link.latency_ms = 120.0;

        config.save_to(&config_path).expect("Failed to save config");

        let loaded = EngineConfig::load_from(&config_path);
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(
            &config_path,
            "mode = \"loopback\"\n\n[sync]\nsnap_threshold = 120.0\n",
        )
        .expect("write");

        let loaded = EngineConfig::load_from(&config_path);

        assert_eq!(loaded.mode, MatchMode::Loopback);
        assert_eq!(loaded.sync.snap_threshold, 120.0);
        assert_eq!(loaded.sync.blend, 0.2);
        assert_eq!(loaded.sim.countdown_ms, 1200.0);
    }

    #[test]
    fn test_config_load_missing_file() {
        let config = EngineConfig::load_from("/nonexistent/path/arena.toml");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "mode = 42").expect("write");

        assert_eq!(EngineConfig::load_from(&config_path), EngineConfig::default());
    }

    #[test]
    fn test_ai_seed_override() {
        let mut config = EngineConfig::default();
        config.seed = Some(100);
        assert_eq!(config.ai_for(1).seed, 101);
        assert_eq!(config.ai_for(2).seed, 102);
    }
}
