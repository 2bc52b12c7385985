//! TOML-backed configuration for a session.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use gauntlet_core::Playfield;
use gauntlet_system_difficulty::DifficultyTuning;
use gauntlet_system_variants::VariantTuning;
use gauntlet_world::{player::PlayerTuning, pool::PoolConfig, WorldConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::score::ScoringTuning;

/// Default seed used when the configuration does not name one.
pub const DEFAULT_SEED: u64 = 0x5eed;

/// Every tunable of a session. Missing sections fall back to their defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the spawn and variant random streams.
    pub seed: u64,
    /// Visible area and obstacle geometry.
    pub playfield: Playfield,
    /// Obstacle pool sizing.
    pub pool: PoolConfig,
    /// Player physics.
    pub player: PlayerTuning,
    /// Score to speed, gap and variant mapping.
    pub difficulty: DifficultyTuning,
    /// Scheduler cadence.
    pub spawning: SpawnTuning,
    /// Variant behavior parameters.
    pub variants: VariantTuning,
    /// Points and streak rules.
    pub scoring: ScoringTuning,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            playfield: Playfield::default(),
            pool: PoolConfig::default(),
            player: PlayerTuning::default(),
            difficulty: DifficultyTuning::default(),
            spawning: SpawnTuning::default(),
            variants: VariantTuning::default(),
            scoring: ScoringTuning::default(),
        }
    }
}

impl SessionConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Reads and parses a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// World construction parameters carried by this configuration.
    #[must_use]
    pub fn world(&self) -> WorldConfig {
        WorldConfig {
            playfield: self.playfield,
            pool: self.pool,
            player: self.player,
        }
    }
}

/// Scheduler cadence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Time between spawns in milliseconds.
    pub interval_ms: u64,
}

impl SpawnTuning {
    /// Interval as a duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self { interval_ms: 1_500 }
    }
}

/// Failures while loading a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {}", path.display())]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },
    /// The contents are not a valid configuration.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
