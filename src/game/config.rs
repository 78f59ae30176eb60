use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::field_constants::{DEFAULT_INTENSITY, DEFAULT_WIDTH};
use crate::core::FieldError;
use crate::operations::Environment;
use crate::walk::CoinType;

/// Builtin config, embedded at compile time.
pub const BUILTIN_GAME_CONFIG: &str = include_str!("data/game_config.json");

/// Environment variable naming a JSON file that overrides the builtin config.
pub const CONFIG_PATH_ENV: &str = "QFIELD_CONFIG_PATH";

/// Settings for one game, loaded from JSON. Missing keys take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of grid columns, and so the length of the field vector.
    pub width: usize,
    /// Rows to clear for a win.
    pub rows: usize,
    /// Misses allowed before the game is lost.
    pub lives: u32,
    /// Seconds per turn before the field collapses on its own.
    pub turn_timer_secs: u32,
    /// Flattens the reset peak; clamped into `[0, 19]` by the engine.
    pub difficulty: f64,
    /// Blend weight of the gate's global mix.
    pub mix_intensity: f64,
    /// Largest distance from the player's column that still counts as a hit.
    pub coherence_radius: usize,
    /// Points per hit, multiplied by the current streak.
    pub streak_bonus: u64,
    /// Fixed seed for reproducible games; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Remote walk lookups.
    pub remote: RemoteConfig,
    /// Effects applied after every gate.
    pub environment: Environment,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            rows: 8,
            lives: 3,
            turn_timer_secs: 5,
            difficulty: 8.0,
            mix_intensity: DEFAULT_INTENSITY,
            coherence_radius: 1,
            streak_bonus: 10,
            seed: None,
            remote: RemoteConfig::default(),
            environment: Environment::default(),
        }
    }
}

impl GameConfig {
    /// The config embedded in the crate.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_GAME_CONFIG).expect("builtin game config should parse")
    }

    /// Parses a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Loads the file named by `QFIELD_CONFIG_PATH`, falling back to the
    /// builtin config (with a warning) when it is unset, unreadable or invalid.
    pub fn load_from_env() -> Self {
        let Some(path) = env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) else {
            return Self::builtin();
        };
        match Self::from_file(&path).and_then(|config| config.validate().map(|()| config).map_err(ConfigError::from)) {
            Ok(config) => {
                tracing::info!(target: "qfield::config", path = %path.display(), "game_config.loaded");
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: "qfield::config",
                    path = %path.display(),
                    error = %err,
                    "game_config.load_failed"
                );
                Self::builtin()
            }
        }
    }

    /// Rejects settings no game can run with.
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.width == 0 || self.rows == 0 || self.lives == 0 {
            return Err(FieldError::invalid(format!(
                "width ({}), rows ({}) and lives ({}) must all be at least 1",
                self.width, self.rows, self.lives
            )));
        }
        self.environment.validate(self.width)
    }

    /// `remote.timeout_ms` as a `Duration`.
    pub fn remote_timeout(&self) -> Duration {
        Duration::from_millis(self.remote.timeout_ms)
    }
}

/// How and whether the session asks the walk service for a row's vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Off by default; the local vector is always available.
    pub enabled: bool,
    /// Walk steps requested per row.
    pub steps: u32,
    /// Coin the walk uses.
    pub coin: CoinType,
    /// Angles for the biased and custom coins.
    pub custom_coin_angles: Vec<f64>,
    /// Deadline for one lookup, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            steps: 6,
            coin: CoinType::Hadamard,
            custom_coin_angles: Vec::new(),
            timeout_ms: 750,
        }
    }
}

/// Why a config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("game config rejected: {0}")]
    Invalid(#[from] FieldError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::EnvironmentEffect;

    #[test]
    fn builtin_matches_defaults() {
        assert_eq!(GameConfig::builtin(), GameConfig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() -> Result<(), ConfigError> {
        let config = GameConfig::from_json_str(
            r#"{"width": 6, "seed": 7, "remote": {"enabled": true}, "environment": [{"kind": "portal", "from": 0, "to": 5, "fraction": 0.25}]}"#,
        )?;
        assert_eq!(config.width, 6);
        assert_eq!(config.seed, Some(7));
        assert!(config.remote.enabled);
        assert_eq!(config.remote.timeout_ms, 750);
        assert_eq!(config.lives, 3);
        assert_eq!(
            config.environment.effects(),
            &[EnvironmentEffect::Portal { from: 0, to: 5, fraction: 0.25 }]
        );
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn validate_rejects_out_of_grid_environment() -> Result<(), ConfigError> {
        let config = GameConfig::from_json_str(r#"{"width": 4, "environment": [{"kind": "deco_field", "column": 4, "retention": 0.5}]}"#)?;
        assert!(matches!(config.validate(), Err(FieldError::InvalidArgument { .. })));
        Ok(())
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = GameConfig::from_file(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn garbage_is_parse_error() {
        assert!(matches!(GameConfig::from_json_str("{width"), Err(ConfigError::Parse(_))));
    }
}
