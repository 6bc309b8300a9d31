use {
    bevy::prelude::*,
    serde::{Deserialize, Serialize},
    std::{fs, path::Path},
    thiserror::Error,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read session config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse session config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid session config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Startup tunables for a session. Read once; a running session never
/// picks up changes.
#[derive(Resource, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Resource)]
#[serde(default)]
pub struct SessionConfig {
    pub total_puzzles: u32,
    pub starting_lives: u32,
    /// Seconds of play before the run is lost.
    pub max_game_time: f32,
    /// Delay between a non-fatal catch and guards resuming their patrol.
    pub caught_recovery_secs: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            total_puzzles: 9,
            starting_lives: 3,
            max_game_time: 600.0,
            caught_recovery_secs: 2.0,
        }
    }
}

impl SessionConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_ron_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_puzzles == 0 {
            return Err(ConfigError::Invalid {
                field: "total_puzzles",
                reason: "must be positive",
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::Invalid {
                field: "starting_lives",
                reason: "must be positive",
            });
        }
        if !self.max_game_time.is_finite() || self.max_game_time <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "max_game_time",
                reason: "must be a positive number of seconds",
            });
        }
        if !self.caught_recovery_secs.is_finite() || self.caught_recovery_secs < 0.0 {
            return Err(ConfigError::Invalid {
                field: "caught_recovery_secs",
                reason: "must not be negative",
            });
        }
        Ok(())
    }
}
