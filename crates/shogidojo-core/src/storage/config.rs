//! TOML-based application configuration.
//!
//! Holds the operator-tunable gamification rules:
//! - hearts budget (capacity and recovery interval)
//! - day-boundary offset for streak evaluation
//!
//! The defaults are the production values (10 hearts, 1 hour per heart,
//! UTC+9 day boundary). Configuration is stored at
//! `~/.config/shogidojo/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clock::{GameClock, DEFAULT_UTC_OFFSET_HOURS};
use crate::error::ConfigError;
use crate::hearts::{HeartsRules, DEFAULT_MAX_HEARTS, RECOVERY_INTERVAL_MS};

use super::data_dir;

/// Hearts budget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeartsConfig {
    #[serde(default = "default_max_count")]
    pub max_count: u32,
    #[serde(default = "default_recovery_minutes")]
    pub recovery_minutes: i64,
}

/// Day-boundary configuration for streak evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/shogidojo/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub hearts: HeartsConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

fn default_max_count() -> u32 {
    DEFAULT_MAX_HEARTS
}
fn default_recovery_minutes() -> i64 {
    RECOVERY_INTERVAL_MS / 60_000
}
fn default_utc_offset_hours() -> i32 {
    DEFAULT_UTC_OFFSET_HOURS
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            max_count: default_max_count(),
            recovery_minutes: default_recovery_minutes(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hearts: HeartsConfig::default(),
            clock: ClockConfig::default(),
        }
    }
}

impl Config {
    /// Path to the configuration file.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/shogidojo"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from disk, creating a default file if none exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }

    /// Load, falling back to defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Hearts rules derived from this configuration.
    pub fn hearts_rules(&self) -> HeartsRules {
        HeartsRules {
            default_max: self.hearts.max_count.max(1),
            recovery_interval_ms: self.hearts.recovery_minutes.saturating_mul(60_000).max(1),
        }
    }

    /// Server-side game clock derived from this configuration.
    pub fn game_clock(&self) -> GameClock {
        GameClock::system(self.clock.utc_offset_hours)
    }
}
