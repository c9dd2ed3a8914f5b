//! Replay configuration
//!
//! Defaults come from the embedded `config.toml`. A user override may live in
//! the platform config directory or be passed explicitly on the command line.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_TOML: &str = include_str!("../config.toml");

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub replay: ReplayConfig,
}

/// Timing of a single rewind-and-replay session
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    /// How many seconds of recent playback a bridge request reconstructs
    pub window_seconds: f64,
    /// Playback multiplier used while fast-replaying the window
    pub playback_rate: f64,
    /// Extra wait after the replay so the caption renderer can catch up
    pub settle_margin_ms: u64,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            window_seconds: 10.0,
            playback_rate: 8.0,
            settle_margin_ms: 400,
        }
    }
}

impl ReplayConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.playback_rate.is_finite() || self.playback_rate <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "playback_rate must be positive, got {}",
                self.playback_rate
            )));
        }
        if !self.window_seconds.is_finite() || self.window_seconds < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "window_seconds must be non-negative, got {}",
                self.window_seconds
            )));
        }
        Ok(())
    }
}

impl Config {
    /// Parse a config document and check its replay settings
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.replay.validate()?;
        Ok(config)
    }

    /// Parse a config file from disk
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&contents)
    }

    /// The configuration embedded at build time
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(CONFIG_TOML)
    }
}

/// Path of the optional per-user override file
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("WhatsThat").join("config.toml"))
}

/// Load the effective configuration
///
/// An explicit path must parse. The per-user override is best effort: a broken
/// file is logged and the embedded defaults are used instead.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = explicit {
        let config = Config::from_path(path)?;
        info!("Loaded config from {:?}", path);
        return Ok(config);
    }

    if let Some(path) = user_config_path().filter(|p| p.exists()) {
        match Config::from_path(&path) {
            Ok(config) => {
                info!("Loaded user config from {:?}", path);
                return Ok(config);
            }
            Err(e) => warn!("Ignoring user config {:?}: {}", path, e),
        }
    }

    Config::embedded()
}
