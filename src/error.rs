use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the page collaborators (media element, caption surface)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MediaError {
    #[error("Seek to {position:.2}s failed: {reason}")]
    Seek { position: f64, reason: String },

    #[error("Setting playback rate to {rate} failed: {reason}")]
    PlaybackRate { rate: f64, reason: String },

    #[error("Setting muted={muted} failed: {reason}")]
    Mute { muted: bool, reason: String },

    #[error("Play request rejected: {0}")]
    PlayRejected(String),

    #[error("Pause failed: {0}")]
    Pause(String),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid replay setting: {0}")]
    Invalid(String),
}

/// Caption trace loading errors
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Failed to read trace file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid trace JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Cue {index} ends before it starts ({start:.2}s..{end:.2}s)")]
    InvertedCue { index: usize, start: f64, end: f64 },

    #[error("Initial position {position:.2}s is outside 0..={duration:.2}s")]
    PositionOutOfRange { position: f64, duration: f64 },
}
