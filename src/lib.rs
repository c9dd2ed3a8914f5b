//! Transient transcript reconstruction for streaming video
//!
//! Answers "what was just said?" for a player that only shows the caption
//! line currently on screen: the last few seconds are replayed muted at high
//! speed, the caption surface is stitched into one transcript, and the player
//! is put back the way it was.

pub mod bridge;
pub mod captions;
pub mod config;
pub mod error;
pub mod media;
pub mod replay;
pub mod response;
pub mod trace;

pub use bridge::{install_caption_hook, BridgeRequest, BridgeResponse, CaptionBridge};
pub use config::{load_config, Config, ReplayConfig};
pub use error::{ConfigError, MediaError, TraceError};
pub use replay::{ReplayController, ReplayState};
pub use response::{FinalTranscript, NO_RECORD};
