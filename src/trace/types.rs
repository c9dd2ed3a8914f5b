//! Caption trace file format

use crate::error::TraceError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One caption line shown between `start` and `end` (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    pub start: f64,
    pub end: f64,
    /// Text of each caption segment node while the cue is on screen
    pub segments: Vec<String>,
}

impl Cue {
    pub fn is_active_at(&self, position: f64) -> bool {
        self.start <= position && position < self.end
    }
}

fn default_rate() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

/// A recorded video with its caption timeline and the player state at the
/// moment the question is asked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionTrace {
    pub duration: f64,
    pub position: f64,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "default_rate")]
    pub playback_rate: f64,
    #[serde(default)]
    pub captions_enabled: bool,
    /// Whether the player exposes a captions button
    #[serde(default = "default_true")]
    pub has_toggle: bool,
    /// Whether the page has a caption container at all
    #[serde(default = "default_true")]
    pub has_caption_surface: bool,
    /// Reject every play request (autoplay blocked)
    #[serde(default)]
    pub play_fails: bool,
    #[serde(default)]
    pub cues: Vec<Cue>,
}

impl CaptionTrace {
    pub fn from_json(contents: &str) -> Result<Self, TraceError> {
        let trace: CaptionTrace = serde_json::from_str(contents)?;
        trace.validate()?;
        Ok(trace)
    }

    pub fn from_path(path: &Path) -> Result<Self, TraceError> {
        let contents = fs::read_to_string(path).map_err(|e| TraceError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&contents)
    }

    fn validate(&self) -> Result<(), TraceError> {
        if !(0.0..=self.duration).contains(&self.position) {
            return Err(TraceError::PositionOutOfRange {
                position: self.position,
                duration: self.duration,
            });
        }
        for (index, cue) in self.cues.iter().enumerate() {
            if cue.end < cue.start {
                return Err(TraceError::InvertedCue {
                    index,
                    start: cue.start,
                    end: cue.end,
                });
            }
        }
        Ok(())
    }

    /// Segments on screen at `position`, in cue order
    pub fn segments_at(&self, position: f64) -> Vec<String> {
        self.cues
            .iter()
            .filter(|cue| cue.is_active_at(position))
            .flat_map(|cue| cue.segments.iter().cloned())
            .collect()
    }
}
