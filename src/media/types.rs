//! Media state captured around a replay

use super::{CaptionToggle, MediaElement};
use std::time::Duration;

/// Kind of change observed on the caption surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceMutation {
    /// Caption nodes were added or removed
    ChildList,
    /// Text inside an existing caption node changed
    CharacterData,
}

/// Media state before a replay, used only to put everything back afterwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaSnapshot {
    pub position: f64,
    pub playback_rate: f64,
    pub paused: bool,
    pub muted: bool,
    /// Captions were already showing; a missing toggle counts as off
    pub captions_enabled: bool,
}

impl MediaSnapshot {
    pub fn capture<M, T>(media: &M, toggle: Option<&T>) -> Self
    where
        M: MediaElement + ?Sized,
        T: CaptionToggle + ?Sized,
    {
        Self {
            position: media.current_time(),
            playback_rate: media.playback_rate(),
            paused: media.is_paused(),
            muted: media.is_muted(),
            captions_enabled: toggle.and_then(|t| t.pressed()).unwrap_or(false),
        }
    }
}

/// The stretch of playback to replay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayWindow {
    /// Where the replay starts, never before the beginning of the media
    pub start_time: f64,
    /// Seconds of media between `start_time` and the original position
    pub span: f64,
}

impl ReplayWindow {
    /// The `window_seconds` leading up to `position`
    pub fn ending_at(position: f64, window_seconds: f64) -> Self {
        let position = position.max(0.0);
        let start_time = (position - window_seconds.max(0.0)).max(0.0);
        Self {
            start_time,
            span: position - start_time,
        }
    }

    /// How long to wait for the span to play out at `playback_rate`, plus a
    /// settle margin for the caption renderer to catch up after the seek
    pub fn wait_duration(&self, playback_rate: f64, settle_margin: Duration) -> Duration {
        let real_time = Duration::try_from_secs_f64(self.span.max(0.0)).unwrap_or_default();
        let play = if playback_rate.is_finite() && playback_rate > 0.0 {
            // A vanishing rate would overflow; play it out in real time instead
            Duration::try_from_secs_f64((self.span / playback_rate).max(0.0)).unwrap_or(real_time)
        } else {
            real_time
        };
        play + settle_margin
    }
}
