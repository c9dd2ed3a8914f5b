//! Rewind-and-replay transcript reconstruction
//!
//! Captions for a moment that already played are gone from the page. To
//! recover them the controller rewinds the media element, replays the window
//! muted at high speed while the caption surface is observed, and then puts
//! the element back exactly as it was.
//!
//! # Session phases
//! `Idle -> CapturingSnapshot -> SeekingAndPlaying -> Waiting -> Restoring -> Done`
//!
//! Every phase after the snapshot ends in `Restoring`, including failed
//! seeks, panics and dropped futures.

mod observer;
mod restore;
mod state;

pub use observer::{start_observation, ObservationHandle};
pub use state::ReplayState;

use crate::config::ReplayConfig;
use crate::error::MediaError;
use crate::media::{MediaElement, MediaSnapshot, PlayerPage, ReplayWindow};
use crate::response::FinalTranscript;
use observer::snapshot_accumulator;
use restore::RestoreGuard;
use state::{advance, SharedStateLog, StateLog};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Drives replay sessions against one page
///
/// Sessions on the same page must not overlap; callers serialize requests
/// (see [`crate::bridge::CaptionBridge`]).
pub struct ReplayController<P: PlayerPage> {
    page: Arc<P>,
    config: ReplayConfig,
    state: SharedStateLog,
}

impl<P: PlayerPage> ReplayController<P> {
    pub fn new(page: Arc<P>, config: ReplayConfig) -> Self {
        Self {
            page,
            config,
            state: Arc::new(Mutex::new(StateLog::default())),
        }
    }

    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Phase of the current (or last) session
    pub fn state(&self) -> ReplayState {
        match self.state.lock() {
            Ok(log) => log.current(),
            Err(poisoned) => poisoned.into_inner().current(),
        }
    }

    /// Phases the last session went through, in order
    pub fn last_transitions(&self) -> Vec<ReplayState> {
        match self.state.lock() {
            Ok(log) => log.history(),
            Err(poisoned) => poisoned.into_inner().history(),
        }
    }

    /// Reconstruct the captions of the last `window_seconds` of playback
    ///
    /// Never fails: missing collaborators and empty captures both yield the
    /// "no record" sentinel, and replay errors are logged.
    #[tracing::instrument(skip(self))]
    pub async fn replay_window(&self, window_seconds: f64) -> FinalTranscript {
        let Some(media) = self.page.media() else {
            warn!("No media element on page");
            return FinalTranscript::no_record();
        };
        let Some(surface) = self.page.caption_surface() else {
            warn!("No caption container on page");
            return FinalTranscript::no_record();
        };
        let toggle = self.page.caption_toggle();

        match self.state.lock() {
            Ok(mut log) => log.begin(),
            Err(poisoned) => poisoned.into_inner().begin(),
        }
        advance(&self.state, ReplayState::CapturingSnapshot);

        let snapshot = MediaSnapshot::capture(media.as_ref(), toggle.as_deref());
        let window = ReplayWindow::ending_at(snapshot.position, window_seconds);
        info!(
            position = snapshot.position,
            start_time = window.start_time,
            span = window.span,
            captions_enabled = snapshot.captions_enabled,
            "Starting caption replay"
        );

        let mut guard = RestoreGuard::new(media.clone(), toggle, snapshot, self.state.clone());
        guard.enable_captions();

        let observation = start_observation(surface);
        let accumulator = observation.accumulator();
        guard.attach_observation(observation);

        if let Err(e) = self.play_window(media.as_ref(), window).await {
            warn!("Replay error: {}", e);
        }

        guard.restore();

        let result = snapshot_accumulator(&accumulator).finish();
        info!(
            ok = result.ok,
            chars = result.text.len(),
            "Caption replay finished"
        );
        result
    }

    /// Seek to the window start, play it fast and wait for it to pass
    async fn play_window(&self, media: &P::Media, window: ReplayWindow) -> Result<(), MediaError> {
        advance(&self.state, ReplayState::SeekingAndPlaying);

        media.set_muted(true)?;
        media.set_playback_rate(self.config.playback_rate)?;
        media.set_current_time(window.start_time)?;

        // Captions often render from the seek alone
        if let Err(e) = media.play().await {
            debug!("Play request rejected, relying on seek: {}", e);
        }

        advance(&self.state, ReplayState::Waiting);
        let wait = window.wait_duration(
            media.playback_rate(),
            Duration::from_millis(self.config.settle_margin_ms),
        );
        debug!(wait_ms = wait.as_millis() as u64, "Waiting for replay");
        sleep(wait).await;

        Ok(())
    }
}
