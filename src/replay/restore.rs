//! Guaranteed restoration of media state after a replay

use super::observer::ObservationHandle;
use super::state::{advance, ReplayState, SharedStateLog};
use crate::media::{CaptionToggle, MediaElement, MediaSnapshot};
use std::sync::Arc;
use tracing::{info, warn};

/// Puts the media element back the way the snapshot found it
///
/// Restoration happens once: on the first call to [`RestoreGuard::restore`],
/// or when the guard is dropped on an early return, a panic or a cancelled
/// future. Failures are logged and never propagated.
pub(super) struct RestoreGuard<M: MediaElement, T: CaptionToggle> {
    media: Arc<M>,
    toggle: Option<Arc<T>>,
    snapshot: MediaSnapshot,
    observation: Option<ObservationHandle>,
    captions_toggled_on: bool,
    state: SharedStateLog,
    restored: bool,
}

impl<M: MediaElement, T: CaptionToggle> RestoreGuard<M, T> {
    pub(super) fn new(
        media: Arc<M>,
        toggle: Option<Arc<T>>,
        snapshot: MediaSnapshot,
        state: SharedStateLog,
    ) -> Self {
        Self {
            media,
            toggle,
            snapshot,
            observation: None,
            captions_toggled_on: false,
            state,
            restored: false,
        }
    }

    /// Turn captions on if they were off; they are turned off again on restore
    pub(super) fn enable_captions(&mut self) {
        if self.snapshot.captions_enabled {
            return;
        }
        if let Some(toggle) = &self.toggle {
            toggle.click();
            self.captions_toggled_on = true;
            info!("Captions enabled for replay");
        }
    }

    /// Hand over the observation so restoration stops it first
    pub(super) fn attach_observation(&mut self, observation: ObservationHandle) {
        self.observation = Some(observation);
    }

    pub(super) fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        advance(&self.state, ReplayState::Restoring);

        if let Some(mut observation) = self.observation.take() {
            observation.stop();
        }

        let snapshot = self.snapshot;
        if let Err(e) = self.media.set_playback_rate(snapshot.playback_rate) {
            warn!("Restore error (playback rate): {}", e);
        }
        if let Err(e) = self.media.set_muted(snapshot.muted) {
            warn!("Restore error (muted): {}", e);
        }
        if let Err(e) = self.media.set_current_time(snapshot.position) {
            warn!("Restore error (position): {}", e);
        }
        if snapshot.paused {
            if let Err(e) = self.media.pause() {
                warn!("Restore error (pause): {}", e);
            }
        }

        if self.captions_toggled_on {
            if let Some(toggle) = &self.toggle {
                toggle.click();
                info!("Captions disabled again after replay");
            }
        }

        advance(&self.state, ReplayState::Done);
        info!(
            position = snapshot.position,
            rate = snapshot.playback_rate,
            "Media state restored"
        );
    }
}

impl<M: MediaElement, T: CaptionToggle> Drop for RestoreGuard<M, T> {
    fn drop(&mut self) {
        if !self.restored {
            warn!("Replay ended without explicit restore, restoring on drop");
            self.restore();
        }
    }
}
