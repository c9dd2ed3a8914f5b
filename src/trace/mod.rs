//! Simulated player driven by a recorded caption trace
//!
//! Stands in for a real page when checking the stitching heuristics against
//! recorded renderer behaviour. The player renders the cues active at its
//! position (only while captions are on), announces every change on its
//! caption surface, and advances its position while playing.

mod types;

pub use types::{CaptionTrace, Cue};

use crate::error::MediaError;
use crate::media::{CaptionSurface, CaptionToggle, MediaElement, PlayerPage, SurfaceMutation};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

/// Wall-clock interval between position updates while playing
const TICK: Duration = Duration::from_millis(50);

/// Capacity of the mutation channel
const MUTATION_BUFFER: usize = 256;

#[derive(Debug)]
struct PlayerState {
    position: f64,
    rate: f64,
    paused: bool,
    muted: bool,
    captions_on: bool,
    rendered: Vec<String>,
    ticking: bool,
}

/// Player state visible from outside, for reporting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerStatus {
    pub position: f64,
    pub playback_rate: f64,
    pub paused: bool,
    pub muted: bool,
    pub captions_on: bool,
}

/// A media element, caption surface and captions button backed by a trace
pub struct TracePlayer {
    this: Weak<TracePlayer>,
    trace: CaptionTrace,
    state: Mutex<PlayerState>,
    mutations: broadcast::Sender<SurfaceMutation>,
}

impl TracePlayer {
    pub fn new(trace: CaptionTrace) -> Arc<Self> {
        let (mutations, _) = broadcast::channel(MUTATION_BUFFER);
        let mut state = PlayerState {
            position: trace.position,
            rate: trace.playback_rate,
            paused: trace.paused,
            muted: trace.muted,
            captions_on: trace.captions_enabled,
            rendered: Vec::new(),
            ticking: false,
        };
        state.rendered = if state.captions_on {
            trace.segments_at(state.position)
        } else {
            Vec::new()
        };

        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            trace,
            state: Mutex::new(state),
            mutations,
        })
    }

    pub fn status(&self) -> PlayerStatus {
        let state = self.lock_state();
        PlayerStatus {
            position: state.position,
            playback_rate: state.rate,
            paused: state.paused,
            muted: state.muted,
            captions_on: state.captions_on,
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, PlayerState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Re-render the caption surface and announce it if the text changed
    fn rerender(&self, state: &mut PlayerState) {
        let segments = if state.captions_on {
            self.trace.segments_at(state.position)
        } else {
            Vec::new()
        };
        if segments != state.rendered {
            debug!(position = state.position, ?segments, "Caption surface changed");
            state.rendered = segments;
            // No subscribers is fine; nobody is watching the captions
            let _ = self.mutations.send(SurfaceMutation::ChildList);
        }
    }

    /// Advance playback one tick; returns false once playback stopped
    fn tick(&self) -> bool {
        let mut state = self.lock_state();
        if state.paused {
            state.ticking = false;
            return false;
        }

        state.position = (state.position + state.rate * TICK.as_secs_f64()).min(self.trace.duration);
        if state.position >= self.trace.duration {
            state.paused = true;
            info!("Trace playback reached the end");
        }
        self.rerender(&mut state);
        true
    }

    /// Advance playback on a timer until paused or dropped
    fn start_ticker(&self) {
        let player = self.this.clone();
        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK, TICK);
            loop {
                ticks.tick().await;
                let Some(player) = player.upgrade() else {
                    break;
                };
                if !player.tick() {
                    break;
                }
            }
        });
    }
}

/// Handle through which the replay engine drives a [`TracePlayer`]
#[derive(Clone)]
pub struct TracePage {
    player: Arc<TracePlayer>,
}

impl TracePage {
    pub fn new(player: Arc<TracePlayer>) -> Self {
        Self { player }
    }
}

impl PlayerPage for TracePage {
    type Media = TracePlayer;
    type Surface = TracePlayer;
    type Toggle = TracePlayer;

    fn media(&self) -> Option<Arc<TracePlayer>> {
        Some(self.player.clone())
    }

    fn caption_surface(&self) -> Option<Arc<TracePlayer>> {
        self.player
            .trace
            .has_caption_surface
            .then(|| self.player.clone())
    }

    fn caption_toggle(&self) -> Option<Arc<TracePlayer>> {
        self.player.trace.has_toggle.then(|| self.player.clone())
    }
}

#[async_trait]
impl MediaElement for TracePlayer {
    fn current_time(&self) -> f64 {
        self.lock_state().position
    }

    fn set_current_time(&self, seconds: f64) -> Result<(), MediaError> {
        if !seconds.is_finite() {
            return Err(MediaError::Seek {
                position: seconds,
                reason: "position is not finite".to_string(),
            });
        }
        let mut state = self.lock_state();
        state.position = seconds.clamp(0.0, self.trace.duration);
        self.rerender(&mut state);
        Ok(())
    }

    fn playback_rate(&self) -> f64 {
        self.lock_state().rate
    }

    fn set_playback_rate(&self, rate: f64) -> Result<(), MediaError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(MediaError::PlaybackRate {
                rate,
                reason: "rate must be positive".to_string(),
            });
        }
        self.lock_state().rate = rate;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.lock_state().paused
    }

    fn is_muted(&self) -> bool {
        self.lock_state().muted
    }

    fn set_muted(&self, muted: bool) -> Result<(), MediaError> {
        self.lock_state().muted = muted;
        Ok(())
    }

    fn pause(&self) -> Result<(), MediaError> {
        self.lock_state().paused = true;
        Ok(())
    }

    async fn play(&self) -> Result<(), MediaError> {
        if self.trace.play_fails {
            return Err(MediaError::PlayRejected("play() not allowed".to_string()));
        }
        let needs_ticker = {
            let mut state = self.lock_state();
            state.paused = false;
            !std::mem::replace(&mut state.ticking, true)
        };
        if needs_ticker {
            self.start_ticker();
        }
        Ok(())
    }
}

impl CaptionSurface for TracePlayer {
    fn segment_texts(&self) -> Vec<String> {
        self.lock_state().rendered.clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SurfaceMutation> {
        self.mutations.subscribe()
    }
}

impl CaptionToggle for TracePlayer {
    fn pressed(&self) -> Option<bool> {
        Some(self.lock_state().captions_on)
    }

    fn click(&self) {
        let mut state = self.lock_state();
        state.captions_on = !state.captions_on;
        info!(captions_on = state.captions_on, "Captions button clicked");
        self.rerender(&mut state);
    }
}
