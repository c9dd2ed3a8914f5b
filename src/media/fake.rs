//! In-memory page collaborators for tests

use super::{CaptionSurface, CaptionToggle, MediaElement, PlayerPage, SurfaceMutation};
use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct FakeMediaState {
    pub position: f64,
    pub rate: f64,
    pub paused: bool,
    pub muted: bool,
}

#[derive(Default)]
pub(crate) struct FakeMedia {
    pub state: Mutex<FakeMediaState>,
    pub seeks: Mutex<Vec<f64>>,
    pub fail_next_seek: AtomicBool,
    /// Fail only the seek with this zero-based index
    pub fail_seek_at: Mutex<Option<usize>>,
    seek_attempts: AtomicUsize,
    pub fail_play: AtomicBool,
    pub fail_rate: AtomicBool,
    pub panic_on_play: AtomicBool,
}

impl Default for FakeMediaState {
    fn default() -> Self {
        Self {
            position: 0.0,
            rate: 1.0,
            paused: true,
            muted: false,
        }
    }
}

impl FakeMedia {
    pub(crate) fn at(position: f64, paused: bool) -> Self {
        let media = Self::default();
        {
            let mut state = media.state.lock().unwrap();
            state.position = position;
            state.paused = paused;
        }
        media
    }

    pub(crate) fn snapshot(&self) -> FakeMediaState {
        *self.state.lock().unwrap()
    }
}

#[async_trait]
impl MediaElement for FakeMedia {
    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().position
    }

    fn set_current_time(&self, seconds: f64) -> Result<(), MediaError> {
        let attempt = self.seek_attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_seek.swap(false, Ordering::SeqCst)
            || *self.fail_seek_at.lock().unwrap() == Some(attempt)
        {
            return Err(MediaError::Seek {
                position: seconds,
                reason: "media not seekable".to_string(),
            });
        }
        self.seeks.lock().unwrap().push(seconds);
        self.state.lock().unwrap().position = seconds;
        Ok(())
    }

    fn playback_rate(&self) -> f64 {
        self.state.lock().unwrap().rate
    }

    fn set_playback_rate(&self, rate: f64) -> Result<(), MediaError> {
        if self.fail_rate.load(Ordering::SeqCst) {
            return Err(MediaError::PlaybackRate {
                rate,
                reason: "rate locked".to_string(),
            });
        }
        self.state.lock().unwrap().rate = rate;
        Ok(())
    }

    fn is_paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn is_muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    fn set_muted(&self, muted: bool) -> Result<(), MediaError> {
        self.state.lock().unwrap().muted = muted;
        Ok(())
    }

    fn pause(&self) -> Result<(), MediaError> {
        self.state.lock().unwrap().paused = true;
        Ok(())
    }

    async fn play(&self) -> Result<(), MediaError> {
        if self.panic_on_play.load(Ordering::SeqCst) {
            panic!("player crashed");
        }
        if self.fail_play.load(Ordering::SeqCst) {
            return Err(MediaError::PlayRejected("autoplay blocked".to_string()));
        }
        self.state.lock().unwrap().paused = false;
        Ok(())
    }
}

pub(crate) struct FakeSurface {
    segments: Mutex<Vec<String>>,
    tx: broadcast::Sender<SurfaceMutation>,
}

impl Default for FakeSurface {
    fn default() -> Self {
        Self {
            segments: Mutex::new(Vec::new()),
            tx: broadcast::channel(64).0,
        }
    }
}

impl FakeSurface {
    pub(crate) fn render(&self, segments: &[&str]) {
        *self.segments.lock().unwrap() = segments.iter().map(|s| s.to_string()).collect();
        let _ = self.tx.send(SurfaceMutation::ChildList);
    }
}

/// Render each line on `surface` `delay_ms` after the script starts
pub(crate) fn play_script(surface: &Arc<FakeSurface>, script: Vec<(u64, &'static str)>) {
    let surface = surface.clone();
    tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for (delay_ms, line) in script {
            tokio::time::sleep_until(start + Duration::from_millis(delay_ms)).await;
            surface.render(&[line]);
        }
    });
}

impl CaptionSurface for FakeSurface {
    fn segment_texts(&self) -> Vec<String> {
        self.segments.lock().unwrap().clone()
    }

    fn subscribe(&self) -> broadcast::Receiver<SurfaceMutation> {
        self.tx.subscribe()
    }
}

#[derive(Default)]
pub(crate) struct FakeToggle {
    pub pressed: AtomicBool,
    pub clicks: AtomicUsize,
}

impl FakeToggle {
    pub(crate) fn with_pressed(pressed: bool) -> Self {
        Self {
            pressed: AtomicBool::new(pressed),
            clicks: AtomicUsize::new(0),
        }
    }

    pub(crate) fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::SeqCst)
    }

    pub(crate) fn click_count(&self) -> usize {
        self.clicks.load(Ordering::SeqCst)
    }
}

impl CaptionToggle for FakeToggle {
    fn pressed(&self) -> Option<bool> {
        Some(self.is_pressed())
    }

    fn click(&self) {
        self.pressed.fetch_xor(true, Ordering::SeqCst);
        self.clicks.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub(crate) struct FakePage {
    pub media: Option<Arc<FakeMedia>>,
    pub surface: Option<Arc<FakeSurface>>,
    pub toggle: Option<Arc<FakeToggle>>,
}

impl FakePage {
    /// A playing video at `position` with captions off
    pub(crate) fn playing_at(position: f64) -> Self {
        Self {
            media: Some(Arc::new(FakeMedia::at(position, false))),
            surface: Some(Arc::new(FakeSurface::default())),
            toggle: Some(Arc::new(FakeToggle::with_pressed(false))),
        }
    }

    pub(crate) fn fake_media(&self) -> &Arc<FakeMedia> {
        self.media.as_ref().expect("page has media")
    }

    pub(crate) fn fake_surface(&self) -> &Arc<FakeSurface> {
        self.surface.as_ref().expect("page has surface")
    }

    pub(crate) fn fake_toggle(&self) -> &Arc<FakeToggle> {
        self.toggle.as_ref().expect("page has toggle")
    }
}

impl PlayerPage for FakePage {
    type Media = FakeMedia;
    type Surface = FakeSurface;
    type Toggle = FakeToggle;

    fn media(&self) -> Option<Arc<FakeMedia>> {
        self.media.clone()
    }

    fn caption_surface(&self) -> Option<Arc<FakeSurface>> {
        self.surface.clone()
    }

    fn caption_toggle(&self) -> Option<Arc<FakeToggle>> {
        self.toggle.clone()
    }
}
