//! Page collaborators driven during a replay
//!
//! The engine never touches a page directly. A [`PlayerPage`] locates the media
//! element, the caption-rendering surface and the optional caption toggle, and
//! each of those is reached through the traits below.

mod types;

pub use types::{MediaSnapshot, ReplayWindow, SurfaceMutation};

use crate::error::MediaError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A playable media element (the page's `<video>`)
///
/// Setters may fail the way a real element throws; the replay controller logs
/// such failures and carries on.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Current playback position in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64) -> Result<(), MediaError>;

    fn playback_rate(&self) -> f64;
    fn set_playback_rate(&self, rate: f64) -> Result<(), MediaError>;

    fn is_paused(&self) -> bool;

    fn is_muted(&self) -> bool;
    fn set_muted(&self, muted: bool) -> Result<(), MediaError>;

    fn pause(&self) -> Result<(), MediaError>;

    /// Request playback; resolves once the element accepted or rejected it
    async fn play(&self) -> Result<(), MediaError>;
}

/// The container the player renders live captions into
pub trait CaptionSurface: Send + Sync {
    /// Text of each dedicated caption segment node, in render order
    fn segment_texts(&self) -> Vec<String>;

    /// Text of generic span nodes, used when a renderer has no segment nodes
    fn span_texts(&self) -> Vec<String> {
        Vec::new()
    }

    /// Subscribe to child, subtree and text mutations of the surface
    fn subscribe(&self) -> broadcast::Receiver<SurfaceMutation>;
}

/// The player's captions on/off button
pub trait CaptionToggle: Send + Sync {
    /// The button's pressed state; `None` when the attribute is absent
    fn pressed(&self) -> Option<bool>;

    /// Activate the button
    fn click(&self);
}

/// Locates the replay collaborators on the current page
pub trait PlayerPage: Send + Sync {
    type Media: MediaElement + 'static;
    type Surface: CaptionSurface + 'static;
    type Toggle: CaptionToggle + 'static;

    fn media(&self) -> Option<Arc<Self::Media>>;
    fn caption_surface(&self) -> Option<Arc<Self::Surface>>;
    fn caption_toggle(&self) -> Option<Arc<Self::Toggle>>;
}

#[cfg(test)]
pub(crate) mod fake;
