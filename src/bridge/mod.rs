//! Request/response bridge between the page UI and the replay engine
//!
//! The UI posts `{ source: "WHATSTHAT", type: "WT_GET_YT_LAST10" }` and gets
//! back `{ source: "WHATSTHAT", type: "WT_YT_LAST10", ok, text }`. The bridge
//! never fails; at worst it answers with the "no record" placeholder.

mod install;
mod messages;

pub use install::{InstallGuard, CAPTION_HOOK};
pub use messages::{
    subtitle_text, BridgeRequest, BridgeResponse, TranscriptMessage, GET_LAST_TEN, LAST_TEN,
    MESSAGE_SOURCE, PING,
};

use crate::config::ReplayConfig;
use crate::media::PlayerPage;
use crate::replay::ReplayController;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Answers caption requests for one page, one replay at a time
pub struct CaptionBridge<P: PlayerPage> {
    controller: ReplayController<P>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the replay ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl<P: PlayerPage> CaptionBridge<P> {
    pub fn new(page: Arc<P>, config: ReplayConfig) -> Self {
        Self {
            controller: ReplayController::new(page, config),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Answer a request
    ///
    /// A caption request that arrives while a replay is running is dropped
    /// without a reply, since two replays would corrupt each other's restore.
    pub async fn handle(&self, request: BridgeRequest) -> Option<BridgeResponse> {
        match request {
            BridgeRequest::Ping => Some(BridgeResponse::Pong { ok: true }),
            BridgeRequest::LastTen => {
                if self
                    .in_flight
                    .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    warn!("Caption replay already in flight, ignoring request");
                    return None;
                }
                let _in_flight = InFlight(&self.in_flight);

                let window = self.controller.config().window_seconds;
                let result = self.controller.replay_window(window).await;
                Some(BridgeResponse::Transcript(result.into()))
            }
        }
    }

    /// Answer a raw page message; unrelated messages get no reply
    pub async fn handle_message(&self, message: &Value) -> Option<Value> {
        let request = BridgeRequest::parse(message)?;
        info!(?request, "Bridge request");
        let response = self.handle(request).await?;
        Some(response.to_message())
    }
}

/// Install the caption bridge for this process
///
/// Only the first call creates a bridge; later calls return `None`, the way a
/// page script refuses to hook itself in twice.
pub fn install_caption_hook<P: PlayerPage>(
    page: Arc<P>,
    config: ReplayConfig,
) -> Option<CaptionBridge<P>> {
    install_with(&CAPTION_HOOK, page, config)
}

fn install_with<P: PlayerPage>(
    guard: &InstallGuard,
    page: Arc<P>,
    config: ReplayConfig,
) -> Option<CaptionBridge<P>> {
    if !guard.try_install() {
        return None;
    }
    info!("Seek-based caption hook installed");
    Some(CaptionBridge::new(page, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::fake::{play_script, FakePage};
    use crate::response::NO_RECORD;
    use serde_json::json;
    use std::time::Duration;

    fn bridge(page: FakePage) -> (Arc<FakePage>, Arc<CaptionBridge<FakePage>>) {
        let page = Arc::new(page);
        let bridge = Arc::new(CaptionBridge::new(page.clone(), ReplayConfig::default()));
        (page, bridge)
    }

    #[tokio::test(start_paused = true)]
    async fn test_caption_request_round_trip() {
        let (page, bridge) = bridge(FakePage::playing_at(42.0));
        play_script(page.fake_surface(), vec![(100, "What was that?"), (300, "A bird.")]);

        let reply = bridge
            .handle_message(&json!({ "source": "WHATSTHAT", "type": "WT_GET_YT_LAST10" }))
            .await;

        assert_eq!(
            reply,
            Some(json!({
                "source": "WHATSTHAT",
                "type": "WT_YT_LAST10",
                "ok": true,
                "text": "What was that? A bird."
            }))
        );
        assert!(!bridge.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_video_reports_no_record() {
        let mut page = FakePage::playing_at(42.0);
        page.media = None;
        let (_page, bridge) = bridge(page);

        let reply = bridge.handle(BridgeRequest::LastTen).await;
        let Some(BridgeResponse::Transcript(message)) = reply else {
            panic!("expected a transcript reply, got {reply:?}");
        };
        assert!(!message.ok);
        assert_eq!(message.text, NO_RECORD);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ping() {
        let (_page, bridge) = bridge(FakePage::playing_at(1.0));
        let reply = bridge.handle_message(&json!({ "type": "WT_PING" })).await;
        assert_eq!(reply, Some(json!({ "ok": true })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_foreign_messages_get_no_reply() {
        let (page, bridge) = bridge(FakePage::playing_at(42.0));
        let reply = bridge
            .handle_message(&json!({ "source": "OTHER", "type": "WT_GET_YT_LAST10" }))
            .await;
        assert_eq!(reply, None);
        assert!(page.fake_media().seeks.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_request_is_ignored() {
        let (page, bridge) = bridge(FakePage::playing_at(42.0));
        play_script(page.fake_surface(), vec![(100, "Only one replay")]);

        let first = {
            let bridge = bridge.clone();
            tokio::spawn(async move { bridge.handle(BridgeRequest::LastTen).await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(bridge.is_busy());

        let second = bridge.handle(BridgeRequest::LastTen).await;
        assert_eq!(second, None);

        let first = first.await.unwrap();
        let Some(BridgeResponse::Transcript(message)) = first else {
            panic!("expected a transcript reply, got {first:?}");
        };
        assert_eq!(message.text, "Only one replay");
        assert_eq!(page.fake_media().seeks.lock().unwrap().len(), 2);
        assert!(!bridge.is_busy());
    }

    #[test]
    fn test_install_with_guard_once() {
        let guard = InstallGuard::new();
        let page = Arc::new(FakePage::playing_at(0.0));
        assert!(install_with(&guard, page.clone(), ReplayConfig::default()).is_some());
        assert!(install_with(&guard, page, ReplayConfig::default()).is_none());
    }
}
