//! Message shapes exchanged with the page UI

use crate::response::{FinalTranscript, NO_RECORD};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag carried by every message that belongs to this assistant
pub const MESSAGE_SOURCE: &str = "WHATSTHAT";

/// Request type asking for the last ten seconds of captions
pub const GET_LAST_TEN: &str = "WT_GET_YT_LAST10";

/// Response type carrying the reconstructed captions
pub const LAST_TEN: &str = "WT_YT_LAST10";

/// Liveness probe sent before talking to the page
pub const PING: &str = "WT_PING";

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    source: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

/// A request the bridge knows how to answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeRequest {
    /// Reconstruct the captions of the last window
    LastTen,
    Ping,
}

impl BridgeRequest {
    /// Recognize a request among arbitrary page messages
    ///
    /// Caption requests must carry the assistant's source tag; anything else
    /// posted on the page is not ours and yields `None`.
    pub fn parse(message: &Value) -> Option<Self> {
        let envelope: Envelope = serde_json::from_value(message.clone()).ok()?;
        match envelope.kind.as_str() {
            GET_LAST_TEN if envelope.source.as_deref() == Some(MESSAGE_SOURCE) => {
                Some(BridgeRequest::LastTen)
            }
            PING => Some(BridgeRequest::Ping),
            _ => None,
        }
    }

    pub fn to_message(self) -> Value {
        let kind = match self {
            BridgeRequest::LastTen => GET_LAST_TEN,
            BridgeRequest::Ping => PING,
        };
        serde_json::json!({ "source": MESSAGE_SOURCE, "type": kind })
    }
}

/// Reply to a caption request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub ok: bool,
    pub text: String,
}

impl From<FinalTranscript> for TranscriptMessage {
    fn from(result: FinalTranscript) -> Self {
        Self {
            source: MESSAGE_SOURCE.to_string(),
            kind: LAST_TEN.to_string(),
            ok: result.ok,
            text: result.text,
        }
    }
}

/// Reply produced by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BridgeResponse {
    Transcript(TranscriptMessage),
    Pong { ok: bool },
}

impl BridgeResponse {
    pub fn to_message(&self) -> Value {
        // Both variants are plain string/bool records
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// The caption text the sidebar should display for a page message
///
/// Returns `None` for messages that are not caption replies. A failed or
/// empty reply shows the "no record" placeholder.
pub fn subtitle_text(message: &Value) -> Option<String> {
    if message.get("source").and_then(Value::as_str) != Some(MESSAGE_SOURCE)
        || message.get("type").and_then(Value::as_str) != Some(LAST_TEN)
    {
        return None;
    }

    let ok = message.get("ok").and_then(Value::as_bool).unwrap_or(false);
    let text = match message.get("text").and_then(Value::as_str) {
        Some(text) if ok && !text.is_empty() => text,
        _ => NO_RECORD,
    };
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_caption_request() {
        let msg = json!({ "source": "WHATSTHAT", "type": "WT_GET_YT_LAST10" });
        assert_eq!(BridgeRequest::parse(&msg), Some(BridgeRequest::LastTen));
    }

    #[test]
    fn test_foreign_source_is_ignored() {
        let msg = json!({ "source": "SOMEONE_ELSE", "type": "WT_GET_YT_LAST10" });
        assert_eq!(BridgeRequest::parse(&msg), None);
        let msg = json!({ "type": "WT_GET_YT_LAST10" });
        assert_eq!(BridgeRequest::parse(&msg), None);
    }

    #[test]
    fn test_unknown_and_malformed_messages() {
        assert_eq!(BridgeRequest::parse(&json!({ "source": "WHATSTHAT", "type": "WT_TOGGLE" })), None);
        assert_eq!(BridgeRequest::parse(&json!("hello")), None);
        assert_eq!(BridgeRequest::parse(&json!({ "source": "WHATSTHAT" })), None);
    }

    #[test]
    fn test_ping_without_source() {
        assert_eq!(BridgeRequest::parse(&json!({ "type": "WT_PING" })), Some(BridgeRequest::Ping));
    }

    #[test]
    fn test_request_message_shape() {
        assert_eq!(
            BridgeRequest::LastTen.to_message(),
            json!({ "source": "WHATSTHAT", "type": "WT_GET_YT_LAST10" })
        );
    }

    #[test]
    fn test_transcript_response_shape() {
        let response =
            BridgeResponse::Transcript(FinalTranscript::captured("Hi there.".to_string()).into());
        assert_eq!(
            response.to_message(),
            json!({ "source": "WHATSTHAT", "type": "WT_YT_LAST10", "ok": true, "text": "Hi there." })
        );
    }

    #[test]
    fn test_pong_shape() {
        assert_eq!(BridgeResponse::Pong { ok: true }.to_message(), json!({ "ok": true }));
    }

    #[test]
    fn test_subtitle_text() {
        let ok = json!({ "source": "WHATSTHAT", "type": "WT_YT_LAST10", "ok": true, "text": "Said this." });
        assert_eq!(subtitle_text(&ok).as_deref(), Some("Said this."));

        let failed = json!({ "source": "WHATSTHAT", "type": "WT_YT_LAST10", "ok": false, "text": "no record" });
        assert_eq!(subtitle_text(&failed).as_deref(), Some(NO_RECORD));

        let empty = json!({ "source": "WHATSTHAT", "type": "WT_YT_LAST10", "ok": true, "text": "" });
        assert_eq!(subtitle_text(&empty).as_deref(), Some(NO_RECORD));

        let not_text = json!({ "source": "WHATSTHAT", "type": "WT_YT_LAST10", "ok": true, "text": 5 });
        assert_eq!(subtitle_text(&not_text).as_deref(), Some(NO_RECORD));

        let other = json!({ "source": "WHATSTHAT", "type": "WT_GET_YT_LAST10" });
        assert_eq!(subtitle_text(&other), None);
    }
}
