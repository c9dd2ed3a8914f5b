//! Incremental merging of caption snapshots into one transcript
//!
//! Caption renderers redraw a growing line word by word, occasionally flicker
//! back to an older shorter fragment, and jump to unrelated lines when the
//! captions scroll. Each snapshot is classified against the last one seen and
//! only genuinely new text reaches the transcript.

use super::clean::normalize_whitespace;
use super::dedupe::dedupe_sentences;
use crate::response::FinalTranscript;
use tracing::debug;

/// How a single caption snapshot was folded into the transcript
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Nothing readable on the surface (renderer mid-transition)
    Empty,
    /// The snapshot already appears in the transcript
    AlreadyCaptured,
    /// Same text as the previous snapshot
    Unchanged,
    /// The previous line kept growing; only the new tail was appended
    Extended { tail: String },
    /// A shorter, older fragment of the previous line was redrawn
    Regressed,
    /// An unrelated line; appended whole
    Appended,
}

/// Running transcript for one replay session
#[derive(Debug, Default, Clone)]
pub struct TranscriptAccumulator {
    full_transcript: String,
    last_chunk: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything captured so far
    pub fn full_transcript(&self) -> &str {
        &self.full_transcript
    }

    /// The most recent snapshot that moved the transcript forward
    pub fn last_chunk(&self) -> &str {
        &self.last_chunk
    }

    /// Fold one cleaned caption snapshot into the transcript
    ///
    /// Re-delivering the same visual state is a no-op, so batched or repeated
    /// mutation notifications are harmless.
    pub fn observe(&mut self, cleaned: &str) -> MergeOutcome {
        if cleaned.is_empty() {
            return MergeOutcome::Empty;
        }

        let current = self.full_transcript.trim();
        if !current.is_empty() && current.contains(cleaned) {
            return MergeOutcome::AlreadyCaptured;
        }

        if cleaned == self.last_chunk {
            return MergeOutcome::Unchanged;
        }

        // The 2x length guard keeps an unrelated line that merely shares a
        // prefix from being read as a continuation.
        if !self.last_chunk.is_empty()
            && cleaned.starts_with(self.last_chunk.as_str())
            && cleaned.chars().count() <= self.last_chunk.chars().count() * 2
        {
            let tail = cleaned[self.last_chunk.len()..].trim().to_string();
            if !tail.is_empty() {
                self.full_transcript = join_trimmed(current, &tail);
            }
            self.last_chunk = cleaned.to_string();
            debug!(tail = %tail, "Caption line extended");
            return MergeOutcome::Extended { tail };
        }

        if !self.last_chunk.is_empty() && self.last_chunk.contains(cleaned) {
            return MergeOutcome::Regressed;
        }

        self.full_transcript = join_trimmed(current, cleaned);
        self.last_chunk = cleaned.to_string();
        debug!(chunk = %cleaned, "Caption line appended");
        MergeOutcome::Appended
    }

    /// Produce the final result for the session
    ///
    /// Returns the "no record" sentinel when nothing was captured.
    pub fn finish(&self) -> FinalTranscript {
        let text = normalize_whitespace(&self.full_transcript);
        if text.is_empty() {
            return FinalTranscript::no_record();
        }
        FinalTranscript::captured(dedupe_sentences(&text))
    }
}

fn join_trimmed(current: &str, addition: &str) -> String {
    format!("{} {}", current, addition).trim().to_string()
}
