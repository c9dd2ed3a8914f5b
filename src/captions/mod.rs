//! Caption text handling
//!
//! Cleans raw caption readings, stitches successive snapshots into a single
//! transcript and removes repeated sentences from the result.

mod clean;
mod dedupe;
mod stitcher;

pub use clean::{clean_caption_text, normalize_whitespace, read_caption_text, MIN_CAPTION_CHARS};
pub use dedupe::{dedupe_sentences, split_sentences};
pub use stitcher::{MergeOutcome, TranscriptAccumulator};
