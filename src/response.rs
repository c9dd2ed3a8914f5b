//! Result of a transcript reconstruction

use serde::{Deserialize, Serialize};

/// Placeholder text reported when no caption text could be recovered
pub const NO_RECORD: &str = "no record";

/// Terminal output of one replay session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalTranscript {
    pub ok: bool,
    pub text: String,
}

impl FinalTranscript {
    /// No usable caption data
    pub fn no_record() -> Self {
        Self {
            ok: false,
            text: NO_RECORD.to_string(),
        }
    }

    /// A reconstructed transcript
    pub fn captured(text: String) -> Self {
        Self { ok: true, text }
    }

    pub fn is_no_record(&self) -> bool {
        !self.ok && self.text == NO_RECORD
    }
}
