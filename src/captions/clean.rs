//! Caption text extraction and cleaning

use crate::media::CaptionSurface;
use once_cell::sync::Lazy;
use regex::Regex;

/// Cleaned captions shorter than this are treated as renderer noise
pub const MIN_CAPTION_CHARS: usize = 3;

/// Player chrome that lives inside the caption container but is not speech
static UI_CHROME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)click\s*for\s*settings",
        r"|\benglish\b",
        r"|subtitles/?\s*closed captions",
        r"|\bsubtitles\b",
        r"|\bclosed captions\b",
        r"|\bauto[-\s]?generated\b",
    ))
    .expect("UI chrome pattern is valid")
});

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]").expect("bracket pattern is valid"));

static BRACED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[^}]+\}").expect("brace pattern is valid"));

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]+\)").expect("paren pattern is valid"));

static DOT_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{2,}").expect("dot pattern is valid"));

/// Collapse every whitespace run to a single space and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Clean one raw caption reading
///
/// Returns an empty string when the text is player chrome (settings prompts,
/// language labels, "subtitles", "auto-generated") or too short to be speech.
/// Annotations such as `[music]`, `{laughs}` and `(applause)` are stripped.
///
/// The result is a fixed point: cleaning it again yields the same string.
pub fn clean_caption_text(raw: &str) -> String {
    let text = normalize_whitespace(raw);
    if text.is_empty() || UI_CHROME.is_match(&text) {
        return String::new();
    }

    let text = text.replace('♪', "");
    let text = TAGS.replace_all(&text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = BRACED.replace_all(&text, "");
    let text = PARENTHESIZED.replace_all(&text, "");
    // Dot runs are collapsed last so that stripping cannot leave a fresh ".."
    let text = DOT_RUNS.replace_all(&text, "…");
    let text = normalize_whitespace(&text);

    // Stripping can splice chrome back together ("sub[x]titles")
    if text.chars().count() < MIN_CAPTION_CHARS || UI_CHROME.is_match(&text) {
        return String::new();
    }

    text
}

/// Read and clean everything currently rendered on the caption surface
///
/// Dedicated caption segments are preferred; renderers that do not use them
/// fall back to their generic text spans.
pub fn read_caption_text<S: CaptionSurface + ?Sized>(surface: &S) -> String {
    let mut nodes = surface.segment_texts();
    if nodes.is_empty() {
        nodes = surface.span_texts();
    }

    let parts: Vec<String> = nodes
        .iter()
        .map(|node| clean_caption_text(node))
        .filter(|cleaned| !cleaned.is_empty())
        .collect();

    normalize_whitespace(&parts.join(" "))
}
