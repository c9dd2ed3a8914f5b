//! Sentence-level deduplication of a merged transcript

use std::collections::HashSet;

/// Split text into sentences after `.`, `!` or `?` followed by whitespace
///
/// Terminators without trailing whitespace ("3.14", "e.g.x") do not split.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            let sentence = text[start..idx].trim();
            if !sentence.is_empty() {
                sentences.push(sentence);
            }
            // Swallow the whole whitespace run
            let mut next_start = idx + c.len_utf8();
            while let Some(&(next_idx, next)) = chars.peek() {
                if !next.is_whitespace() {
                    break;
                }
                next_start = next_idx + next.len_utf8();
                chars.next();
            }
            start = next_start;
            prev = None;
            continue;
        }
        prev = Some(c);
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest);
    }
    sentences
}

/// Drop repeated sentences, keeping the first occurrence
///
/// Sentences are compared case-insensitively and rejoined with single spaces.
pub fn dedupe_sentences(text: &str) -> String {
    let mut seen = HashSet::new();
    split_sentences(text)
        .into_iter()
        .filter(|sentence| seen.insert(sentence.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}
