//! Sentence boundary detection used by the chunker.
//!
//! A boundary sits right after a run of terminal punctuation (`.`, `!`, `?`,
//! optionally followed by closing quotes or brackets) when whitespace comes
//! next, and right after every paragraph break. A lone `.` after a common
//! abbreviation or a single capital initial (other than the pronoun `I`) is
//! not a boundary. The end of the
//! text is always a boundary.
//!
//! Offsets returned here are character offsets, matching `Node` spans.

use once_cell::sync::Lazy;
use regex::Regex;

static TERMINAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([.!?]+["'\x{201D}\x{2019})\]]*)\s"#).expect("terminal punctuation pattern")
});

static PARAGRAPH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n\s*").expect("paragraph break pattern"));

const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "vs", "etc", "e.g", "i.e",
];

/// Sorted, deduplicated character offsets at which a sentence ends.
///
/// Empty text has no boundaries; otherwise the last element is the text's
/// character length.
pub fn sentence_boundaries(text: &str) -> Vec<usize> {
    if text.is_empty() {
        return Vec::new();
    }
    let mut byte_offsets = Vec::new();
    for caps in TERMINAL.captures_iter(text) {
        let Some(run) = caps.get(1) else { continue };
        let punct = run.as_str().trim_end_matches(|c: char| !matches!(c, '.' | '!' | '?'));
        if punct == "." && ends_with_abbreviation(&text[..run.start()]) {
            continue;
        }
        byte_offsets.push(run.end());
    }
    for m in PARAGRAPH.find_iter(text) {
        byte_offsets.push(m.end());
    }
    byte_offsets.push(text.len());
    byte_offsets.sort_unstable();
    byte_offsets.dedup();
    to_char_offsets(text, &byte_offsets)
}

fn ends_with_abbreviation(before: &str) -> bool {
    let token = before.rsplit(char::is_whitespace).next().unwrap_or("");
    let token = token.trim_start_matches(|c: char| !c.is_alphanumeric());
    if token.is_empty() {
        return false;
    }
    let mut chars = token.chars();
    if let (Some(first), None) = (chars.next(), chars.next()) {
        return first.is_uppercase() && first != 'I';
    }
    ABBREVIATIONS.iter().any(|a| a.eq_ignore_ascii_case(token))
}

fn to_char_offsets(text: &str, sorted_bytes: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(sorted_bytes.len());
    let mut targets = sorted_bytes.iter().copied().peekable();
    let positions = text.char_indices().map(|(b, _)| b).chain(std::iter::once(text.len()));
    for (char_idx, byte_idx) in positions.enumerate() {
        while targets.peek() == Some(&byte_idx) {
            out.push(char_idx);
            targets.next();
        }
        if targets.peek().is_none() {
            break;
        }
    }
    out
}
