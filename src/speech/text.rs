/*!
 * Text preparation for speech synthesis.
 */

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters the voice engines read aloud instead of treating as formatting
const MARKUP_CHARS: &[char] = &['*'];

/// Boundaries a spoken part may end on, strongest first in practice
static PAUSE_BOUNDARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.!?;:,\n…。，、！？]+").expect("pause boundary pattern is valid")
});

/// Remove emphasis markup before synthesis
pub fn clean_for_speech(text: &str) -> String {
    text.chars().filter(|c| !MARKUP_CHARS.contains(c)).collect()
}

/// Whether a fragment has anything a voice engine would pronounce
fn is_speakable(fragment: &str) -> bool {
    fragment.chars().any(|c| c.is_alphanumeric())
}

/// Cut a fragment longer than `max_chars` at the last space that fits, or hard at the limit
fn minimize(fragment: &str, max_chars: usize, out: &mut Vec<String>) {
    let mut rest = fragment.trim();

    while rest.chars().count() > max_chars {
        let limit = rest.char_indices().nth(max_chars).map(|(i, _)| i).unwrap_or(rest.len());
        let cut = match rest[..limit].rfind(char::is_whitespace) {
            Some(space) if space > 0 => space,
            _ => limit,
        };
        let (head, tail) = rest.split_at(cut);
        if is_speakable(head) {
            out.push(head.trim().to_string());
        }
        rest = tail.trim_start();
    }

    if is_speakable(rest) {
        out.push(rest.trim().to_string());
    }
}

/// Split text into parts of at most `max_chars` characters for a length-limited voice API
///
/// Text is first cut after punctuation, overlong fragments are cut at whitespace,
/// and neighbouring fragments are then packed together while they fit.
/// Fragments with nothing speakable are dropped.
pub fn split_for_speech(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);

    let mut fragments = Vec::new();
    let mut last = 0;
    for boundary in PAUSE_BOUNDARY.find_iter(text) {
        minimize(&text[last..boundary.end()], max_chars, &mut fragments);
        last = boundary.end();
    }
    minimize(&text[last..], max_chars, &mut fragments);

    let mut parts: Vec<String> = Vec::new();
    for fragment in fragments {
        match parts.last_mut() {
            Some(current) if current.chars().count() + 1 + fragment.chars().count() <= max_chars => {
                current.push(' ');
                current.push_str(&fragment);
            }
            _ => parts.push(fragment),
        }
    }

    parts
}
