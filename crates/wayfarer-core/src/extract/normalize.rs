//! Strip decorative wrapping from generator output.
//!
//! Chat models like to wrap JSON answers in a markdown code fence
//! (```` ```json ... ``` ````). This module removes one such fence when it
//! wraps the entire text and trims surrounding whitespace. Anything else is
//! returned untouched: no repair, no extraction of JSON from prose.

const FENCE: &str = "```";

/// Normalize raw generator output.
///
/// Removes a single fence whose opening marker is at the very start and whose
/// closing marker is at the very end of the trimmed text, along with an
/// optional info string (e.g. `json`) after the opening marker. Never fails.
pub fn normalize(raw: &str) -> &str {
    let trimmed = raw.trim();
    match strip_fence(trimmed) {
        Some(inner) => inner.trim(),
        None => trimmed,
    }
}

fn strip_fence(text: &str) -> Option<&str> {
    let body = text.strip_prefix(FENCE)?.strip_suffix(FENCE)?;

    let tag_len = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(body.len());

    // The info string only counts when whitespace separates it from the body;
    // otherwise the "tag" is content (e.g. ```true```).
    let rest = &body[tag_len..];
    if tag_len > 0 && rest.starts_with(char::is_whitespace) {
        Some(rest)
    } else {
        Some(body)
    }
}
