//! UTF-8-safe byte-budget truncation for outgoing embedding requests.

/// Truncate `text` to at most `max_bytes` bytes, never splitting a
/// multi-byte code point. Walks backward from the candidate cut point to
/// the nearest character boundary.
pub fn truncate_to_byte_budget(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut cut = max_bytes;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    &text[..cut]
}
