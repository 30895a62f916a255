//! Character-safe slicing for prompt material.

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Slice covering `before` characters ahead of `start` through `after`
/// characters past `end`, clamped to the text.
pub fn context_window(text: &str, start: usize, end: usize, before: usize, after: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .take(before)
        .last()
        .map_or(start, |(idx, _)| idx);
    let to = text[end..]
        .char_indices()
        .nth(after)
        .map_or(text.len(), |(idx, _)| end + idx);
    &text[from..to]
}

/// Collapse every whitespace run to a single space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
