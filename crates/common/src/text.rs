//! Character-safe text helpers shared by the fetcher, the critic and the CLI.

/// First `max_chars` characters of `text`, cut on a char boundary.
///
/// Always a prefix of the input; nothing is summarized or reordered.
pub fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Display preview: the excerpt plus `...` when the text was cut.
pub fn preview(markdown: &str, max_chars: usize) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let cut = excerpt(markdown, max_chars);
    if cut.len() < markdown.len() {
        format!("{}...", cut)
    } else {
        markdown.to_string()
    }
}

/// Like [`preview`] but for single-line labels such as URLs in listings.
pub fn shorten(label: &str, max_chars: usize) -> String {
    preview(label.trim(), max_chars)
}
