const TRUNCATED_MARKER: &str = "\n.[truncated, use the raw facet for the full text]";
pub const MAX_PREVIEW_CONTENT: usize = 40_960;

/// Markdown for the preview facet: trailing whitespace trimmed and cut at
/// `MAX_PREVIEW_CONTENT` bytes on a char boundary.
pub fn prepare_preview_content(markdown: &str) -> String {
    let trimmed = markdown.trim_end();
    if trimmed.len() <= MAX_PREVIEW_CONTENT {
        trimmed.to_string()
    } else {
        let mut end = MAX_PREVIEW_CONTENT;
        while end > 0 && !trimmed.is_char_boundary(end) {
            end -= 1;
        }
        let truncated = &trimmed[..end];
        format!("{truncated}{TRUNCATED_MARKER}")
    }
}
