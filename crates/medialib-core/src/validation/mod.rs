//! Input normalisation for form text.

/// Maximum number of tags kept from one input.
pub const MAX_TAGS: usize = 50;

/// Parse comma-separated tag text into an ordered set: entries are trimmed, empty entries
/// dropped, and later duplicates removed while keeping first-seen order.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if tags.len() == MAX_TAGS {
            tracing::debug!(max = MAX_TAGS, "tag list truncated");
            break;
        }
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}

/// Trimmed value, or `None` when the input is empty or whitespace.
pub fn non_blank(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
