//! Row filtering for tables.

use kafkalens_types::ConsumedMessage;

/// Longest cell text shown before truncation.
pub const MAX_CELL_CHARS: usize = 100;

/// Marker appended to truncated cells.
pub const ELLIPSIS: &str = "...";

/// Case-insensitive substring match. An empty filter matches everything.
pub fn matches_filter(candidate: &str, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    candidate.to_lowercase().contains(&filter.to_lowercase())
}

/// Check a message against the fuzzy filter.
///
/// A message matches when any of offset, partition, key schema id, value
/// schema id, key or value contains the filter text.
pub fn message_matches(message: &ConsumedMessage, filter: &str) -> bool {
    if filter.is_empty() {
        return true;
    }
    let needle = filter.to_lowercase();
    let contains = |s: &str| s.to_lowercase().contains(&needle);

    contains(&message.offset.to_string())
        || contains(&message.partition.to_string())
        || message.key_schema_id.is_some_and(|id| contains(&id.to_string()))
        || message.value_schema_id.is_some_and(|id| contains(&id.to_string()))
        || contains(&message.key)
        || contains(&message.value)
}

/// Shorten `text` to [`MAX_CELL_CHARS`] characters plus [`ELLIPSIS`].
pub fn truncate_cell(text: &str) -> String {
    match text.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}
