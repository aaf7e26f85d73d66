//! Prefix suggestions over the name index

use crate::index::NameIndex;

/// Maximum number of suggestions shown at once
pub const SUGGESTION_LIMIT: usize = 8;

/// Case-insensitive prefix matches for `input`, in index order, at most [`SUGGESTION_LIMIT`].
///
/// Input is trimmed first; empty input yields no suggestions.
pub fn suggest(input: &str, index: &NameIndex) -> Vec<String> {
    let query = input.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }

    index
        .names()
        .iter()
        .filter(|name| name.to_lowercase().starts_with(&query))
        .take(SUGGESTION_LIMIT)
        .cloned()
        .collect()
}
