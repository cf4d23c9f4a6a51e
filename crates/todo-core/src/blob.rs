//! Serialized form of the to-do list.
//!
//! The blob is a JSON array of `{ "id", "text", "completed", "createdAt" }`
//! objects in list order. There is no version field. A literal `null` decodes
//! to an empty list; anything else that does not parse, or that parses into a
//! list breaking the item invariants, is rejected as corrupt.

use crate::error::{CorruptData, StorageError};
use crate::model::TodoItem;
use std::collections::HashSet;

/// Serialize `items` into the persisted blob.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(items: &[TodoItem]) -> Result<String, StorageError> {
    Ok(serde_json::to_string(items)?)
}

/// Parse a persisted blob back into items, checking list invariants.
///
/// # Errors
///
/// Returns [`CorruptData`] if the blob is malformed, contains duplicate IDs,
/// or contains an item whose text is blank.
pub fn decode(blob: &str) -> Result<Vec<TodoItem>, CorruptData> {
    let items: Option<Vec<TodoItem>> = serde_json::from_str(blob)?;
    let items = items.unwrap_or_default();

    let mut seen = HashSet::with_capacity(items.len());
    for item in &items {
        if !seen.insert(item.id()) {
            return Err(CorruptData::DuplicateId(item.id().to_string()));
        }
        if item.text().trim().is_empty() {
            return Err(CorruptData::BlankText(item.id().to_string()));
        }
    }
    Ok(items)
}
