//! The authoritative to-do list.
//!
//! [`TodoStore`] owns the ordered item list, the active [`Filter`] and the
//! persistence boundary. Front ends hold one store, forward user intents to
//! it, and re-render from [`TodoStore::view`].
//!
//! # Contract
//!
//! - Construction loads the persisted list. Missing or corrupt data yields an
//!   empty list; corruption is logged and the bad blob quarantined, never
//!   returned as an error.
//! - Operations on unknown IDs and adds of blank text are silent no-ops.
//!   They return `None` (or an empty vec) and do not touch storage.
//! - Every effective mutation performs exactly one full-list write.
//! - The filter is view state only and resets to [`Filter::All`] on load.

use crate::blob;
use crate::error::StorageError;
use crate::id::{self, ID_PREFIX};
use crate::model::{Filter, TodoItem};
use crate::storage::{KeyValueStore, STORAGE_KEY};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What happened when the persisted list was read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored yet.
    Missing,
    /// The stored list was read successfully.
    Loaded { count: usize },
    /// The stored blob was unreadable and the list was reset to empty.
    Recovered {
        reason: String,
        quarantined: Option<PathBuf>,
    },
}

/// Result of [`TodoStore::update_text`] on an existing item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Text replaced; carries the updated item.
    Updated(TodoItem),
    /// New text was blank, so the item was deleted.
    Removed(TodoItem),
}

/// A user intent forwarded by a presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Add(String),
    Toggle(String),
    Delete(String),
    Edit { id: String, text: String },
    SetFilter(Filter),
    ClearCompleted,
}

/// Observable effect of applying an [`Intent`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Applied {
    Added { item: TodoItem },
    Toggled { item: TodoItem },
    Edited { item: TodoItem },
    Deleted { item: TodoItem },
    Cleared { items: Vec<TodoItem> },
    FilterChanged { filter: Filter },
    /// The intent referenced nothing that exists, or carried blank text.
    Unchanged,
}

/// Outcome of looking up an ID or ID prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(String),
    Ambiguous(Vec<String>),
    Missing,
}

/// Render input: everything a presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct View<'a> {
    pub filter: Filter,
    pub items: Vec<&'a TodoItem>,
    pub remaining: usize,
    pub total: usize,
}

/// Owned to-do list backed by a [`KeyValueStore`].
#[derive(Debug)]
pub struct TodoStore<S> {
    storage: S,
    items: Vec<TodoItem>,
    filter: Filter,
    last_load: LoadOutcome,
}

impl<S: KeyValueStore> TodoStore<S> {
    /// Build a store over `storage` and load the persisted list.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read. Missing or
    /// corrupt data is not an error.
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let mut store = Self {
            storage,
            items: Vec::new(),
            filter: Filter::All,
            last_load: LoadOutcome::Missing,
        };
        store.load()?;
        Ok(store)
    }

    /// Re-read the persisted list, replacing in-memory state.
    ///
    /// # Errors
    ///
    /// Returns an error only if the backend itself cannot be read.
    pub fn load(&mut self) -> Result<&LoadOutcome, StorageError> {
        self.filter = Filter::All;
        self.items.clear();

        let outcome = match self.storage.get(STORAGE_KEY)? {
            None => LoadOutcome::Missing,
            Some(raw) => match blob::decode(&raw) {
                Ok(items) => {
                    self.items = items;
                    LoadOutcome::Loaded {
                        count: self.items.len(),
                    }
                }
                Err(err) => {
                    warn!(error = %err, code = %err.code(), "persisted to-do list is corrupt, starting empty");
                    let quarantined = match self.storage.quarantine(STORAGE_KEY) {
                        Ok(path) => path,
                        Err(q_err) => {
                            warn!(error = %q_err, "failed to quarantine corrupt blob");
                            None
                        }
                    };
                    if let Some(path) = &quarantined {
                        info!(path = %path.display(), "quarantined corrupt blob");
                    }
                    LoadOutcome::Recovered {
                        reason: err.to_string(),
                        quarantined,
                    }
                }
            },
        };

        debug!(?outcome, "loaded to-do list");
        self.last_load = outcome;
        Ok(&self.last_load)
    }

    /// How the most recent [`load`](Self::load) went.
    #[must_use]
    pub const fn last_load(&self) -> &LoadOutcome {
        &self.last_load
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        let encoded = blob::encode(&self.items)?;
        self.storage.set(STORAGE_KEY, &encoded)?;
        debug!(count = self.items.len(), "persisted to-do list");
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Prepend a new active item. Blank text is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be written. The item
    /// stays in memory either way.
    pub fn add(&mut self, text: &str) -> Result<Option<TodoItem>, StorageError> {
        let text = text.trim();
        if text.is_empty() {
            debug!("ignoring add with blank text");
            return Ok(None);
        }

        let items = &self.items;
        let id = id::generate_id(|candidate| items.iter().any(|item| item.id() == candidate));
        let item = TodoItem::new(id, text.to_string(), now_millis());
        self.items.insert(0, item.clone());
        debug!(id = item.id(), "added item");

        self.persist()?;
        Ok(Some(item))
    }

    /// Flip completion on `id`. Returns the updated item, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be written.
    pub fn toggle(&mut self, id: &str) -> Result<Option<TodoItem>, StorageError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "toggle of unknown id ignored");
            return Ok(None);
        };

        let completed = self.items[pos].toggle();
        let item = self.items[pos].clone();
        debug!(id, completed, "toggled item");

        self.persist()?;
        Ok(Some(item))
    }

    /// Remove `id`. Returns the removed item, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be written.
    pub fn delete(&mut self, id: &str) -> Result<Option<TodoItem>, StorageError> {
        let Some(pos) = self.position(id) else {
            debug!(id, "delete of unknown id ignored");
            return Ok(None);
        };

        let removed = self.items.remove(pos);
        debug!(id, "deleted item");

        self.persist()?;
        Ok(Some(removed))
    }

    /// Replace the text of `id`. Blank text deletes the item instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be written.
    pub fn update_text(&mut self, id: &str, text: &str) -> Result<Option<Edit>, StorageError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(self.delete(id)?.map(Edit::Removed));
        }

        let Some(pos) = self.position(id) else {
            debug!(id, "edit of unknown id ignored");
            return Ok(None);
        };

        self.items[pos].set_text(text.to_string());
        let item = self.items[pos].clone();
        debug!(id, "updated item text");

        self.persist()?;
        Ok(Some(Edit::Updated(item)))
    }

    /// Remove every completed item, keeping the rest in order.
    ///
    /// Returns the removed items; when nothing was completed, storage is not
    /// touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated list could not be written.
    pub fn clear_completed(&mut self) -> Result<Vec<TodoItem>, StorageError> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(TodoItem::is_completed);
        self.items = kept;

        if removed.is_empty() {
            return Ok(removed);
        }
        debug!(removed = removed.len(), "cleared completed items");

        self.persist()?;
        Ok(removed)
    }

    /// Change the active filter. Not persisted.
    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// Items matching the active filter, in list order.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&TodoItem> {
        self.items
            .iter()
            .filter(|item| self.filter.matches(item))
            .collect()
    }

    /// Number of items not yet completed.
    #[must_use]
    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !item.is_completed()).count()
    }

    /// Snapshot of the visible state.
    #[must_use]
    pub fn view(&self) -> View<'_> {
        View {
            filter: self.filter,
            items: self.visible_items(),
            remaining: self.remaining_count(),
            total: self.items.len(),
        }
    }

    /// The full list regardless of filter.
    #[must_use]
    pub fn items(&self) -> &[TodoItem] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&TodoItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrow the underlying storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Dispatch a presentation-layer intent.
    ///
    /// # Errors
    ///
    /// Returns an error if a mutation could not be written.
    pub fn apply(&mut self, intent: Intent) -> Result<Applied, StorageError> {
        let applied = match intent {
            Intent::Add(text) => self.add(&text)?.map(|item| Applied::Added { item }),
            Intent::Toggle(id) => self.toggle(&id)?.map(|item| Applied::Toggled { item }),
            Intent::Delete(id) => self.delete(&id)?.map(|item| Applied::Deleted { item }),
            Intent::Edit { id, text } => self.update_text(&id, &text)?.map(|edit| match edit {
                Edit::Updated(item) => Applied::Edited { item },
                Edit::Removed(item) => Applied::Deleted { item },
            }),
            Intent::SetFilter(filter) => {
                self.set_filter(filter);
                Some(Applied::FilterChanged { filter })
            }
            Intent::ClearCompleted => {
                let items = self.clear_completed()?;
                (!items.is_empty()).then_some(Applied::Cleared { items })
            }
        };
        Ok(applied.unwrap_or(Applied::Unchanged))
    }

    /// Look up an item by full ID or unique prefix.
    ///
    /// The `td-` prefix may be omitted. An exact match always wins over
    /// prefix matches.
    #[must_use]
    pub fn resolve(&self, needle: &str) -> Resolution {
        let needle = needle.trim();
        if needle.is_empty() {
            return Resolution::Missing;
        }
        let suffix = needle.strip_prefix(ID_PREFIX).unwrap_or(needle);
        if suffix.is_empty() {
            return Resolution::Missing;
        }
        let full = format!("{ID_PREFIX}{suffix}");

        if let Some(item) = self.items.iter().find(|item| item.id() == full || item.id() == needle) {
            return Resolution::Found(item.id().to_string());
        }

        let mut matches: Vec<String> = self
            .items
            .iter()
            .filter(|item| item.id().starts_with(&full))
            .map(|item| item.id().to_string())
            .collect();

        match matches.len() {
            0 => Resolution::Missing,
            1 => Resolution::Found(matches.remove(0)),
            _ => {
                matches.sort();
                Resolution::Ambiguous(matches)
            }
        }
    }
}

fn now_millis() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0)
}
