//! Command handlers. Each one opens the store under the data-directory lock,
//! turns its arguments into an [`Intent`], and renders what happened.

pub mod add;
pub mod clear;
pub mod completions;
pub mod count;
pub mod delete;
pub mod edit;
pub mod list;
pub mod toggle;

use crate::output::{CliError, OutputMode, render, render_error, render_warning};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use todo_core::error::ErrorCode;
use todo_core::lock::StoreLock;
use todo_core::store::{LoadOutcome, Resolution};
use todo_core::{Applied, FileStore, Intent, TodoStore};
use tracing::debug;

/// Per-invocation settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub data_dir: PathBuf,
    pub lock_timeout: Duration,
    pub output: OutputMode,
    pub quiet: bool,
}

/// An open store plus the lock that serializes it against other processes.
pub struct Session {
    pub store: TodoStore<FileStore>,
    _lock: StoreLock,
}

impl Session {
    /// Lock the data directory and load the list.
    pub fn open(ctx: &Context) -> anyhow::Result<Self> {
        let lock = match StoreLock::acquire(&ctx.data_dir, ctx.lock_timeout) {
            Ok(lock) => lock,
            Err(e) => {
                render_error(ctx.output, &CliError::from_code(e.to_string(), e.code()))?;
                return Err(e.into());
            }
        };

        debug!(lock = %lock.path().display(), "acquired data dir lock");

        let store = match FileStore::open(&ctx.data_dir).and_then(TodoStore::open) {
            Ok(store) => store,
            Err(e) => {
                render_error(ctx.output, &CliError::from_code(e.to_string(), e.code()))?;
                return Err(anyhow::Error::new(e).context(format!(
                    "Failed to open the to-do list in {}",
                    ctx.data_dir.display()
                )));
            }
        };

        if let LoadOutcome::Recovered {
            reason,
            quarantined,
        } = store.last_load()
        {
            if !ctx.quiet {
                let kept = quarantined
                    .as_ref()
                    .map(|p| format!("; unreadable copy kept at {}", p.display()))
                    .unwrap_or_default();
                render_warning(&format!(
                    "{} ({reason}), starting with an empty list{kept}",
                    ErrorCode::PersistedDataCorrupt.message()
                ))?;
            }
        }

        Ok(Self {
            store,
            _lock: lock,
        })
    }

    /// Apply an intent, reporting a failed write with its error code.
    ///
    /// The in-memory change stands even when the write fails; the process
    /// exits non-zero so callers know the list on disk is stale.
    pub fn apply(&mut self, intent: Intent, output: OutputMode) -> anyhow::Result<Applied> {
        match self.store.apply(intent) {
            Ok(applied) => Ok(applied),
            Err(e) => {
                render_error(output, &CliError::from_code(e.to_string(), e.code()))?;
                Err(e.into())
            }
        }
    }

    /// Map a user-supplied ID or prefix onto a stored ID.
    ///
    /// Unknown IDs pass through unchanged so the store treats them as a no-op.
    /// An ambiguous prefix is reported and returned as an error.
    pub fn resolve_id(&self, needle: &str, output: OutputMode) -> anyhow::Result<String> {
        match self.store.resolve(needle) {
            Resolution::Found(id) => Ok(id),
            Resolution::Missing => Ok(needle.trim().to_string()),
            Resolution::Ambiguous(candidates) => {
                let message = format!(
                    "ID prefix '{needle}' matches {} items: {}",
                    candidates.len(),
                    candidates.join(", ")
                );
                render_error(output, &CliError::from_code(&message, ErrorCode::AmbiguousId))?;
                anyhow::bail!(message)
            }
        }
    }
}

/// Join positional words into one text argument.
pub fn join_words(words: &[String]) -> String {
    words.join(" ")
}

/// "1 item left" / "3 items left".
pub fn items_left(remaining: usize) -> String {
    let noun = if remaining == 1 { "item" } else { "items" };
    format!("{remaining} {noun} left")
}

fn write_applied(w: &mut dyn Write, applied: &Applied, unchanged: &str) -> std::io::Result<()> {
    match applied {
        Applied::Added { item } => writeln!(w, "✓ Added {}  {}", item.id(), item.text()),
        Applied::Toggled { item } if item.is_completed() => {
            writeln!(w, "✓ Completed {}  {}", item.id(), item.text())
        }
        Applied::Toggled { item } => writeln!(w, "✓ Reopened {}  {}", item.id(), item.text()),
        Applied::Edited { item } => writeln!(w, "✓ Updated {}  {}", item.id(), item.text()),
        Applied::Deleted { item } => writeln!(w, "✓ Deleted {}  {}", item.id(), item.text()),
        Applied::Cleared { items } => {
            let noun = if items.len() == 1 { "item" } else { "items" };
            writeln!(w, "✓ Cleared {} completed {noun}", items.len())
        }
        Applied::FilterChanged { filter } => writeln!(w, "✓ Filter set to {filter}"),
        Applied::Unchanged => writeln!(w, "{unchanged}"),
    }
}

/// Render the effect of a mutation. `unchanged` is shown for no-ops.
pub fn render_applied(ctx: &Context, applied: &Applied, unchanged: &str) -> anyhow::Result<()> {
    if ctx.quiet && !ctx.output.is_json() {
        return Ok(());
    }
    render(ctx.output, applied, |a, w| write_applied(w, a, unchanged))
}
