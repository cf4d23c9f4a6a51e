//! todo-core library.
//!
//! The ordered to-do list ([`store::TodoStore`]), its items and filters
//! ([`model`]), and the key-value persistence boundary ([`storage`]).

pub mod blob;
pub mod config;
pub mod error;
pub mod id;
pub mod lock;
pub mod model;
pub mod storage;
pub mod store;

// Conventions
//
// - Errors: `thiserror` enums at the storage boundary; `anyhow::Result` where
//   callers only report.
// - Logging: `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).

pub use model::{Filter, TodoItem};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{Applied, Intent, TodoStore, View};
