pub mod item;

pub use item::{Filter, ParseEnumError, Status, TodoItem};
