//! Persisted record lists
//!
//! Each list lives under its own key in a [`KeyValueStore`] as a JSON array.
//! Lists are read on first access, cached, and rewritten in full on every
//! mutation. A missing record is an empty list.

pub mod backend;
pub mod persisted;
pub mod bookmarks;

pub use backend::{FileStore, KeyValueStore, MemoryStore};
pub use persisted::PersistedList;
pub use bookmarks::BookmarkStore;
