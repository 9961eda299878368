//! User bookmarks

use crate::core::{Bookmark, Coordinate, Timestamp};
use crate::storage::backend::KeyValueStore;
use crate::storage::persisted::PersistedList;
use crate::validation::{validate_coordinate, RadarResult};
use rand::Rng;
use std::rc::Rc;

/// Current wall clock time in epoch milliseconds
pub fn now_ms() -> Timestamp {
    chrono::Utc::now().timestamp_millis() as Timestamp
}

/// Append-only list of user bookmarks, cleared only on request
#[derive(Clone)]
pub struct BookmarkStore {
    list: PersistedList<Bookmark>,
}

impl BookmarkStore {
    pub fn new(backend: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            list: PersistedList::new(backend, key),
        }
    }

    /// Append a bookmark at `coord` with a random hue
    pub fn add(&self, coord: Coordinate) -> RadarResult<Bookmark> {
        self.push(Self::create(coord)?)
    }

    pub fn add_labeled(&self, coord: Coordinate, label: impl Into<String>) -> RadarResult<Bookmark> {
        self.push(Self::create(coord)?.with_label(label))
    }

    fn create(coord: Coordinate) -> RadarResult<Bookmark> {
        validate_coordinate(&coord)?;
        let hue = rand::thread_rng().gen_range(0.0..360.0);
        Ok(Bookmark::new(coord, hue).with_created_at(now_ms()))
    }

    fn push(&self, bookmark: Bookmark) -> RadarResult<Bookmark> {
        let count = self.list.modify(|items| {
            items.push(bookmark.clone());
            items.len()
        })?;
        tracing::info!(count, hue = bookmark.hue, "bookmark added");
        Ok(bookmark)
    }

    /// Remove every bookmark and delete the record
    pub fn clear(&self) -> RadarResult<()> {
        self.list.clear()?;
        tracing::info!("bookmarks cleared");
        Ok(())
    }

    /// Reactive read of the bookmarks in insertion order
    pub fn bookmarks(&self) -> RadarResult<Vec<Bookmark>> {
        self.list.items()
    }

    pub fn len(&self) -> RadarResult<usize> {
        Ok(self.list.snapshot()?.len())
    }

    pub fn is_empty(&self) -> RadarResult<bool> {
        Ok(self.len()? == 0)
    }
}
