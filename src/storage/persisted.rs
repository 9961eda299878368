//! A JSON array record kept in a [`KeyValueStore`] and cached in memory

use crate::reactive::Source;
use crate::storage::backend::KeyValueStore;
use crate::validation::error::{RadarError, RadarResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::Cell;
use std::rc::Rc;

/// An ordered list persisted under one key.
///
/// The record is read on first access and rewritten in full on every
/// mutation. The in-memory copy is a reactive [`Source`], so derived values
/// reading [`PersistedList::items`] follow mutations.
pub struct PersistedList<T> {
    backend: Rc<dyn KeyValueStore>,
    key: String,
    cache: Source<Vec<T>>,
    loaded: Rc<Cell<bool>>,
}

impl<T> Clone for PersistedList<T> {
    fn clone(&self) -> Self {
        Self {
            backend: Rc::clone(&self.backend),
            key: self.key.clone(),
            cache: self.cache.clone(),
            loaded: Rc::clone(&self.loaded),
        }
    }
}

impl<T> PersistedList<T>
where
    T: Clone + Serialize + DeserializeOwned + 'static,
{
    pub fn new(backend: Rc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            cache: Source::new(Vec::new()),
            loaded: Rc::new(Cell::new(false)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read the record into the cache if that has not happened yet
    pub fn load(&self) -> RadarResult<()> {
        if self.loaded.get() {
            return Ok(());
        }

        let items = match self.backend.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<Vec<T>>(&raw)
                .map_err(|e| RadarError::serialization(&self.key, e.to_string()))?,
            _ => Vec::new(),
        };

        tracing::debug!(key = %self.key, count = items.len(), "loaded persisted list");
        self.cache.set(items);
        self.loaded.set(true);
        Ok(())
    }

    /// Reactive read of the list
    pub fn items(&self) -> RadarResult<Vec<T>> {
        self.load()?;
        Ok(self.cache.get())
    }

    /// Current list without recording a reactive dependency
    pub fn snapshot(&self) -> RadarResult<Vec<T>> {
        self.load()?;
        Ok(self.cache.get_untracked())
    }

    /// Write `items` to the backend, then expose them
    pub fn save(&self, items: Vec<T>) -> RadarResult<()> {
        let raw = serde_json::to_string(&items)
            .map_err(|e| RadarError::serialization(&self.key, e.to_string()))?;
        self.backend.set(&self.key, &raw)?;

        tracing::trace!(key = %self.key, count = items.len(), "saved persisted list");
        self.cache.set(items);
        self.loaded.set(true);
        Ok(())
    }

    /// Apply `f` to a copy of the list and save the result.
    ///
    /// The cache is left untouched if the write fails.
    pub fn modify<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> RadarResult<R> {
        let mut items = self.snapshot()?;
        let result = f(&mut items);
        self.save(items)?;
        Ok(result)
    }

    /// Empty the list and delete its record
    pub fn clear(&self) -> RadarResult<()> {
        self.backend.remove(&self.key)?;
        self.cache.set(Vec::new());
        self.loaded.set(true);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Derived;
    use crate::storage::backend::MemoryStore;

    fn list(store: &Rc<MemoryStore>) -> PersistedList<u32> {
        PersistedList::new(store.clone() as Rc<dyn KeyValueStore>, "numbers")
    }

    #[test]
    fn test_missing_record_is_empty() {
        let store = Rc::new(MemoryStore::new());
        assert!(list(&store).items().unwrap().is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_modify_rewrites_record() {
        let store = Rc::new(MemoryStore::new());
        let numbers = list(&store);

        numbers.modify(|items| items.push(1)).unwrap();
        numbers.modify(|items| items.push(2)).unwrap();

        assert_eq!(store.get("numbers").unwrap(), Some("[1,2]".to_string()));
        assert_eq!(list(&store).items().unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_loads_lazily_once() {
        let store = Rc::new(MemoryStore::new());
        store.set("numbers", "[5]").unwrap();
        let numbers = list(&store);

        // Later writes from elsewhere are not picked up after the first load
        assert_eq!(numbers.items().unwrap(), vec![5]);
        store.set("numbers", "[6]").unwrap();
        assert_eq!(numbers.items().unwrap(), vec![5]);
    }

    #[test]
    fn test_corrupt_record_is_reported() {
        let store = Rc::new(MemoryStore::new());
        store.set("numbers", "{not json").unwrap();

        let err = list(&store).items().unwrap_err();
        assert!(matches!(err, RadarError::Serialization { ref key, .. } if key == "numbers"));
    }

    #[test]
    fn test_clear_removes_record() {
        let store = Rc::new(MemoryStore::new());
        let numbers = list(&store);
        numbers.save(vec![1, 2, 3]).unwrap();

        numbers.clear().unwrap();
        assert!(numbers.items().unwrap().is_empty());
        assert_eq!(store.get("numbers").unwrap(), None);
    }

    #[test]
    fn test_derived_follows_mutations() {
        let store = Rc::new(MemoryStore::new());
        let numbers = list(&store);

        let total = {
            let numbers = numbers.clone();
            Derived::new(move || numbers.items().map(|v| v.iter().sum::<u32>()).unwrap_or(0))
        };

        assert_eq!(total.get(), 0);
        numbers.modify(|items| items.extend([4, 5])).unwrap();
        assert_eq!(total.get(), 9);
        numbers.clear().unwrap();
        assert_eq!(total.get(), 0);
    }
}
