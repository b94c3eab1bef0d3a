//! Keyed record store
//!
//! Plain key -> record map. Records are shared as `Arc<V>` so query results
//! can hand them out without copying. The store does no locking of its own;
//! callers that share it wrap it together with whatever must change in step
//! with it.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::RandomState;

/// In-memory key -> record map with last-write-wins semantics
pub struct RecordStore<V> {
    entries: HashMap<u64, Arc<V>, RandomState>,
}

impl<V> RecordStore<V> {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty store with room for `capacity` entries
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity_and_hasher(capacity, RandomState::new()),
        }
    }

    /// Insert or replace the record at `key`, returning the previous one
    pub fn insert(&mut self, key: u64, value: Arc<V>) -> Option<Arc<V>> {
        self.entries.insert(key, value)
    }

    /// Point lookup
    pub fn get(&self, key: &u64) -> Option<&Arc<V>> {
        self.entries.get(key)
    }

    /// Check whether `key` is present
    pub fn contains_key(&self, key: &u64) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove the record at `key`
    pub fn remove(&mut self, key: &u64) -> Option<Arc<V>> {
        self.entries.remove(key)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reserve room for `additional` more entries
    pub fn reserve(&mut self, additional: usize) {
        self.entries.reserve(additional);
    }

    /// Iterate over keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    /// Iterate over (key, record) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (u64, &Arc<V>)> + '_ {
        self.entries.iter().map(|(k, v)| (*k, v))
    }
}

impl<V> Default for RecordStore<V> {
    fn default() -> Self {
        Self::new()
    }
}
