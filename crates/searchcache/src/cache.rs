//! SearchCache: record store plus attribute index behind one lock

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use recordstore::{Error, RecordStore, Result, Searchable};
use tracing::debug;

use crate::config::SearchConfig;
use crate::index::AttributeIndex;
use crate::query::QueryBuilder;
use crate::stats::CacheStats;

/// Store and index, always mutated together
pub(crate) struct Segment<V> {
    pub(crate) store: RecordStore<V>,
    pub(crate) index: AttributeIndex,
}

impl<V: Searchable> Segment<V> {
    // Index first: if attribute extraction panics, neither side has changed.
    fn put(&mut self, key: u64, value: Arc<V>) -> Option<Arc<V>> {
        let previous = self.store.get(&key).map(Arc::clone);
        self.index.on_put(key, previous.as_deref(), &*value);
        self.store.insert(key, value)
    }

    fn remove(&mut self, key: u64) -> Option<Arc<V>> {
        let previous = Arc::clone(self.store.get(&key)?);
        self.index.on_remove(key, &*previous);
        self.store.remove(&key)
    }
}

/// Outcome of a bulk put
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PutSummary {
    /// Keys that were new
    pub inserted: usize,
    /// Keys whose record was replaced
    pub replaced: usize,
}

/// Searchable in-memory cache
///
/// Cloning is cheap and yields another handle to the same cache.
pub struct SearchCache<V> {
    /// Name and indexed attributes, fixed at construction
    config: Arc<SearchConfig>,

    /// Records and their index entries
    segment: Arc<RwLock<Segment<V>>>,

    /// Cache statistics
    stats: Arc<CacheStats>,
}

impl<V: Searchable> SearchCache<V> {
    /// Create an empty cache
    ///
    /// # Arguments
    /// * `config` - Cache name and attributes to index
    ///
    /// # Returns
    /// * `Result<SearchCache<V>>` - Fails if the configuration does not fit `V`
    pub fn new(config: SearchConfig) -> Result<Self> {
        config.validate::<V>()?;

        let segment = Segment {
            store: RecordStore::with_capacity(config.capacity()),
            index: AttributeIndex::new(config.attributes()),
        };

        Ok(Self {
            config: Arc::new(config),
            segment: Arc::new(RwLock::new(segment)),
            stats: Arc::new(CacheStats::new()),
        })
    }

    /// Insert or replace the record at `key`
    ///
    /// The index is reconciled under the same write lock as the store update.
    ///
    /// # Returns
    /// * `Option<Arc<V>>` - The record previously stored at `key`
    pub fn put(&self, key: u64, value: V) -> Option<Arc<V>> {
        let value = Arc::new(value);
        let previous = self.segment.write().put(key, value);
        self.stats.record_put(previous.is_some());
        previous
    }

    /// Insert or replace a batch of records under one write lock
    pub fn put_all<I>(&self, entries: I) -> PutSummary
    where
        I: IntoIterator<Item = (u64, V)>,
    {
        let started = Instant::now();
        let entries = entries.into_iter();
        let mut summary = PutSummary::default();

        let mut segment = self.segment.write();
        segment.store.reserve(entries.size_hint().0);
        for (key, value) in entries {
            let replaced = segment.put(key, Arc::new(value)).is_some();
            self.stats.record_put(replaced);
            if replaced {
                summary.replaced += 1;
            } else {
                summary.inserted += 1;
            }
        }
        let size = segment.store.len();
        drop(segment);

        debug!(
            cache = self.name(),
            inserted = summary.inserted,
            replaced = summary.replaced,
            size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "bulk put complete"
        );
        summary
    }

    /// Get the record at `key`
    ///
    /// # Returns
    /// * `Result<Arc<V>>` - [`Error::NotFound`] when the key is absent
    pub fn get(&self, key: u64) -> Result<Arc<V>> {
        match self.segment.read().store.get(&key) {
            Some(value) => {
                self.stats.record_hit();
                Ok(Arc::clone(value))
            }
            None => {
                self.stats.record_miss();
                Err(Error::NotFound(key))
            }
        }
    }

    /// Check whether `key` holds a record
    pub fn contains_key(&self, key: u64) -> bool {
        self.segment.read().store.contains_key(&key)
    }

    /// Remove the record at `key` together with its index entries
    pub fn remove(&self, key: u64) -> Option<Arc<V>> {
        let previous = self.segment.write().remove(key);
        if previous.is_some() {
            self.stats.record_removal();
        }
        previous
    }

    /// Start building a query
    pub fn create_query(&self) -> QueryBuilder<'_, V> {
        QueryBuilder::new(self)
    }

    /// Number of distinct values indexed for `attribute`
    pub fn distinct_values(&self, attribute: &str) -> Result<usize> {
        self.segment.read().index.distinct_values(attribute)
    }

    /// Drop every record and index entry
    pub fn clear(&self) {
        let mut segment = self.segment.write();
        segment.store.clear();
        segment.index.clear();
    }
}

impl<V> SearchCache<V> {
    /// Cache name
    pub fn name(&self) -> &str {
        self.config.name()
    }

    /// Indexed attributes
    pub fn search_attributes(&self) -> &[String] {
        self.config.attributes()
    }

    /// Get cache statistics
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.segment.read().store.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.segment.read().store.is_empty()
    }

    pub(crate) fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub(crate) fn stats_handle(&self) -> Arc<CacheStats> {
        Arc::clone(&self.stats)
    }

    /// Run `f` against a consistent view of store and index
    pub(crate) fn with_segment<R>(&self, f: impl FnOnce(&Segment<V>) -> R) -> R {
        f(&*self.segment.read())
    }
}

impl<V> Clone for SearchCache<V> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            segment: Arc::clone(&self.segment),
            stats: Arc::clone(&self.stats),
        }
    }
}
