//! Cache statistics tracking

use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics for cache population and search
#[derive(Debug, Default)]
pub struct CacheStats {
    puts: AtomicU64,
    replacements: AtomicU64,
    removals: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    queries: AtomicU64,
    open_results: AtomicU64,
}

impl CacheStats {
    /// Create new stats tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a put; `replaced` when the key already held a record
    pub fn record_put(&self, replaced: bool) {
        self.puts.fetch_add(1, Ordering::Relaxed);
        if replaced {
            self.replacements.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a removal
    pub fn record_removal(&self) {
        self.removals.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a point lookup hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a point lookup miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an executed query; its result set is now open
    pub(crate) fn record_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        self.open_results.fetch_add(1, Ordering::AcqRel);
    }

    /// A result set was released
    pub(crate) fn record_release(&self) {
        self.open_results.fetch_sub(1, Ordering::AcqRel);
    }

    /// Get total puts
    pub fn puts(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Get puts that replaced an existing record
    pub fn replacements(&self) -> u64 {
        self.replacements.load(Ordering::Relaxed)
    }

    /// Get total removals
    pub fn removals(&self) -> u64 {
        self.removals.load(Ordering::Relaxed)
    }

    /// Get total hits
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Get total misses
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get total executed queries
    pub fn queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Result sets handed out and not yet released
    pub fn open_results(&self) -> u64 {
        self.open_results.load(Ordering::Acquire)
    }

    /// Calculate hit ratio (0.0 to 1.0)
    pub fn hit_ratio(&self) -> f64 {
        let hits = self.hits();
        let total = hits + self.misses();
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }

    /// Reset all counters except open result sets
    pub fn reset(&self) {
        self.puts.store(0, Ordering::Relaxed);
        self.replacements.store(0, Ordering::Relaxed);
        self.removals.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.queries.store(0, Ordering::Relaxed);
    }
}
