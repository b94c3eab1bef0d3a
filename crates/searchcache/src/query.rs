//! Conjunction queries over indexed attributes
//!
//! A [`QueryBuilder`] collects equality criteria and is finished with
//! [`QueryBuilder::end`], which yields an executable [`Query`]. Only a
//! finished query can run, and a finished query always has at least one
//! criterion.
//!
//! Execution intersects the per-criterion key sets smallest first under a
//! single read lock, then releases the lock before the caller sees anything.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use recordstore::{AttributeValue, Error, Result, Searchable};
use tracing::debug;

use crate::cache::SearchCache;
use crate::index::KeySet;
use crate::stats::CacheStats;

/// One `attribute == value` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Criteria {
    attribute: String,
    position: usize,
    value: AttributeValue,
}

impl Criteria {
    /// Attribute name
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Expected value
    pub fn value(&self) -> &AttributeValue {
        &self.value
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.attribute, self.value)
    }
}

/// Builder for a query against one cache
pub struct QueryBuilder<'a, V> {
    cache: &'a SearchCache<V>,
    criteria: Vec<Criteria>,
    include_values: bool,
    max_results: Option<usize>,
}

impl<'a, V: Searchable> QueryBuilder<'a, V> {
    pub(crate) fn new(cache: &'a SearchCache<V>) -> Self {
        Self {
            cache,
            criteria: Vec::new(),
            include_values: false,
            max_results: None,
        }
    }

    /// Require `attribute == value`
    ///
    /// Fails with [`Error::UnknownAttribute`] right away when the cache does
    /// not index `attribute`.
    pub fn add_criteria(
        mut self,
        attribute: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<Self> {
        let position = self.cache.config().position(attribute)?;
        self.criteria.push(Criteria {
            attribute: attribute.to_string(),
            position,
            value: value.into(),
        });
        Ok(self)
    }

    /// Materialise matching records, not just their keys
    pub fn include_values(mut self) -> Self {
        self.include_values = true;
        self
    }

    /// Keep at most `max` matches (lowest keys first)
    pub fn max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }

    /// Finish the query
    ///
    /// A query without criteria is rejected with [`Error::EmptyQuery`].
    pub fn end(self) -> Result<Query<'a, V>> {
        if self.criteria.is_empty() {
            return Err(Error::EmptyQuery);
        }

        Ok(Query {
            cache: self.cache,
            criteria: self.criteria,
            include_values: self.include_values,
            max_results: self.max_results,
        })
    }
}

/// A finished, executable query
pub struct Query<'a, V> {
    cache: &'a SearchCache<V>,
    criteria: Vec<Criteria>,
    include_values: bool,
    max_results: Option<usize>,
}

impl<V: Searchable> Query<'_, V> {
    /// Criteria, all of which must hold
    pub fn criteria(&self) -> &[Criteria] {
        &self.criteria
    }

    /// Run the query against the current cache contents
    pub fn execute(&self) -> Results<V> {
        let started = Instant::now();

        let hits = self.cache.with_segment(|segment| {
            let mut sets: Vec<&KeySet> = self
                .criteria
                .iter()
                .map(|c| segment.index.lookup_at(c.position, &c.value))
                .collect();
            sets.sort_by_key(|set| set.len());

            let mut keys = match sets.split_first() {
                Some((smallest, rest)) => smallest
                    .iter()
                    .copied()
                    .filter(|key| rest.iter().all(|set| set.contains(key)))
                    .collect::<Vec<_>>(),
                None => Vec::new(),
            };
            keys.sort_unstable();
            if let Some(max) = self.max_results {
                keys.truncate(max);
            }

            keys.into_iter()
                .map(|key| Hit {
                    key,
                    value: if self.include_values {
                        segment.store.get(&key).cloned()
                    } else {
                        None
                    },
                })
                .collect::<Vec<_>>()
        });

        debug!(
            cache = self.cache.name(),
            query = %self,
            matches = hits.len(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "query executed"
        );

        Results::new(hits, self.cache.stats_handle())
    }
}

impl<V> fmt::Display for Query<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// A matching entry
#[derive(Debug)]
pub struct Hit<V> {
    key: u64,
    value: Option<Arc<V>>,
}

impl<V> Hit<V> {
    /// Cache key
    pub fn key(&self) -> u64 {
        self.key
    }

    /// Record, present when the query included values
    pub fn value(&self) -> Option<&Arc<V>> {
        self.value.as_ref()
    }
}

impl<V> Clone for Hit<V> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            value: self.value.clone(),
        }
    }
}

/// Result set of an executed query
///
/// Holds its own copy of the matching keys and shared records, so the cache
/// is not locked while it is alive. Release it with [`Results::discard`] or by
/// dropping it; the cache counts result sets that are still open.
pub struct Results<V> {
    hits: Vec<Hit<V>>,
    stats: Arc<CacheStats>,
}

impl<V> Results<V> {
    fn new(hits: Vec<Hit<V>>, stats: Arc<CacheStats>) -> Self {
        stats.record_query();
        Self { hits, stats }
    }

    /// Number of matches
    pub fn size(&self) -> usize {
        self.hits.len()
    }

    /// True when nothing matched
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Matching keys, ascending
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.hits.iter().map(Hit::key)
    }

    /// Matching records (empty unless the query included values)
    pub fn values(&self) -> impl Iterator<Item = &Arc<V>> + '_ {
        self.hits.iter().filter_map(Hit::value)
    }

    /// All hits, ascending by key
    pub fn iter(&self) -> std::slice::Iter<'_, Hit<V>> {
        self.hits.iter()
    }

    /// Release the result set
    pub fn discard(self) {}
}

impl<V> Drop for Results<V> {
    fn drop(&mut self) {
        self.stats.record_release();
    }
}

impl<V> fmt::Debug for Results<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Results").field("size", &self.hits.len()).finish()
    }
}
