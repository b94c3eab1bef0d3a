//! # searchcache
//!
//! Searchable in-memory cache over `recordstore` records.
//!
//! ## Architecture
//! - **Record store**: AHash map of key -> `Arc<V>`
//! - **Attribute index**: per attribute, value -> key set
//! - **Queries**: equality criteria joined by AND, smallest key set first
//! - **Consistency**: store and index share one `RwLock`; a put and its index
//!   reconciliation are a single write
//!
//! ```no_run
//! use recordstore::load_persons;
//! use searchcache::{SearchCache, SearchConfig};
//!
//! let cache = SearchCache::new(SearchConfig::persons())?;
//! for person in load_persons("mock_persons.csv")? {
//!     cache.put(person.id, person);
//! }
//!
//! let results = cache
//!     .create_query()
//!     .add_criteria("gender", "F")?
//!     .add_criteria("country", "France")?
//!     .end()?
//!     .execute();
//! println!("found {} persons", results.size());
//! results.discard();
//! # Ok::<(), recordstore::Error>(())
//! ```

#![warn(missing_docs)]

mod cache;
mod config;
mod index;
mod query;
mod stats;

pub use cache::{PutSummary, SearchCache};
pub use config::SearchConfig;
pub use index::{AttributeIndex, KeySet};
pub use query::{Criteria, Hit, Query, QueryBuilder, Results};
pub use recordstore::{AttributeValue, Error, Result, Searchable};
pub use stats::CacheStats;
