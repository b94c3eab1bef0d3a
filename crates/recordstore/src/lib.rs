//! # recordstore
//!
//! Records, the keyed record store and the data feed for PersonSearch.
//!
//! ## Contents
//! - **Records**: `Person` and the `Searchable` attribute contract
//! - **Store**: AHash-backed key -> `Arc<V>` map, last write wins
//! - **Feed**: nom CSV parser over the file contents, plus replica keys

#![warn(missing_docs)]

mod error;
mod loader;
mod parser;
mod record;
mod store;

pub use error::{Error, Result};
pub use loader::{load_persons, replica_key, Replicas};
pub use parser::{parse_person, parse_persons};
pub use record::{AttributeValue, Gender, Person, Searchable};
pub use store::RecordStore;
