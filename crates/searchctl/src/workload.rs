//! Population and query steps of a workload run

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use recordstore::{load_persons, Person, Replicas};
use searchcache::{PutSummary, SearchCache};
use tracing::{info, warn};

use crate::query_spec::QuerySpec;
use crate::report::QueryOutcome;

/// Result of loading the feed into the cache
#[derive(Debug, Clone, Copy)]
pub struct Population {
    /// Base records read from the feed
    pub base_records: usize,
    /// Insert/replace counts of the bulk put
    pub summary: PutSummary,
    /// Time spent putting
    pub millis: u64,
}

/// Load the feed and put `replicas` copies of it into `cache`
pub fn populate(cache: &SearchCache<Person>, path: &Path, replicas: u64) -> Result<Population> {
    info!("Creating persons from {}...", path.display());
    let persons =
        load_persons(path).with_context(|| format!("failed to load {}", path.display()))?;
    info!("Created {} persons from feed.", persons.len());

    info!("Put persons into cache...");
    let entries = Replicas::new(&persons, replicas)
        .collect::<searchcache::Result<Vec<_>>>()
        .context("failed to compute replica keys")?;

    let started = Instant::now();
    let summary = cache.put_all(entries);
    let millis = started.elapsed().as_millis() as u64;

    info!("All persons cached in {}ms.", millis);
    info!("Cache size is {} elements", cache.len());
    if summary.replaced > 0 {
        warn!(
            "{} replicated keys collided and replaced earlier records",
            summary.replaced
        );
    }

    Ok(Population {
        base_records: persons.len(),
        summary,
        millis,
    })
}

/// Run one query and release its results
pub fn run_query(cache: &SearchCache<Person>, spec: &QuerySpec) -> Result<QueryOutcome> {
    info!("Preparing search for {}...", spec);
    let started = Instant::now();

    let mut builder = cache.create_query().include_values();
    for (attribute, value) in spec.criteria() {
        builder = builder
            .add_criteria(attribute, value.as_str())
            .with_context(|| format!("invalid query {}", spec))?;
    }
    let query = builder.end().with_context(|| format!("invalid query {}", spec))?;

    let results = query.execute();
    let count = results.size();
    let millis = started.elapsed().as_millis() as u64;
    info!("Searchresult: found {} persons in {} ms.", count, millis);
    results.discard();

    Ok(QueryOutcome {
        query: spec.to_string(),
        count,
        millis,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use searchcache::SearchConfig;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn feed() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"1,Michael,Smith,M,Germany\n\
              2,Claire,Dubois,F,France\n\
              3,Hans,Schmidt,M,Germany\n\
              4,Anna,Jones,F,United States of America\n",
        )
        .unwrap();
        file.flush().unwrap();
        file
    }

    fn cache() -> SearchCache<Person> {
        SearchCache::new(SearchConfig::persons()).unwrap()
    }

    #[test]
    fn test_populate() {
        let file = feed();
        let cache = cache();

        let population = populate(&cache, file.path(), 10).unwrap();

        assert_eq!(population.base_records, 4);
        assert_eq!(population.summary.inserted, 40);
        assert_eq!(population.summary.replaced, 0);
        assert_eq!(cache.len(), 40);
    }

    #[test]
    fn test_populate_missing_feed() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = populate(&cache(), &dir.path().join("none.csv"), 10).unwrap_err();
        assert!(err.to_string().contains("failed to load"));
    }

    #[test]
    fn test_run_query() {
        let file = feed();
        let cache = cache();
        populate(&cache, file.path(), 10).unwrap();

        let outcome = run_query(&cache, &"gender=M,country=Germany".parse().unwrap()).unwrap();
        assert_eq!(outcome.count, 20);
        assert_eq!(outcome.query, "gender='M' and country='Germany'");

        let outcome = run_query(&cache, &"lastname=Nobody".parse().unwrap()).unwrap();
        assert_eq!(outcome.count, 0);
        assert_eq!(cache.stats().open_results(), 0);
    }

    #[test]
    fn test_run_query_unknown_attribute() {
        let cache = cache();
        let result = run_query(&cache, &"firstname=Anna".parse().unwrap());
        assert!(result.is_err());
    }
}
