//! Loading person feeds from disk and replicating them into cache keys
//!
//! The feed is read into memory and parsed in one pass. Bulk loads replicate the
//! base set: replica `i` of a record with id `id` out of `n` records lands on
//! key `id + n * i`, which keeps replicas apart as long as the ids stay
//! within `1..=n`.

use std::path::Path;

use crate::error::{Error, Result};
use crate::parser::parse_persons;
use crate::record::Person;

/// Load every person from a CSV feed
///
/// An empty file yields an empty list.
pub fn load_persons<P: AsRef<Path>>(path: P) -> Result<Vec<Person>> {
    let data = std::fs::read(path)?;
    parse_persons(&data)
}

/// Cache key of replica `replica` of the record with `base_id`
pub fn replica_key(base_id: u64, record_count: u64, replica: u64) -> Result<u64> {
    record_count
        .checked_mul(replica)
        .and_then(|offset| base_id.checked_add(offset))
        .ok_or(Error::KeyOverflow { base_id, replica })
}

/// Iterator over `(key, person)` for every replica of a base set
///
/// Yields replica 0 of every record first, then replica 1, and so on.
pub struct Replicas<'a> {
    persons: &'a [Person],
    replicas: u64,
    replica: u64,
    pos: usize,
}

impl<'a> Replicas<'a> {
    /// Replicate `persons` `replicas` times
    pub fn new(persons: &'a [Person], replicas: u64) -> Self {
        Self {
            persons,
            replicas,
            replica: 0,
            pos: 0,
        }
    }

    /// Total number of items this iterator yields
    pub fn total(&self) -> usize {
        let replicas = usize::try_from(self.replicas).unwrap_or(usize::MAX);
        self.persons.len().saturating_mul(replicas)
    }
}

impl Iterator for Replicas<'_> {
    type Item = Result<(u64, Person)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.persons.is_empty() || self.replica >= self.replicas {
            return None;
        }

        let person = &self.persons[self.pos];
        let key = replica_key(person.id, self.persons.len() as u64, self.replica);

        self.pos += 1;
        if self.pos == self.persons.len() {
            self.pos = 0;
            self.replica += 1;
        }

        Some(key.map(|k| (k, person.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Gender;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn person(id: u64) -> Person {
        Person {
            id,
            firstname: "Jan".to_string(),
            lastname: "Novak".to_string(),
            gender: Gender::Male,
            country: "Poland".to_string(),
        }
    }

    #[test]
    fn test_load_persons() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1,Michael,Smith,M,Germany\n2,Claire,Dubois,F,France\n")
            .unwrap();
        file.flush().unwrap();

        let persons = load_persons(file.path()).unwrap();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[0].lastname, "Smith");
    }

    #[test]
    fn test_load_empty_file() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_persons(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_load_crlf_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1,Michael,Smith,M,Germany\r\n2,Claire,Dubois,F,France\r\n")
            .unwrap();
        file.flush().unwrap();

        let persons = load_persons(file.path()).unwrap();
        assert_eq!(persons.len(), 2);
        assert_eq!(persons[1].country, "France");
    }

    #[test]
    fn test_load_malformed_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1,Michael,Smith,M,Germany\nnot a record\n").unwrap();
        file.flush().unwrap();

        let result = load_persons(file.path());
        assert!(matches!(result, Err(Error::Parse { line: 2, .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = load_persons(dir.path().join("missing.csv"));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_replica_key() {
        assert_eq!(replica_key(5, 100, 0).unwrap(), 5);
        assert_eq!(replica_key(5, 100, 3).unwrap(), 305);
        assert!(matches!(
            replica_key(u64::MAX, 2, 1),
            Err(Error::KeyOverflow { replica: 1, .. })
        ));
    }

    #[test]
    fn test_replicas_do_not_collide() {
        let persons: Vec<_> = (1..=50).map(person).collect();
        let keys: Vec<u64> = Replicas::new(&persons, 10)
            .map(|item| item.unwrap().0)
            .collect();

        assert_eq!(keys.len(), 500);
        let unique: std::collections::HashSet<_> = keys.iter().collect();
        assert_eq!(unique.len(), 500);
        assert_eq!(keys[0], 1);
        assert_eq!(keys[50], 51);
        assert_eq!(*keys.last().unwrap(), 500);
    }

    #[test]
    fn test_replicas_empty() {
        assert_eq!(Replicas::new(&[], 10).count(), 0);
        assert_eq!(Replicas::new(&[person(1)], 0).count(), 0);
    }

    #[test]
    fn test_replicas_total() {
        let persons: Vec<_> = (1..=3).map(person).collect();
        assert_eq!(Replicas::new(&persons, 4).total(), 12);
        assert_eq!(Replicas::new(&persons, u64::MAX).total(), usize::MAX);
        assert_eq!(Replicas::new(&[], u64::MAX).total(), 0);
    }
}
