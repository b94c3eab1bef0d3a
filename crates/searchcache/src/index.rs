//! Attribute index
//!
//! One posting map per indexed attribute: attribute value -> set of keys whose
//! current record holds that value. A key sits under (attribute, value) if and
//! only if the record stored at that key has that value; postings that empty
//! out are dropped.

use std::collections::{HashMap, HashSet};

use ahash::RandomState;
use recordstore::{AttributeValue, Error, Result, Searchable};

/// Set of cache keys
pub type KeySet = HashSet<u64, RandomState>;

type Postings = HashMap<AttributeValue, KeySet, RandomState>;

/// Secondary index over the configured attributes
pub struct AttributeIndex {
    attributes: Vec<String>,
    postings: Vec<Postings>,
    /// Returned for lookups without a match
    empty: KeySet,
}

impl AttributeIndex {
    /// Create an empty index over `attributes`
    pub fn new(attributes: &[String]) -> Self {
        Self {
            attributes: attributes.to_vec(),
            postings: attributes.iter().map(|_| Postings::default()).collect(),
            empty: KeySet::default(),
        }
    }

    /// Reconcile the index after `key` moved from `old` to `new`
    ///
    /// Every attribute is read before any posting changes, so a panicking
    /// extractor leaves the index untouched.
    pub fn on_put<V: Searchable>(&mut self, key: u64, old: Option<&V>, new: &V) {
        let changes: Vec<_> = self
            .attributes
            .iter()
            .map(|attr| (old.and_then(|o| o.attribute(attr)), new.attribute(attr)))
            .collect();

        for (postings, (old_value, new_value)) in self.postings.iter_mut().zip(changes) {
            if let Some(old_value) = old_value {
                if new_value.as_ref() != Some(&old_value) {
                    unlink(postings, key, &old_value);
                }
            }

            if let Some(value) = new_value {
                postings.entry(value).or_default().insert(key);
            }
        }
    }

    /// Drop every contribution `old` made under `key`
    pub fn on_remove<V: Searchable>(&mut self, key: u64, old: &V) {
        let values: Vec<_> = self.attributes.iter().map(|attr| old.attribute(attr)).collect();

        for (postings, value) in self.postings.iter_mut().zip(values) {
            if let Some(value) = value {
                unlink(postings, key, &value);
            }
        }
    }

    /// Keys whose record has `attribute == value`
    ///
    /// Returns an empty set when nothing matches, and
    /// [`Error::UnknownAttribute`] when `attribute` is not indexed.
    pub fn lookup(&self, attribute: &str, value: &AttributeValue) -> Result<&KeySet> {
        Ok(self.lookup_at(self.position(attribute)?, value))
    }

    /// Lookup by attribute position, as resolved from the configuration
    pub(crate) fn lookup_at(&self, pos: usize, value: &AttributeValue) -> &KeySet {
        self.postings
            .get(pos)
            .and_then(|postings| postings.get(value))
            .unwrap_or(&self.empty)
    }

    /// Number of distinct values currently indexed for `attribute`
    pub fn distinct_values(&self, attribute: &str) -> Result<usize> {
        Ok(self.postings[self.position(attribute)?].len())
    }

    /// Indexed attribute names
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Drop every posting
    pub fn clear(&mut self) {
        for postings in &mut self.postings {
            postings.clear();
        }
    }

    fn position(&self, attribute: &str) -> Result<usize> {
        self.attributes
            .iter()
            .position(|a| a == attribute)
            .ok_or_else(|| Error::UnknownAttribute(attribute.to_string()))
    }
}

fn unlink(postings: &mut Postings, key: u64, value: &AttributeValue) {
    if let Some(keys) = postings.get_mut(value) {
        keys.remove(&key);
        if keys.is_empty() {
            postings.remove(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recordstore::{Gender, Person};

    fn attrs() -> Vec<String> {
        vec!["lastname".to_string(), "gender".to_string(), "country".to_string()]
    }

    fn person(lastname: &str, gender: Gender, country: &str) -> Person {
        Person {
            id: 1,
            firstname: "Test".to_string(),
            lastname: lastname.to_string(),
            gender,
            country: country.to_string(),
        }
    }

    fn keys(set: &KeySet) -> Vec<u64> {
        let mut keys: Vec<_> = set.iter().copied().collect();
        keys.sort_unstable();
        keys
    }

    #[test]
    fn test_index_insert() {
        let mut index = AttributeIndex::new(&attrs());
        index.on_put(1, None, &person("Smith", Gender::Male, "Germany"));
        index.on_put(2, None, &person("Smith", Gender::Female, "France"));

        assert_eq!(keys(index.lookup("lastname", &"Smith".into()).unwrap()), vec![1, 2]);
        assert_eq!(keys(index.lookup("gender", &"F".into()).unwrap()), vec![2]);
        assert_eq!(keys(index.lookup("country", &"Germany".into()).unwrap()), vec![1]);
    }

    #[test]
    fn test_index_update_moves_key() {
        let mut index = AttributeIndex::new(&attrs());
        let old = person("Smith", Gender::Male, "Germany");
        let new = person("Smith", Gender::Male, "France");

        index.on_put(1, None, &old);
        index.on_put(1, Some(&old), &new);

        assert!(index.lookup("country", &"Germany".into()).unwrap().is_empty());
        assert_eq!(keys(index.lookup("country", &"France".into()).unwrap()), vec![1]);
        assert_eq!(keys(index.lookup("lastname", &"Smith".into()).unwrap()), vec![1]);
        assert_eq!(index.distinct_values("country").unwrap(), 1);
    }

    #[test]
    fn test_index_repeat_put_is_stable() {
        let mut index = AttributeIndex::new(&attrs());
        let p = person("Jones", Gender::Female, "Spain");

        index.on_put(7, None, &p);
        index.on_put(7, Some(&p), &p);
        index.on_put(7, Some(&p), &p);

        assert_eq!(keys(index.lookup("lastname", &"Jones".into()).unwrap()), vec![7]);
        assert_eq!(index.distinct_values("lastname").unwrap(), 1);
    }

    #[test]
    fn test_index_remove() {
        let mut index = AttributeIndex::new(&attrs());
        let a = person("Jones", Gender::Female, "Spain");
        let b = person("Jones", Gender::Male, "Spain");

        index.on_put(1, None, &a);
        index.on_put(2, None, &b);
        index.on_remove(1, &a);

        assert_eq!(keys(index.lookup("lastname", &"Jones".into()).unwrap()), vec![2]);
        assert!(index.lookup("gender", &"F".into()).unwrap().is_empty());
        assert_eq!(index.distinct_values("gender").unwrap(), 1);
    }

    #[test]
    fn test_lookup_no_match_is_empty() {
        let index = AttributeIndex::new(&attrs());
        assert!(index.lookup("lastname", &"Nobody".into()).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut index = AttributeIndex::new(&attrs());
        index.on_put(1, None, &person("Smith", Gender::Male, "Germany"));

        assert!(index.lookup("lastname", &"smith".into()).unwrap().is_empty());
        assert!(index.lookup("lastname", &"Smit".into()).unwrap().is_empty());
    }

    #[test]
    fn test_lookup_unknown_attribute() {
        let index = AttributeIndex::new(&attrs());
        let result = index.lookup("firstname", &"Anna".into());
        assert!(matches!(result, Err(Error::UnknownAttribute(name)) if name == "firstname"));
    }

    #[test]
    fn test_integer_attribute() {
        let mut index = AttributeIndex::new(&["id".to_string()]);
        index.on_put(10, None, &person("Smith", Gender::Male, "Germany"));

        assert_eq!(keys(index.lookup("id", &AttributeValue::Int(1)).unwrap()), vec![10]);
        assert!(index.lookup("id", &"1".into()).unwrap().is_empty());
    }

    #[test]
    fn test_clear() {
        let mut index = AttributeIndex::new(&attrs());
        index.on_put(1, None, &person("Smith", Gender::Male, "Germany"));
        index.clear();

        assert_eq!(index.distinct_values("lastname").unwrap(), 0);
    }
}
