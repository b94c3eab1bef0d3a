//! Search configuration
//!
//! Names the cache and lists the attributes it indexes. The attribute list is
//! fixed once the cache is built.

use std::collections::HashSet;

use recordstore::{Error, Result, Searchable};

/// Cache name and indexed attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    name: String,
    attributes: Vec<String>,
    initial_capacity: usize,
}

impl SearchConfig {
    /// Start a configuration with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            initial_capacity: 0,
        }
    }

    /// The `persons` cache searchable by lastname, gender and country
    pub fn persons() -> Self {
        Self::new("persons")
            .attribute("lastname")
            .attribute("gender")
            .attribute("country")
    }

    /// Index another attribute
    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    /// Pre-size the record store
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Cache name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Indexed attributes, in configuration order
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Configured store capacity
    pub fn capacity(&self) -> usize {
        self.initial_capacity
    }

    /// Position of `name` in the attribute list
    pub(crate) fn position(&self, name: &str) -> Result<usize> {
        self.attributes
            .iter()
            .position(|a| a == name)
            .ok_or_else(|| Error::UnknownAttribute(name.to_string()))
    }

    /// Check the configuration against the value type it will index
    pub fn validate<V: Searchable>(&self) -> Result<()> {
        if self.attributes.is_empty() {
            return Err(Error::InvalidConfig(format!(
                "cache '{}' has no searchable attributes",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for attr in &self.attributes {
            if !seen.insert(attr.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "attribute '{}' configured twice",
                    attr
                )));
            }
            if !V::ATTRIBUTES.contains(&attr.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "attribute '{}' is not exposed by the cached type",
                    attr
                )));
            }
        }

        Ok(())
    }
}
