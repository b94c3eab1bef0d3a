//! Query specifications given on the command line
//!
//! Format: `attribute=value[,attribute=value...]`, all criteria joined by AND.
//! Values are taken verbatim, so they may contain spaces but not commas.

use std::fmt;
use std::str::FromStr;

/// One command-line query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    criteria: Vec<(String, String)>,
}

impl QuerySpec {
    /// Build from (attribute, value) pairs
    pub fn new<A, B>(criteria: &[(A, B)]) -> Self
    where
        A: AsRef<str>,
        B: AsRef<str>,
    {
        Self {
            criteria: criteria
                .iter()
                .map(|(a, v)| (a.as_ref().to_string(), v.as_ref().to_string()))
                .collect(),
        }
    }

    /// The searches of the reference person workload
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new(&[("lastname", "Smith")]),
            Self::new(&[("gender", "M")]),
            Self::new(&[("country", "Germany")]),
            Self::new(&[("gender", "F"), ("country", "France")]),
            Self::new(&[("gender", "M"), ("lastname", "Schmidt")]),
            Self::new(&[("lastname", "Jones"), ("country", "United States of America")]),
        ]
    }

    /// (attribute, value) pairs
    pub fn criteria(&self) -> &[(String, String)] {
        &self.criteria
    }
}

impl FromStr for QuerySpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut criteria = Vec::new();

        for part in s.split(',') {
            let (attribute, value) = part
                .split_once('=')
                .ok_or_else(|| format!("expected attribute=value, got '{}'", part))?;
            let attribute = attribute.trim();
            if attribute.is_empty() {
                return Err(format!("missing attribute name in '{}'", part));
            }
            criteria.push((attribute.to_string(), value.to_string()));
        }

        Ok(Self { criteria })
    }
}

impl fmt::Display for QuerySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (attribute, value)) in self.criteria.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{}='{}'", attribute, value)?;
        }
        Ok(())
    }
}
