//! Record types and the attribute extraction contract
//!
//! A cached value exposes named attributes through [`Searchable`]. Attribute
//! values are a small tagged scalar so an index can hold strings, integers
//! and booleans side by side.

use std::fmt;

use serde::Serialize;

/// Scalar value of a searchable attribute
///
/// Equality is exact and type-sensitive: `Int(1)` never equals `Str("1")`,
/// and strings compare case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// String value
    Str(String),
    /// Integer value
    Int(i64),
    /// Boolean value
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Str(s) => f.write_str(s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

/// A value type whose attributes can be indexed and searched
pub trait Searchable: Send + Sync + 'static {
    /// Every attribute name [`Searchable::attribute`] may answer for
    const ATTRIBUTES: &'static [&'static str];

    /// Extract the named attribute, `None` when unknown or absent
    fn attribute(&self, name: &str) -> Option<AttributeValue>;
}

/// Gender of a person record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Gender {
    /// "M"
    #[serde(rename = "M")]
    Male,
    /// "F"
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// Parse the single-letter form used by the input data
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "M" => Some(Gender::Male),
            "F" => Some(Gender::Female),
            _ => None,
        }
    }

    /// Single-letter form, as indexed and queried
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A person record as loaded from the data feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Person {
    /// Logical id from the data feed (not necessarily the cache key)
    pub id: u64,
    /// First name
    pub firstname: String,
    /// Last name
    pub lastname: String,
    /// Gender
    pub gender: Gender,
    /// Country name
    pub country: String,
}

impl Searchable for Person {
    const ATTRIBUTES: &'static [&'static str] = &["id", "firstname", "lastname", "gender", "country"];

    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        match name {
            "id" => i64::try_from(self.id).ok().map(AttributeValue::Int),
            "firstname" => Some(self.firstname.as_str().into()),
            "lastname" => Some(self.lastname.as_str().into()),
            "gender" => Some(self.gender.as_str().into()),
            "country" => Some(self.country.as_str().into()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Person {
        Person {
            id: 42,
            firstname: "Anna".to_string(),
            lastname: "Schmidt".to_string(),
            gender: Gender::Female,
            country: "Germany".to_string(),
        }
    }

    #[test]
    fn test_person_attributes() {
        let p = person();

        assert_eq!(p.attribute("id"), Some(AttributeValue::Int(42)));
        assert_eq!(p.attribute("lastname"), Some("Schmidt".into()));
        assert_eq!(p.attribute("gender"), Some("F".into()));
        assert_eq!(p.attribute("country"), Some("Germany".into()));
        assert_eq!(p.attribute("age"), None);
    }

    #[test]
    fn test_every_declared_attribute_resolves() {
        let p = person();
        for name in Person::ATTRIBUTES {
            assert!(p.attribute(name).is_some(), "{} did not resolve", name);
        }
    }

    #[test]
    fn test_value_equality_is_typed() {
        assert_ne!(AttributeValue::Int(1), AttributeValue::from("1"));
        assert_ne!(AttributeValue::from("smith"), AttributeValue::from("Smith"));
        assert_eq!(AttributeValue::from(true), AttributeValue::Bool(true));
    }

    #[test]
    fn test_gender_parse() {
        assert_eq!(Gender::parse("M"), Some(Gender::Male));
        assert_eq!(Gender::parse("F"), Some(Gender::Female));
        assert_eq!(Gender::parse("m"), None);
        assert_eq!(Gender::Female.to_string(), "F");
    }
}
