//! Attribute values.
//!
//! A [`Value`] is the dynamic representation of a single resource attribute.
//! Besides the usual scalar and collection shapes it carries two states the
//! host engine distinguishes: [`Value::Null`] (absent) and [`Value::Unknown`]
//! (will only be known after apply).

use std::collections::BTreeMap;

/// A flat, name-keyed set of attribute values.
pub type Attributes = BTreeMap<String, Value>;

/// Shared null returned for absent attributes.
pub(crate) static NULL: Value = Value::Null;

/// A dynamically typed attribute value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Value {
    /// The attribute has no value.
    #[default]
    Null,
    /// The value is not known until apply.
    Unknown,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A string.
    String(String),
    /// An ordered list.
    List(Vec<Value>),
    /// A string-keyed map.
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` unless the value itself is [`Value::Unknown`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns `true` if neither the value nor any nested element is unknown.
    #[must_use]
    pub fn is_wholly_known(&self) -> bool {
        match self {
            Self::Unknown => false,
            Self::List(items) => items.iter().all(Self::is_wholly_known),
            Self::Map(entries) => entries.values().all(Self::is_wholly_known),
            _ => true,
        }
    }

    /// Returns `true` for null and for the zero value of each type.
    ///
    /// Unknown values are never zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Unknown => false,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::String(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
        }
    }

    /// Returns the string content, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the map entries, if this is a map.
    #[must_use]
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Builds a map value from string pairs.
    pub fn string_map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Self::String(v.into())))
                .collect(),
        )
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(value: BTreeMap<String, Value>) -> Self {
        Self::Map(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_values() {
        assert!(Value::Null.is_zero());
        assert!(Value::from("").is_zero());
        assert!(Value::from(false).is_zero());
        assert!(Value::Map(BTreeMap::new()).is_zero());
        assert!(!Value::Unknown.is_zero());
        assert!(!Value::from("x").is_zero());
    }

    #[test]
    fn nested_unknown_is_not_wholly_known() {
        let mut entries = BTreeMap::new();
        entries.insert("a".to_owned(), Value::from("1"));
        entries.insert("b".to_owned(), Value::Unknown);
        let value = Value::Map(entries);

        assert!(value.is_known());
        assert!(!value.is_wholly_known());
    }

    #[test]
    fn string_map_builds_string_entries() {
        let value = Value::string_map([("k", "v")]);
        let map = value.as_map().expect("map value");
        assert_eq!(map.get("k").and_then(Value::as_str), Some("v"));
    }
}
