use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// AttributeBag
///
/// Ordered mapping from attribute name to value, owned by one entity
/// instance. The save executor reads it and may wholesale-replace it
/// (purge, hash) but never partially mutates it during read phases.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, IntoIterator, PartialEq, Serialize,
)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<String, Value>);

impl AttributeBag {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Chainable insert for declaration-style construction.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }
}

impl FromIterator<(String, Value)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

///
/// ErrorBag
///
/// Field-keyed validation messages. Entities hold a shared snapshot handle
/// to one of these; a passing validation replaces the handle with a fresh
/// empty bag rather than clearing the old one in place.
///

#[derive(Clone, Debug, Default, Deref, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ErrorBag(BTreeMap<String, Vec<String>>);

impl ErrorBag {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// First message recorded for a field, if any.
    #[must_use]
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// All messages recorded for a field.
    #[must_use]
    pub fn all(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Total message count across all fields.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{AttributeBag, ErrorBag};
    use crate::value::Value;

    #[test]
    fn attribute_bag_replaces_on_reinsert() {
        let mut bag = AttributeBag::new();
        bag.insert("name", "a");
        bag.insert("name", "b");

        assert_eq!(bag.get("name"), Some(&Value::Text("b".into())));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn error_bag_accumulates_in_order() {
        let mut bag = ErrorBag::new();
        bag.add("email", "must be an email");
        bag.add("email", "already taken");
        bag.add("name", "required");

        assert_eq!(bag.first("email"), Some("must be an email"));
        assert_eq!(bag.all("email").len(), 2);
        assert_eq!(bag.count(), 3);
        assert_eq!(bag.first("missing"), None);
    }

    #[test]
    fn error_bag_serializes_as_plain_map() {
        let mut bag = ErrorBag::new();
        bag.add("name", "required");

        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"name":["required"]}"#);
    }
}
