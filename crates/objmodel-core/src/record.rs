//! Record representation for object-database rows.

use crate::value::Value;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// A single record fetched from (or destined for) an object store.
///
/// Records are insertion-ordered property maps. Relationship joins never
/// mutate a stored record; they attach related data on a shallow-merged
/// copy produced by [`Record::with_property`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    /// Property names in insertion order
    names: Vec<String>,
    /// Name -> value mapping for O(1) lookup
    values: HashMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of properties.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Check if this record has no properties.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Check if a property exists.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Get a property value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Set a property value, replacing in place or appending at the end.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        if !self.values.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.values.insert(name, value.into());
    }

    /// Produce a shallow-merged copy with one extra (or replaced) property.
    ///
    /// This is the attachment primitive used by relationship joins: the
    /// receiver is left untouched.
    #[must_use]
    pub fn with_property(&self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut copy = self.clone();
        copy.set(name, value);
        copy
    }

    /// Property names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }

    /// Get a property as an i64.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Get a property as an f64.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Get a property as a string slice.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Get a property as a list slice.
    pub fn get_list(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Value::as_list)
    }

    /// Get a property as a nested record.
    pub fn get_record(&self, name: &str) -> Option<&Record> {
        self.get(name).and_then(Value::as_record)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.names.len()))?;
        for name in &self.names {
            if let Some(value) = self.values.get(name) {
                map.serialize_entry(name, value)?;
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct RecordVisitor;

        impl<'de> Visitor<'de> for RecordVisitor {
            type Value = Record;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of property names to values")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Record, A::Error> {
                let mut record = Record::new();
                while let Some((name, value)) = access.next_entry::<String, Value>()? {
                    record.set(name, value);
                }
                Ok(record)
            }
        }

        deserializer.deserialize_map(RecordVisitor)
    }
}

/// Build a [`Record`] from `name => value` pairs.
///
/// # Example
///
/// ```
/// use objmodel_core::record;
///
/// let brand = record! {
///     "id" => 2,
///     "category_id" => 2,
///     "title" => "samsung",
/// };
/// assert_eq!(brand.get_i64("id"), Some(2));
/// assert_eq!(brand.get_str("title"), Some("samsung"));
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::Record::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $(record.set($name, $crate::Value::from($value));)+
        record
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_preserves_insertion_order() {
        let mut record = Record::new();
        record.set("id", 1);
        record.set("title", "windows");
        record.set("id", 2);

        assert_eq!(record.names(), &["id".to_string(), "title".to_string()]);
        assert_eq!(record.get_i64("id"), Some(2));
    }

    #[test]
    fn test_with_property_leaves_original_untouched() {
        let original = record! { "id" => 1 };
        let joined = original.with_property("brands", vec![record! { "id" => 2 }]);

        assert!(!original.contains("brands"));
        assert!(joined.contains("brands"));
        assert_eq!(original.get_i64("id"), Some(1));
    }

    #[test]
    fn test_iter_order() {
        let record = record! { "a" => 1, "b" => 2, "c" => 3 };
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_serde_round_trip_preserves_order() {
        let record = record! { "id" => 3, "title" => "ios", "created_at" => "2012/12/12 12:12:12" };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.starts_with("{\"id\":3"));
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
