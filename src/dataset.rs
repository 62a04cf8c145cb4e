use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The data under validation: a mapping from attribute path to current value.
///
/// A `Dataset` is supplied by the validator context and is read-only from a
/// rule adapter's perspective; data-aware rules receive an owned snapshot of
/// it before every check so they can cross-reference other attributes.
///
/// Attribute paths are plain strings. Expanding wildcard or nested paths into
/// concrete attributes is the job of the field-rule expansion engine, not of
/// this crate.
///
/// # Examples
///
/// ```
/// use rule_core::Dataset;
/// use serde_json::json;
///
/// let mut data = Dataset::new();
/// data.insert("email", json!("alice@example.com"));
/// data.insert("nickname", json!(""));
///
/// assert!(data.filled("email"));
/// assert!(!data.filled("nickname")); // present but empty
/// assert!(!data.filled("age"));      // absent
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    values: Map<String, Value>,
}

impl Dataset {
    /// Creates an empty dataset.
    pub fn new() -> Self {
        Self { values: Map::new() }
    }

    /// Returns the value for the given attribute, if present.
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Returns the value for the given attribute, with `Value::Null`
    /// standing in for an absent attribute.
    ///
    /// This is the shape rule entrypoints see: an absent attribute and an
    /// explicit null are indistinguishable to a rule.
    pub fn value_or_null(&self, attribute: &str) -> &Value {
        self.values.get(attribute).unwrap_or(&Value::Null)
    }

    /// Inserts a value for an attribute, returning the previous value if any.
    pub fn insert(&mut self, attribute: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(attribute.into(), value)
    }

    /// Returns `true` if the attribute is present at all, even as null.
    pub fn contains(&self, attribute: &str) -> bool {
        self.values.contains_key(attribute)
    }

    /// Returns `true` if the attribute is present with a non-empty value.
    ///
    /// Absent attributes, nulls, empty strings, and empty arrays or objects
    /// all count as not filled. This is the notion of emptiness the
    /// validator engine's skip-on-empty policy keys on: non-implicit rules
    /// are only run against filled attributes, while implicit rules run
    /// regardless.
    pub fn filled(&self, attribute: &str) -> bool {
        match self.values.get(attribute) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(fields)) => !fields.is_empty(),
            Some(_) => true,
        }
    }

    /// Returns the number of attributes in the dataset.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the dataset holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(attribute, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}

impl From<Map<String, Value>> for Dataset {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl From<Dataset> for Map<String, Value> {
    fn from(dataset: Dataset) -> Self {
        dataset.values
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dataset {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn absent_attribute_reads_as_null() {
        let data = Dataset::new();

        assert_eq!(data.get("missing"), None);
        assert_eq!(data.value_or_null("missing"), &Value::Null);
    }

    #[test]
    fn filled_rejects_empty_shapes() {
        let mut data = Dataset::new();
        data.insert("null", json!(null));
        data.insert("empty_string", json!(""));
        data.insert("empty_array", json!([]));
        data.insert("empty_object", json!({}));

        assert!(!data.filled("absent"));
        assert!(!data.filled("null"));
        assert!(!data.filled("empty_string"));
        assert!(!data.filled("empty_array"));
        assert!(!data.filled("empty_object"));
    }

    #[test]
    fn filled_accepts_meaningful_values() {
        let mut data = Dataset::new();
        data.insert("name", json!("Alice"));
        data.insert("age", json!(0));
        data.insert("flags", json!([false]));
        data.insert("active", json!(false));

        assert!(data.filled("name"));
        assert!(data.filled("age")); // zero is a value, not an absence
        assert!(data.filled("flags"));
        assert!(data.filled("active"));
    }

    #[test]
    fn contains_is_presence_not_filledness() {
        let mut data = Dataset::new();
        data.insert("nickname", json!(null));

        assert!(data.contains("nickname"));
        assert!(!data.filled("nickname"));
    }

    #[test]
    fn from_iterator_collects_pairs() {
        let data: Dataset = vec![("a", json!(1)), ("b", json!(2))]
            .into_iter()
            .collect();

        assert_eq!(data.len(), 2);
        assert_eq!(data.get("b"), Some(&json!(2)));
    }
}
