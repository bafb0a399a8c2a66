//! Untyped entity record.
//!
//! Stores hold records as plain JSON objects so one state machine serves every
//! entity kind. Typed models convert in and out through serde.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name to JSON value. The `id` field is absent until the server has
/// assigned one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRecord(Map<String, Value>);

impl EntityRecord {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Identifier as a path segment. Numeric ids are rendered in decimal.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn retain(&mut self, keep: impl FnMut(&String, &mut Value) -> bool) {
        self.0.retain(keep)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Build a record from a JSON value; anything but an object is rejected.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn from_model<T: Serialize>(model: &T) -> serde_json::Result<Self> {
        let value = serde_json::to_value(model)?;
        Self::from_value(value).ok_or_else(|| {
            serde::ser::Error::custom("entity model did not serialize to a JSON object")
        })
    }

    pub fn to_model<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for EntityRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for EntityRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EntityRecord {
        EntityRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_id_forms() {
        assert_eq!(record(json!({"id": 7})).id(), Some("7".into()));
        assert_eq!(record(json!({"id": "abc"})).id(), Some("abc".into()));
        assert_eq!(record(json!({"id": ""})).id(), None);
        assert_eq!(record(json!({"id": null})).id(), None);
        assert_eq!(record(json!({"name": "x"})).id(), None);
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(EntityRecord::from_value(json!([1, 2])).is_none());
        assert!(EntityRecord::from_value(json!("x")).is_none());
        assert!(EntityRecord::from_value(Value::Null).is_none());
    }
}
