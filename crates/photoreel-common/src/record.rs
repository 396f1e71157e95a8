//! Field map describing one photo as returned by a source.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ids::{OwnerId, PhotoId};

/// Mapping of field name to value for a single photo.
///
/// Sources are loose about types: numeric fields such as `farm` may arrive as
/// JSON numbers or strings. [`PhotoRecord::text`] reads either form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRecord(Map<String, Value>);

impl PhotoRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Raw value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Field value as text. Strings and numbers are accepted; empty strings
    /// and every other JSON type read as absent.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The photo's identifier, if present.
    pub fn id(&self) -> Option<PhotoId> {
        self.text("id").and_then(|id| PhotoId::new(id).ok())
    }

    /// The photo's owner, if the record carries one.
    pub fn owner(&self) -> Option<OwnerId> {
        self.text("owner").and_then(|o| OwnerId::new(o).ok())
    }

    /// The photo's title, if present and textual.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Set a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    /// Copy every field of `other` into this record. Fields of `other` win
    /// on collision.
    pub fn merge_from(&mut self, other: &PhotoRecord) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Iterate over field names and values in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PhotoRecord {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<PhotoRecord> for Map<String, Value> {
    fn from(record: PhotoRecord) -> Self {
        record.0
    }
}

impl FromIterator<(String, Value)> for PhotoRecord {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PhotoRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_text_accepts_strings_and_numbers() {
        let r = record(json!({"farm": 1, "server": "2", "secret": "", "geo": {"lat": 1}}));
        assert_eq!(r.text("farm").as_deref(), Some("1"));
        assert_eq!(r.text("server").as_deref(), Some("2"));
        assert_eq!(r.text("secret"), None);
        assert_eq!(r.text("geo"), None);
        assert_eq!(r.text("missing"), None);
    }

    #[test]
    fn test_identity_accessors() {
        let r = record(json!({"id": "123", "owner": "55@N00", "title": "Harbour"}));
        assert_eq!(r.id().unwrap().as_str(), "123");
        assert_eq!(r.owner().unwrap().as_str(), "55@N00");
        assert_eq!(r.title(), Some("Harbour"));
    }

    #[test]
    fn test_merge_prefers_incoming_fields() {
        let mut base = record(json!({"id": "1", "title": "list title", "views": "3"}));
        let detail = record(json!({"title": "detail title", "license": "4"}));
        base.merge_from(&detail);
        assert_eq!(base.title(), Some("detail title"));
        assert_eq!(base.text("views").as_deref(), Some("3"));
        assert_eq!(base.text("license").as_deref(), Some("4"));
        assert_eq!(base.len(), 4);
    }
}
