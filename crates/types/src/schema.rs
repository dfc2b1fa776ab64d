//! Log schema as published by the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known log fields and their metadata.
///
/// Field metadata is backend-defined and kept verbatim. The backend may
/// describe `fields` either as an object keyed by field name or as an
/// array of `{ "name": ..., ... }` entries; both shapes round-trip
/// unchanged, as does any other top-level key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default)]
    pub fields: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Schema {
    /// Names of all fields, in the order the backend listed them.
    pub fn field_names(&self) -> Vec<&str> {
        match &self.fields {
            Value::Object(map) => map.keys().map(String::as_str).collect(),
            Value::Array(items) => items
                .iter()
                .filter_map(|item| item.get("name").and_then(Value::as_str))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Metadata for a single field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        match &self.fields {
            Value::Object(map) => map.get(name),
            Value::Array(items) => items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(name)),
            _ => None,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_shaped_fields_round_trip() {
        let body = json!({
            "fields": [
                {"name": "time", "data_type": {"Timestamp": ["Microsecond", null]}, "nullable": false},
                {"name": "message", "data_type": "Utf8", "nullable": false}
            ],
            "metadata": {}
        });
        let schema: Schema = serde_json::from_value(body.clone()).unwrap();

        assert_eq!(schema.field_names(), vec!["time", "message"]);
        assert_eq!(schema.field("message").unwrap()["data_type"], json!("Utf8"));
        assert!(!schema.has_field("latency_ms"));
        assert_eq!(serde_json::to_value(&schema).unwrap(), body);
    }

    #[test]
    fn object_shaped_fields_keep_backend_order() {
        let schema: Schema =
            serde_json::from_str(r#"{"fields":{"time":{"type":"ts"},"level":{"type":"str"}}}"#).unwrap();
        assert_eq!(schema.field_names(), vec!["time", "level"]);
        assert_eq!(schema.field("level"), Some(&json!({"type": "str"})));
    }
}
