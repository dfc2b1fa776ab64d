//! Lenient deserializers for backend payload fields.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize any JSON scalar into its textual form.
///
/// Strings pass through unchanged, numbers and booleans use their JSON
/// rendering, `null` becomes the empty string and nested values are
/// rendered as compact JSON.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

/// Deserialize an optional list, treating `null` and a missing field alike.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
