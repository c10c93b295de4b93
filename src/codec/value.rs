//! Canonical value encoding
//!
//! Encoding goes through `serde_json::Value`. Object keys are re-inserted in
//! sorted order, so the output stays canonical even when serde_json's
//! `preserve_order` feature is enabled somewhere in the dependency graph.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Result;

/// Encode a value to its canonical text form
pub fn encode<V: Serialize + ?Sized>(value: &V) -> Result<String> {
    let canonical = canonicalize(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&canonical)?)
}

/// Decode a value from text produced by [`encode`]
///
/// Malformed text fails with `CacheError::Serialization`.
pub fn decode<V: DeserializeOwned>(text: &str) -> Result<V> {
    Ok(serde_json::from_str(text)?)
}

/// Rebuild every object with its keys in ascending order
fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut fields: Vec<(String, Value)> = map.into_iter().collect();
            fields.sort_by(|a, b| a.0.cmp(&b.0));

            let mut sorted = Map::with_capacity(fields.len());
            for (key, field) in fields {
                sorted.insert(key, canonicalize(field));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
