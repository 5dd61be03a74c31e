//! Product EPD documents in the EN ISO 22057 JSON layout, where every data
//! template property is an object carrying its `guid`.

use crate::utils::error::Result;
use serde_json::Value;

const GUID_KEY: &str = "guid";
const VALUE_KEY: &str = "value";
const VALUES_KEY: &str = "values";

#[derive(Debug, Clone, PartialEq)]
pub struct ProductData {
    document: Value,
}

impl ProductData {
    pub fn new(document: Value) -> Self {
        Self { document }
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    /// Text of the `value` declared for `guid`.
    pub fn value_of(&self, guid: &str) -> Option<String> {
        find_by_guid(&self.document, guid, VALUE_KEY).and_then(raw_text)
    }

    /// The per-module `values` block of an indicator row.
    pub fn indicator_values(&self, guid: &str) -> Option<&Value> {
        find_by_guid(&self.document, guid, VALUES_KEY)
    }
}

/// Depth-first search for the first object whose `guid` equals `guid`,
/// returning its `key` entry. A null entry does not count as a match.
pub fn find_by_guid<'a>(data: &'a Value, guid: &str, key: &str) -> Option<&'a Value> {
    match data {
        Value::Object(map) => {
            if map.get(GUID_KEY).and_then(Value::as_str) == Some(guid) {
                if let Some(found) = map.get(key).filter(|v| !v.is_null()) {
                    return Some(found);
                }
            }
            map.values().find_map(|child| find_by_guid(child, guid, key))
        }
        Value::Array(items) => items.iter().find_map(|item| find_by_guid(item, guid, key)),
        _ => None,
    }
}

/// Scalars as template text. Empty strings, nulls and containers give `None`.
pub fn raw_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
