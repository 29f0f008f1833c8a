//! Opaque JSON documents exchanged with the backend.
//!
//! Change requests, systems, feedbacks, projects and comments are defined by
//! the backend. This crate passes them through untouched and only inspects the
//! `key`, `title` and `description` fields for keyword search.

use serde_json::{Map, Value};

/// A backend entity: a JSON object with arbitrary fields.
pub type Document = Map<String, Value>;

/// Fields consulted by keyword search.
pub const SEARCH_FIELDS: [&str; 3] = ["key", "title", "description"];

/// Coerces a list response into a sequence.
///
/// - an array is returned as-is
/// - an object carrying an `items` array yields that array
/// - `null` yields an empty list
/// - any other value is wrapped as a one-element list
pub fn into_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                map.insert("items".to_string(), other);
                vec![Value::Object(map)]
            }
            None => vec![Value::Object(map)],
        },
        other => vec![other],
    }
}

/// Case-insensitive substring match over the search fields.
///
/// `needle` must already be lowercased. Non-string fields never match.
pub fn matches_keyword(entry: &Value, needle: &str) -> bool {
    SEARCH_FIELDS.iter().any(|field| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}
