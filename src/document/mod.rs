//! Document model shared by every layer of the store
//!
//! A document is an ordered JSON object. `record_id` is the primary key and is
//! unique across the table; every other field is optional.

mod compare;
mod video;

pub use compare::{compare_values, field_for_sort, match_text, range_compare, values_equal};
pub use video::{VideoRecord, DESCRIPTION_MAX_CHARS};

use serde_json::{Map, Value};

/// A schema-flexible field/value record
pub type Document = Map<String, Value>;

/// Primary key field name
pub const RECORD_ID: &str = "record_id";

/// Returns the document's primary key, if present and a string.
pub fn record_id(doc: &Document) -> Option<&str> {
    doc.get(RECORD_ID).and_then(Value::as_str)
}

/// True when `value` carries no information for `distinct`.
///
/// Null, empty strings, empty lists and empty maps are considered empty.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}
