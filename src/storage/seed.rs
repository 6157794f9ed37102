//! Built-in seed set written into an empty table.

use serde_json::Value;

use super::errors::{StorageError, StorageResult};
use crate::document::Document;

const SEED_JSON: &str = include_str!("../../assets/seed.json");

/// Parses the embedded seed set.
pub fn default_seed() -> StorageResult<Vec<Document>> {
    let parsed: Value = serde_json::from_str(SEED_JSON)
        .map_err(|e| StorageError::data_corruption(format!("embedded seed set is invalid: {}", e)))?;

    let items = match parsed {
        Value::Array(items) => items,
        _ => {
            return Err(StorageError::data_corruption(
                "embedded seed set must be a JSON array",
            ))
        }
    };

    items
        .into_iter()
        .map(|item| match item {
            Value::Object(doc) => Ok(doc),
            _ => Err(StorageError::data_corruption(
                "embedded seed entries must be JSON objects",
            )),
        })
        .collect()
}
