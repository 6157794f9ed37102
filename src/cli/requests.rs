//! Request bodies read from stdin

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::errors::{CliError, CliResult};

/// Decodes a request body, reporting shape errors as invalid requests
pub fn decode<T: DeserializeOwned>(request: Value) -> CliResult<T> {
    serde_json::from_value(request).map_err(|e| CliError::invalid_request(e.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CountRequest {
    pub filter: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindRequest {
    pub filter: Value,
    pub sort: Option<Value>,
    pub skip: usize,
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FindOneRequest {
    pub filter: Value,
    pub sort: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct DistinctRequest {
    pub field: String,
}

#[derive(Debug, Deserialize)]
pub struct AggregateRequest {
    pub pipeline: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertRequest {
    pub document: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_defaults() {
        let request: FindRequest = decode(json!({})).unwrap();
        assert!(request.filter.is_null());
        assert_eq!(request.skip, 0);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn test_missing_required_field() {
        let err = decode::<DistinctRequest>(json!({})).unwrap_err();
        assert_eq!(err.code_str(), "MIRROR_CLI_INVALID_REQUEST");
    }

    #[test]
    fn test_upsert_needs_object() {
        assert!(decode::<UpsertRequest>(json!({"document": [1]})).is_err());
        let request: UpsertRequest = decode(json!({"document": {"record_id": "x"}})).unwrap();
        assert_eq!(request.document["record_id"], json!("x"));
    }
}
