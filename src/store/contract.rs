//! The document-store contract shared by every backend

use serde_json::Value;

use super::errors::StoreResult;
use super::index::IndexSpec;
use crate::cursor::{Cursor, SortSpec};
use crate::document::Document;

/// Uniform CRUD/query surface.
///
/// Filters are dialect JSON; `Value::Null` means "no filter". Callers hold
/// `Arc<dyn DocumentStore>` and never learn which backend they got.
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and CLI output
    fn backend_name(&self) -> &'static str;

    /// Number of documents matching `filter`
    fn count(&self, filter: &Value) -> StoreResult<usize>;

    /// Lazy filtered view
    fn find(&self, filter: &Value) -> StoreResult<Cursor>;

    /// First match, optionally under a sort. `Ok(None)` when nothing matches.
    fn find_one(&self, filter: &Value, sort: Option<&SortSpec>) -> StoreResult<Option<Document>>;

    /// Every distinct non-empty value of `field`, each exactly once
    fn distinct(&self, field: &str) -> StoreResult<Vec<Value>>;

    /// Runs an aggregation pipeline over all documents
    fn aggregate(&self, pipeline: &[Value]) -> StoreResult<Vec<Document>>;

    /// Insert-or-replace by `record_id`; `true` when newly created
    fn upsert(&self, doc: Document) -> StoreResult<bool>;

    /// Requests an index
    fn ensure_index(&self, spec: &IndexSpec) -> StoreResult<()>;
}
