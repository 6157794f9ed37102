//! Local Store
//!
//! The embedded backend: Persistent Table, Filter Engine, Cursor and
//! Aggregation Engine behind the store contract. Every read is a full scan
//! of the table, taken fresh per call.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use super::contract::DocumentStore;
use super::errors::{StoreError, StoreResult};
use super::index::IndexSpec;
use crate::aggregate::Pipeline;
use crate::cursor::{Cursor, CursorOptions, CursorSource, SortSpec};
use crate::document::{is_empty_value, record_id, Document};
use crate::filter::{Filter, FilterParser, OperatorPolicy};
use crate::observability::{Event, Logger};
use crate::storage::{PersistentTable, StorageResult};

pub const LOCAL_BACKEND: &str = "local";

/// Embedded document store over a [`PersistentTable`]
#[derive(Clone)]
pub struct LocalStore {
    table: Arc<PersistentTable>,
    parser: FilterParser,
}

impl LocalStore {
    /// Opens (and seeds, when empty) the table under `data_dir`.
    pub fn open(data_dir: &Path, seed: &[Document], policy: OperatorPolicy) -> StoreResult<Self> {
        let table = fault("open", PersistentTable::open(data_dir, seed))?;
        Ok(Self::new(Arc::new(table), policy))
    }

    pub fn new(table: Arc<PersistentTable>, policy: OperatorPolicy) -> Self {
        Self {
            table,
            parser: FilterParser::new(policy),
        }
    }

    pub fn table(&self) -> &PersistentTable {
        &self.table
    }

    pub fn policy(&self) -> OperatorPolicy {
        self.parser.policy()
    }

    fn load(&self, operation: &str) -> StoreResult<Vec<Document>> {
        fault(operation, self.table.load_all())
    }

    fn matching(&self, filter: &Filter, operation: &str) -> StoreResult<Vec<Document>> {
        Ok(filter.apply(self.load(operation)?))
    }
}

/// Logs a table fault and lifts it into a store error.
fn fault<T>(operation: &str, result: StorageResult<T>) -> StoreResult<T> {
    result.map_err(|e| {
        let message = e.to_string();
        Logger::log(
            e.code().severity(),
            Event::StorageFault,
            &[
                ("code", e.code().code()),
                ("operation", operation),
                ("message", message.as_str()),
            ],
        );
        StoreError::from(e)
    })
}

impl CursorSource for LocalStore {
    fn resolve(&self, filter: &Filter, options: &CursorOptions) -> StoreResult<Vec<Document>> {
        Ok(options.apply(self.matching(filter, "find")?))
    }
}

impl DocumentStore for LocalStore {
    fn backend_name(&self) -> &'static str {
        LOCAL_BACKEND
    }

    fn count(&self, filter: &Value) -> StoreResult<usize> {
        let filter = self.parser.parse(filter)?;
        Ok(self.matching(&filter, "count")?.len())
    }

    fn find(&self, filter: &Value) -> StoreResult<Cursor> {
        let filter = self.parser.parse(filter)?;
        Ok(Cursor::new(Arc::new(self.clone()), filter))
    }

    fn find_one(&self, filter: &Value, sort: Option<&SortSpec>) -> StoreResult<Option<Document>> {
        let filter = self.parser.parse(filter)?;
        let mut docs = self.matching(&filter, "find_one")?;
        if let Some(spec) = sort {
            spec.sort(&mut docs);
        }
        Ok(docs.into_iter().next())
    }

    fn distinct(&self, field: &str) -> StoreResult<Vec<Value>> {
        let mut seen = HashSet::new();
        let values = self
            .load("distinct")?
            .into_iter()
            .filter_map(|mut doc| doc.remove(field))
            .filter(|value| !is_empty_value(value))
            .filter(|value| seen.insert(value.to_string()))
            .collect();
        Ok(values)
    }

    fn aggregate(&self, pipeline: &[Value]) -> StoreResult<Vec<Document>> {
        let pipeline = Pipeline::parse(pipeline, self.policy())?;
        Ok(pipeline.execute(self.load("aggregate")?))
    }

    fn upsert(&self, doc: Document) -> StoreResult<bool> {
        let id = record_id(&doc).ok_or(StoreError::MissingRecordId)?.to_string();
        let inserted = fault("upsert", self.table.upsert(&doc))?;

        let outcome = if inserted { "inserted" } else { "replaced" };
        Logger::trace(
            Event::UpsertApplied,
            &[("record_id", id.as_str()), ("outcome", outcome)],
        );
        Ok(inserted)
    }

    /// Inert: the table has no secondary indexes and every read is a full
    /// scan. Accepted so callers need no backend-specific index path.
    fn ensure_index(&self, spec: &IndexSpec) -> StoreResult<()> {
        let name = spec.name();
        Logger::trace(
            Event::IndexRequestIgnored,
            &[("backend", LOCAL_BACKEND), ("index", name.as_str())],
        );
        Ok(())
    }
}
