//! Store contract errors

use thiserror::Error;

use crate::aggregate::PipelineError;
use crate::filter::FilterError;
use crate::storage::StorageError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced to store callers.
///
/// A failed operation never changes which backend the selector routes to.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The table failed to open, read or write for this operation
    #[error("storage fault: {0}")]
    Storage(#[from] StorageError),

    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),

    #[error("invalid pipeline: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("invalid sort: {0}")]
    InvalidSort(String),

    /// Upserted document lacks a string `record_id`
    #[error("document has no string record_id")]
    MissingRecordId,

    /// A remote backend failed an operation after connecting
    #[error("remote backend error: {0}")]
    Remote(String),
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Storage(e) => e.code().code(),
            StoreError::Filter(e) => e.code(),
            StoreError::Pipeline(e) => e.code(),
            StoreError::InvalidSort(_) => "MIRROR_STORE_INVALID_SORT",
            StoreError::MissingRecordId => "MIRROR_STORE_MISSING_RECORD_ID",
            StoreError::Remote(_) => "MIRROR_STORE_REMOTE_ERROR",
        }
    }

    /// True for table faults, as opposed to caller mistakes
    pub fn is_storage_fault(&self) -> bool {
        matches!(self, StoreError::Storage(_))
    }
}
