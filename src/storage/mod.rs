//! Persistent Table subsystem for mirrordb
//!
//! An append-only record file holding one live row per `record_id`, with the
//! document stored as an opaque JSON blob.
//!
//! # Design Principles
//!
//! - Append-only (no in-place updates); latest record wins
//! - Checksum-verified on every read
//! - Full scan per read, no secondary indexes
//! - Seeded once, when opened empty
//! - Records are never deleted

mod checksum;
mod errors;
mod reader;
mod record;
mod seed;
mod table;
mod writer;

pub use checksum::compute_checksum;
pub use errors::{StorageError, StorageErrorCode, StorageResult};
pub use reader::TableReader;
pub use record::TableRecord;
pub use seed::default_seed;
pub use table::PersistentTable;
pub use writer::{table_path, TableWriter, TABLE_FILE_NAME};
