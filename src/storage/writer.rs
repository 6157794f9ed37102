//! Append-only table writer with fsync enforcement
//!
//! Records are never updated in place; an upsert appends a new record and the
//! latest record for a `record_id` wins on read.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::record::TableRecord;

/// Table file name under `<data_dir>/data/`
pub const TABLE_FILE_NAME: &str = "records.dat";

/// Returns `<data_dir>/data/records.dat`.
pub fn table_path(data_dir: &Path) -> PathBuf {
    data_dir.join("data").join(TABLE_FILE_NAME)
}

/// Writer holding the long-lived table file handle.
pub struct TableWriter {
    table_path: PathBuf,
    file: File,
    current_offset: u64,
}

impl TableWriter {
    /// Opens or creates the table file, creating parent directories if needed.
    pub fn open(data_dir: &Path) -> StorageResult<Self> {
        let table_path = table_path(data_dir);

        if let Some(parent) = table_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    StorageError::write_failed(
                        format!("Failed to create data directory: {}", parent.display()),
                        e,
                    )
                })?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&table_path)
            .map_err(|e| {
                StorageError::write_failed(
                    format!("Failed to open table file: {}", table_path.display()),
                    e,
                )
            })?;

        let current_offset = file
            .metadata()
            .map_err(|e| StorageError::io_error("Failed to read table metadata", e))?
            .len();

        Ok(Self {
            table_path,
            file,
            current_offset,
        })
    }

    /// Returns the path to the table file.
    pub fn path(&self) -> &Path {
        &self.table_path
    }

    /// Returns the byte length of the table (the next append offset).
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// The underlying handle, for scans.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Appends one record and fsyncs. Returns the offset it was written at.
    pub fn append(&mut self, record: &TableRecord) -> StorageResult<u64> {
        self.append_batch(std::slice::from_ref(record))
    }

    /// Appends records back to back with a single fsync.
    ///
    /// Returns the offset of the first record.
    pub fn append_batch(&mut self, records: &[TableRecord]) -> StorageResult<u64> {
        let offset = self.current_offset;
        let mut buf = Vec::new();
        for record in records {
            buf.extend_from_slice(&record.serialize());
        }

        self.file.write_all(&buf).map_err(|e| {
            StorageError::write_failed(
                format!("Failed to append {} record(s)", records.len()),
                e,
            )
        })?;

        self.file.sync_all().map_err(|e| {
            StorageError::write_failed(
                format!("fsync failed after appending {} record(s)", records.len()),
                e,
            )
        })?;

        self.current_offset += buf.len() as u64;
        Ok(offset)
    }
}
