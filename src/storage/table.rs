//! Persistent key/document table
//!
//! One long-lived file handle behind a mutex serves every read and write.
//! Reads are full scans; `record_id` uniqueness is enforced here, on the
//! upsert path, and nowhere else.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::errors::{StorageError, StorageResult};
use super::reader::TableReader;
use super::record::TableRecord;
use super::writer::TableWriter;
use crate::document::Document;
use crate::observability::{Event, Logger};

struct TableState {
    writer: TableWriter,
    /// Live primary keys
    ids: HashSet<String>,
}

impl TableState {
    fn scan(&self) -> StorageResult<Vec<TableRecord>> {
        let mut reader = TableReader::from_start(self.writer.file(), self.writer.current_offset())?;
        reader.read_live()
    }
}

/// Durable `record_id` -> document mapping.
pub struct PersistentTable {
    path: PathBuf,
    state: Mutex<TableState>,
}

impl PersistentTable {
    /// Opens the table under `data_dir`, seeding it with `seed` if it is empty.
    ///
    /// The emptiness check and the seed write happen before the table is
    /// shared, so the bootstrap runs at most once per open. Seed rows are
    /// keyed by `record_id`, so even a second seeding would only overwrite.
    pub fn open(data_dir: &Path, seed: &[Document]) -> StorageResult<Self> {
        let writer = TableWriter::open(data_dir)?;
        let path = writer.path().to_path_buf();

        let mut state = TableState {
            writer,
            ids: HashSet::new(),
        };
        state.ids = state
            .scan()?
            .into_iter()
            .map(|record| record.record_id)
            .collect();

        let shown_path = path.display().to_string();
        let live = state.ids.len().to_string();
        Logger::info(
            Event::TableOpened,
            &[("path", shown_path.as_str()), ("records", live.as_str())],
        );

        if state.ids.is_empty() && !seed.is_empty() {
            let records = seed
                .iter()
                .map(TableRecord::from_document)
                .collect::<StorageResult<Vec<_>>>()?;
            state.writer.append_batch(&records)?;
            state
                .ids
                .extend(records.into_iter().map(|record| record.record_id));

            let seeded = state.ids.len().to_string();
            Logger::info(Event::TableSeeded, &[("records", seeded.as_str())]);
        }

        Ok(Self {
            path,
            state: Mutex::new(state),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, TableState>> {
        self.state.lock().map_err(|_| StorageError::lock_poisoned())
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every live document in insertion order.
    pub fn load_all(&self) -> StorageResult<Vec<Document>> {
        let records = self.lock()?.scan()?;
        records.iter().map(TableRecord::to_document).collect()
    }

    /// Number of live records.
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self.lock()?.ids.len())
    }

    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }

    pub fn contains(&self, record_id: &str) -> StorageResult<bool> {
        Ok(self.lock()?.ids.contains(record_id))
    }

    /// Insert-or-replace keyed by `record_id`.
    ///
    /// Returns `true` when the key was not present before.
    pub fn upsert(&self, doc: &Document) -> StorageResult<bool> {
        let record = TableRecord::from_document(doc)?;
        let mut state = self.lock()?;

        state.writer.append(&record)?;
        Ok(state.ids.insert(record.record_id))
    }
}
