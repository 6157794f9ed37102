//! Sequential table scans with corruption detection
//!
//! Every read validates the record checksum. There is no secondary index:
//! each query scans the whole file and resolves overwrites in memory.

use std::collections::HashMap;
use std::io::{BufReader, Read, Seek, SeekFrom};

use super::errors::{StorageError, StorageResult};
use super::record::{TableRecord, MIN_RECORD_SIZE};

/// Reader over the table file (or any seekable byte source in tests).
pub struct TableReader<R: Read + Seek> {
    reader: BufReader<R>,
    current_offset: u64,
    file_size: u64,
}

impl<R: Read + Seek> TableReader<R> {
    /// Positions a new reader at the start of `source`, which holds `file_size` bytes.
    pub fn from_start(source: R, file_size: u64) -> StorageResult<Self> {
        let mut reader = BufReader::new(source);
        reader
            .seek(SeekFrom::Start(0))
            .map_err(|e| StorageError::read_failed("Failed to seek to table start", e))?;
        Ok(Self {
            reader,
            current_offset: 0,
            file_size,
        })
    }

    /// Returns the current read offset.
    pub fn current_offset(&self) -> u64 {
        self.current_offset
    }

    /// Reads the next record.
    ///
    /// - `Ok(Some(record))` if a record was read
    /// - `Ok(None)` at end of table
    /// - `Err(MIRROR_DATA_CORRUPTION)` on checksum failure or truncation
    pub fn read_next(&mut self) -> StorageResult<Option<TableRecord>> {
        if self.current_offset >= self.file_size {
            return Ok(None);
        }

        let remaining = self.file_size - self.current_offset;
        if remaining < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Truncated table: {} bytes remaining, minimum record size is {}",
                    remaining, MIN_RECORD_SIZE
                ),
            ));
        }

        let mut len_buf = [0u8; 4];
        self.reader.read_exact(&mut len_buf).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record length: {}", e),
            )
        })?;
        let record_length = u32::from_le_bytes(len_buf) as u64;

        if record_length < MIN_RECORD_SIZE as u64 {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if record_length > remaining {
            return Err(StorageError::corruption_at_offset(
                self.current_offset,
                format!(
                    "Record length {} exceeds remaining table size {}",
                    record_length, remaining
                ),
            ));
        }

        let mut record_buf = vec![0u8; record_length as usize];
        record_buf[0..4].copy_from_slice(&len_buf);
        self.reader.read_exact(&mut record_buf[4..]).map_err(|e| {
            StorageError::corruption_at_offset(
                self.current_offset,
                format!("Failed to read record body: {}", e),
            )
        })?;

        let (record, bytes_consumed) = TableRecord::deserialize(&record_buf)
            .map_err(|e| StorageError::corruption_at_offset(self.current_offset, e.to_string()))?;

        self.current_offset += bytes_consumed as u64;

        Ok(Some(record))
    }

    /// Reads every physical record, overwritten ones included.
    pub fn read_all(&mut self) -> StorageResult<Vec<TableRecord>> {
        let mut records = Vec::new();
        while let Some(record) = self.read_next()? {
            records.push(record);
        }
        Ok(records)
    }

    /// Reads the live rows: the latest record per `record_id`.
    ///
    /// Rows are ordered by the position of their latest write, so an
    /// overwritten record moves to the end like an insert-or-replace would.
    pub fn read_live(&mut self) -> StorageResult<Vec<TableRecord>> {
        let mut slots: Vec<Option<TableRecord>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        while let Some(record) = self.read_next()? {
            if let Some(previous) = positions.insert(record.record_id.clone(), slots.len()) {
                slots[previous] = None;
            }
            slots.push(Some(record));
        }

        Ok(slots.into_iter().flatten().collect())
    }
}
