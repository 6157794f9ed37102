//! Table record format
//!
//! ```text
//! +------------------+
//! | Record Length    | (u32 LE)
//! +------------------+
//! | Record ID        | (length-prefixed UTF-8)
//! +------------------+
//! | Document Body    | (length-prefixed JSON bytes)
//! +------------------+
//! | Checksum         | (u32 LE)
//! +------------------+
//! ```
//!
//! Checksum covers all bytes except the checksum itself.

use std::io::{self, Read};

use serde_json::Value;

use super::checksum::compute_checksum;
use super::errors::{StorageError, StorageResult};
use crate::document::{self, Document};

/// len + id len + body len + checksum
pub(crate) const MIN_RECORD_SIZE: usize = 4 + 4 + 4 + 4;

/// One stored row: the primary key plus the document as an opaque blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRecord {
    /// Primary key
    pub record_id: String,
    /// Serialized document
    pub body: Vec<u8>,
}

impl TableRecord {
    /// Builds a record from a document, which must carry a string `record_id`.
    pub fn from_document(doc: &Document) -> StorageResult<Self> {
        let record_id = document::record_id(doc)
            .ok_or_else(|| StorageError::write_failed_no_source("document has no string record_id"))?
            .to_string();
        let body = serde_json::to_vec(doc).map_err(|e| {
            StorageError::write_failed_no_source(format!(
                "failed to encode document {}: {}",
                record_id, e
            ))
        })?;
        Ok(Self { record_id, body })
    }

    /// Decodes the stored blob back into a document.
    pub fn to_document(&self) -> StorageResult<Document> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StorageError::corruption_for_record(
                &self.record_id,
                "stored body is not a JSON object",
            )),
            Err(e) => Err(StorageError::corruption_for_record(
                &self.record_id,
                format!("stored body is not valid JSON: {}", e),
            )),
        }
    }

    fn serialize_body(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(8 + self.record_id.len() + self.body.len());

        buf.extend_from_slice(&(self.record_id.len() as u32).to_le_bytes());
        buf.extend_from_slice(self.record_id.as_bytes());

        buf.extend_from_slice(&(self.body.len() as u32).to_le_bytes());
        buf.extend_from_slice(&self.body);

        buf
    }

    /// Serialize the complete record to bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let body = self.serialize_body();
        let record_length = (4 + body.len() + 4) as u32;

        let mut record = Vec::with_capacity(record_length as usize);
        record.extend_from_slice(&record_length.to_le_bytes());
        record.extend_from_slice(&body);

        let checksum = compute_checksum(&record);
        record.extend_from_slice(&checksum.to_le_bytes());

        record
    }

    /// Deserialize a record from bytes, verifying checksum.
    ///
    /// Returns the record and the number of bytes consumed.
    pub fn deserialize(data: &[u8]) -> io::Result<(Self, usize)> {
        if data.len() < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Record too short",
            ));
        }

        let record_length = u32::from_le_bytes([data[0], data[1], data[2], data[3]]) as usize;

        if record_length < MIN_RECORD_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid record length: {}", record_length),
            ));
        }

        if data.len() < record_length {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "Record truncated: expected {} bytes, got {}",
                    record_length,
                    data.len()
                ),
            ));
        }

        let checksum_offset = record_length - 4;
        let stored_checksum = u32::from_le_bytes([
            data[checksum_offset],
            data[checksum_offset + 1],
            data[checksum_offset + 2],
            data[checksum_offset + 3],
        ]);
        let computed_checksum = compute_checksum(&data[0..checksum_offset]);

        if computed_checksum != stored_checksum {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "Checksum mismatch: computed {:08x}, stored {:08x}",
                    computed_checksum, stored_checksum
                ),
            ));
        }

        let mut cursor = io::Cursor::new(&data[4..checksum_offset]);

        fn read_bytes<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
            let mut len_buf = [0u8; 4];
            reader.read_exact(&mut len_buf)?;
            let len = u32::from_le_bytes(len_buf) as usize;

            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;
            Ok(buf)
        }

        let record_id = String::from_utf8(read_bytes(&mut cursor)?).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidData, format!("Invalid UTF-8: {}", e))
        })?;
        let body = read_bytes(&mut cursor)?;

        Ok((Self { record_id, body }, record_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_record() -> TableRecord {
        let doc = json!({"record_id": "bm001", "channel": "Bloomberg Markets"});
        TableRecord::from_document(doc.as_object().unwrap()).unwrap()
    }

    #[test]
    fn test_record_roundtrip() {
        let record = sample_record();
        let serialized = record.serialize();
        let (deserialized, consumed) = TableRecord::deserialize(&serialized).unwrap();

        assert_eq!(record, deserialized);
        assert_eq!(consumed, serialized.len());
        assert_eq!(
            deserialized.to_document().unwrap()["channel"],
            json!("Bloomberg Markets")
        );
    }

    #[test]
    fn test_checksum_detects_corruption() {
        let mut serialized = sample_record().serialize();
        let mid = serialized.len() / 2;
        serialized[mid] ^= 0xFF;

        let result = TableRecord::deserialize(&serialized);
        assert!(result.unwrap_err().to_string().contains("Checksum mismatch"));
    }

    #[test]
    fn test_truncated_record_rejected() {
        let serialized = sample_record().serialize();
        let result = TableRecord::deserialize(&serialized[..serialized.len() - 3]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_document_without_record_id_rejected() {
        let doc = json!({"title": "orphan"});
        assert!(TableRecord::from_document(doc.as_object().unwrap()).is_err());
    }

    #[test]
    fn test_non_object_body_is_corruption() {
        let record = TableRecord {
            record_id: "x".into(),
            body: b"[1,2]".to_vec(),
        };
        assert!(record.to_document().unwrap_err().is_corruption());
    }
}
