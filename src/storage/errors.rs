//! Storage error types
//!
//! Error codes:
//! - MIRROR_STORAGE_IO_ERROR
//! - MIRROR_STORAGE_WRITE_FAILED
//! - MIRROR_STORAGE_READ_FAILED
//! - MIRROR_DATA_CORRUPTION
//!
//! Every storage error fails the single operation that hit it. None of them
//! touch the store selector's fallback state.

use std::fmt;
use std::io;

use crate::observability::Severity;

/// Storage-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageErrorCode {
    /// Disk I/O failure
    MirrorStorageIoError,
    /// Record write failed
    MirrorStorageWriteFailed,
    /// Record read failed
    MirrorStorageReadFailed,
    /// Checksum failure, truncation or undecodable record
    MirrorDataCorruption,
}

impl StorageErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            StorageErrorCode::MirrorStorageIoError => "MIRROR_STORAGE_IO_ERROR",
            StorageErrorCode::MirrorStorageWriteFailed => "MIRROR_STORAGE_WRITE_FAILED",
            StorageErrorCode::MirrorStorageReadFailed => "MIRROR_STORAGE_READ_FAILED",
            StorageErrorCode::MirrorDataCorruption => "MIRROR_DATA_CORRUPTION",
        }
    }

    /// Severity used when the fault is logged. Corruption is FATAL.
    pub fn severity(&self) -> Severity {
        match self {
            StorageErrorCode::MirrorDataCorruption => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for StorageErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Storage error with context
#[derive(Debug)]
pub struct StorageError {
    code: StorageErrorCode,
    message: String,
    details: Option<String>,
    source: Option<io::Error>,
}

impl StorageError {
    /// Create a new storage I/O error
    pub fn io_error(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::MirrorStorageIoError,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new storage write failed error
    pub fn write_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::MirrorStorageWriteFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a storage write failed error without IO source
    pub fn write_failed_no_source(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MirrorStorageWriteFailed,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a new storage read failed error
    pub fn read_failed(message: impl Into<String>, source: io::Error) -> Self {
        Self {
            code: StorageErrorCode::MirrorStorageReadFailed,
            message: message.into(),
            details: None,
            source: Some(source),
        }
    }

    /// Create a new data corruption error
    pub fn data_corruption(message: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MirrorDataCorruption,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create a data corruption error with byte offset context
    pub fn corruption_at_offset(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MirrorDataCorruption,
            message: reason.into(),
            details: Some(format!("byte_offset: {}", offset)),
            source: None,
        }
    }

    /// Create a data corruption error with record ID context
    pub fn corruption_for_record(record_id: &str, reason: impl Into<String>) -> Self {
        Self {
            code: StorageErrorCode::MirrorDataCorruption,
            message: reason.into(),
            details: Some(format!("record_id: {}", record_id)),
            source: None,
        }
    }

    /// The table's lock was poisoned by a panicking writer
    pub fn lock_poisoned() -> Self {
        Self {
            code: StorageErrorCode::MirrorStorageIoError,
            message: "table lock poisoned by a panicked operation".into(),
            details: None,
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> StorageErrorCode {
        self.code
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns additional error details
    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    /// Returns whether the table contents could not be trusted
    pub fn is_corruption(&self) -> bool {
        self.code == StorageErrorCode::MirrorDataCorruption
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        if let Some(ref source) = self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            StorageErrorCode::MirrorStorageIoError.code(),
            "MIRROR_STORAGE_IO_ERROR"
        );
        assert_eq!(
            StorageErrorCode::MirrorStorageWriteFailed.code(),
            "MIRROR_STORAGE_WRITE_FAILED"
        );
        assert_eq!(
            StorageErrorCode::MirrorStorageReadFailed.code(),
            "MIRROR_STORAGE_READ_FAILED"
        );
        assert_eq!(
            StorageErrorCode::MirrorDataCorruption.code(),
            "MIRROR_DATA_CORRUPTION"
        );
    }

    #[test]
    fn test_severities() {
        assert_eq!(StorageErrorCode::MirrorDataCorruption.severity(), Severity::Fatal);
        assert_eq!(StorageErrorCode::MirrorStorageIoError.severity(), Severity::Error);
    }

    #[test]
    fn test_corruption_flag() {
        assert!(StorageError::data_corruption("checksum mismatch").is_corruption());
        let err = StorageError::write_failed(
            "disk full",
            io::Error::new(io::ErrorKind::Other, "disk full"),
        );
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_error_display_contains_context() {
        let err = StorageError::corruption_at_offset(1024, "checksum mismatch");
        let display = format!("{}", err);
        assert!(display.contains("MIRROR_DATA_CORRUPTION"));
        assert!(display.contains("checksum mismatch"));
        assert!(display.contains("byte_offset: 1024"));
    }

    #[test]
    fn test_display_includes_io_source() {
        let err = StorageError::read_failed(
            "Failed to open table",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().contains("denied"));
    }
}
