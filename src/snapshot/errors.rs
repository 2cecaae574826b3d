//! Snapshot error types
//!
//! Error codes:
//! - KVS_SNAPSHOT_MISSING (document file absent, recoverable per open policy)
//! - KVS_SNAPSHOT_INTEGRITY (checksum disagreement, never ignored)
//! - KVS_SNAPSHOT_FORMAT (bytes are not a document whose top level is an object)
//! - KVS_SNAPSHOT_IO (underlying filesystem failure)

use std::fmt;
use std::io;
use std::path::Path;

/// Snapshot-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotErrorCode {
    /// Expected document file is absent
    Missing,
    /// Checksum record does not match the document bytes
    IntegrityMismatch,
    /// Document could not be parsed or serialized
    FormatError,
    /// Filesystem failure
    Io,
}

impl SnapshotErrorCode {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            SnapshotErrorCode::Missing => "KVS_SNAPSHOT_MISSING",
            SnapshotErrorCode::IntegrityMismatch => "KVS_SNAPSHOT_INTEGRITY",
            SnapshotErrorCode::FormatError => "KVS_SNAPSHOT_FORMAT",
            SnapshotErrorCode::Io => "KVS_SNAPSHOT_IO",
        }
    }

    /// Returns whether this code signals damaged data rather than absent data
    /// or a transient failure.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            SnapshotErrorCode::IntegrityMismatch | SnapshotErrorCode::FormatError
        )
    }
}

impl fmt::Display for SnapshotErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Snapshot error type with full context
#[derive(Debug)]
pub struct SnapshotError {
    /// Error code
    code: SnapshotErrorCode,
    /// Human-readable message
    message: String,
    /// Optional details about the error context
    details: Option<String>,
    /// Underlying IO error if applicable
    source: Option<io::Error>,
}

impl SnapshotError {
    /// Create a missing-file error for the given path
    pub fn missing(path: &Path) -> Self {
        Self {
            code: SnapshotErrorCode::Missing,
            message: format!("File not found: {}", path.display()),
            details: None,
            source: None,
        }
    }

    /// Create an integrity error for a document whose checksum disagrees
    pub fn integrity_mismatch(path: &Path, stored: u32, computed: u32) -> Self {
        Self {
            code: SnapshotErrorCode::IntegrityMismatch,
            message: format!("Checksum mismatch for {}", path.display()),
            details: Some(format!(
                "stored {:#010x}, computed {:#010x}",
                stored, computed
            )),
            source: None,
        }
    }

    /// Create an integrity error for a malformed checksum record
    pub fn malformed_checksum(path: &Path, len: usize) -> Self {
        Self {
            code: SnapshotErrorCode::IntegrityMismatch,
            message: format!("Malformed checksum record: {}", path.display()),
            details: Some(format!("expected 4 bytes, found {}", len)),
            source: None,
        }
    }

    /// Create a format error
    pub fn format_error(message: impl Into<String>) -> Self {
        Self {
            code: SnapshotErrorCode::FormatError,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Create an I/O error with path context
    pub fn io_error_at_path(path: &Path, source: io::Error) -> Self {
        Self {
            code: SnapshotErrorCode::Io,
            message: format!("I/O error at path: {}", path.display()),
            details: None,
            source: Some(source),
        }
    }

    /// Add details to an error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Returns the error code
    pub fn code(&self) -> SnapshotErrorCode {
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

    /// Returns whether the expected file was simply absent
    pub fn is_missing(&self) -> bool {
        self.code == SnapshotErrorCode::Missing
    }
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for snapshot operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;
