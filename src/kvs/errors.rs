//! Store handle errors

use std::path::PathBuf;

use thiserror::Error;

use crate::addressing::SnapshotId;
use crate::config::ConfigError;
use crate::snapshot::SnapshotError;
use crate::value::ValueError;

/// Errors from opening a store
#[derive(Debug, Error)]
pub enum OpenError {
    #[error("Defaults document required but missing: {}", .path.display())]
    MissingDefaults { path: PathBuf },

    #[error("KVS document required but missing: {}", .path.display())]
    MissingKvs { path: PathBuf },

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl OpenError {
    /// Returns true if an existing document was found damaged
    pub fn is_corruption(&self) -> bool {
        matches!(self, OpenError::Snapshot(e) if e.code().is_corruption())
    }
}

/// Errors from key lookup and removal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Key not found: {0}")]
    NotFound(String),

    #[error("Value of key '{key}' cannot be read as requested: {source}")]
    TypeMismatch {
        key: String,
        #[source]
        source: ValueError,
    },
}

/// Errors from restoring an older generation
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("Invalid snapshot id: {0}")]
    InvalidSnapshotId(SnapshotId),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
