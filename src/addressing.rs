//! Instance addressing
//!
//! Maps an instance identity to the file prefixes of its documents:
//!
//! ```text
//! <base_dir>/<process_name>/kvs_<instance_id>_default.{json,hash}
//! <base_dir>/<process_name>/kvs_<instance_id>_<generation>.{json,hash}
//! ```
//!
//! Generation 0 is the working snapshot; 1.. are older generations kept by
//! rotation. Everything here is pure path arithmetic, no I/O.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Document file extension
pub const DOCUMENT_EXTENSION: &str = "json";

/// Checksum file extension
pub const CHECKSUM_EXTENSION: &str = "hash";

/// Numeric instance identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// Create a new instance ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot generation selector. `0` is the working snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotId(pub usize);

impl SnapshotId {
    /// The working snapshot
    pub const CURRENT: SnapshotId = SnapshotId(0);

    /// Create a new snapshot ID
    pub fn new(id: usize) -> Self {
        Self(id)
    }

    /// Returns the raw generation number
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File prefix shared by a document and its checksum.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotPrefix {
    prefix: PathBuf,
}

impl SnapshotPrefix {
    /// Wraps an arbitrary prefix path.
    pub fn new(prefix: impl Into<PathBuf>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Returns the bare prefix.
    pub fn as_path(&self) -> &Path {
        &self.prefix
    }

    /// Returns `<prefix>.json`.
    pub fn document_path(&self) -> PathBuf {
        self.with_extension(DOCUMENT_EXTENSION)
    }

    /// Returns `<prefix>.hash`.
    pub fn checksum_path(&self) -> PathBuf {
        self.with_extension(CHECKSUM_EXTENSION)
    }

    // Appends rather than replaces: prefixes never carry an extension of their own.
    fn with_extension(&self, extension: &str) -> PathBuf {
        let mut path = OsString::from(self.prefix.as_os_str());
        path.push(".");
        path.push(extension);
        PathBuf::from(path)
    }
}

impl fmt::Display for SnapshotPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.prefix.display())
    }
}

/// Returns `<base_dir>/<process_name>`.
pub fn process_dir(base_dir: &Path, process_name: &str) -> PathBuf {
    base_dir.join(process_name)
}

/// Returns the defaults prefix `<base_dir>/<process_name>/kvs_<id>_default`.
pub fn defaults_prefix(base_dir: &Path, process_name: &str, instance_id: InstanceId) -> SnapshotPrefix {
    SnapshotPrefix::new(
        process_dir(base_dir, process_name).join(format!("kvs_{}_default", instance_id)),
    )
}

/// Returns the instance prefix `<base_dir>/<process_name>/kvs_<id>_<generation>`.
pub fn instance_prefix(
    base_dir: &Path,
    process_name: &str,
    instance_id: InstanceId,
    generation: SnapshotId,
) -> SnapshotPrefix {
    SnapshotPrefix::new(
        process_dir(base_dir, process_name).join(format!("kvs_{}_{}", instance_id, generation)),
    )
}
