//! Observability events for persistkv
//!
//! Every log line emitted by this crate carries an `event` field naming one
//! of these variants, so logs can be filtered on a stable vocabulary instead
//! of free-form messages. Emission goes through `tracing`; the crate never
//! installs a subscriber.
//!
//! ```ignore
//! tracing::info!(event = %Event::KvsOpenComplete, instance = %id, "kvs opened");
//! ```

use std::fmt;

/// Observable events in persistkv
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Open started
    KvsOpenBegin,
    /// Open complete, handle ready
    KvsOpenComplete,
    /// Open rejected
    KvsOpenFailed,
    /// Handle released
    KvsReleased,

    // Snapshot store
    /// Document loaded and parsed
    SnapshotLoaded,
    /// Document absent
    SnapshotMissing,
    /// Document present but no checksum file
    SnapshotUnverified,
    /// Checksum disagreement
    SnapshotIntegrityMismatch,
    /// Document and checksum written
    SnapshotSaved,
    /// Generations shifted before a save
    SnapshotRotated,
    /// Older generation restored into the live mapping
    SnapshotRestored,

    // Flush
    /// Explicit or scoped flush complete
    FlushComplete,
    /// Flush at scoped release failed (reported, not propagated)
    FlushOnExitFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::KvsOpenBegin => "KVS_OPEN_BEGIN",
            Event::KvsOpenComplete => "KVS_OPEN_COMPLETE",
            Event::KvsOpenFailed => "KVS_OPEN_FAILED",
            Event::KvsReleased => "KVS_RELEASED",
            Event::SnapshotLoaded => "SNAPSHOT_LOADED",
            Event::SnapshotMissing => "SNAPSHOT_MISSING",
            Event::SnapshotUnverified => "SNAPSHOT_UNVERIFIED",
            Event::SnapshotIntegrityMismatch => "SNAPSHOT_INTEGRITY_MISMATCH",
            Event::SnapshotSaved => "SNAPSHOT_SAVED",
            Event::SnapshotRotated => "SNAPSHOT_ROTATED",
            Event::SnapshotRestored => "SNAPSHOT_RESTORED",
            Event::FlushComplete => "FLUSH_COMPLETE",
            Event::FlushOnExitFailed => "FLUSH_ON_EXIT_FAILED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
