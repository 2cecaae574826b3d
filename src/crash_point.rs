//! Crash point injection for the snapshot save path
//!
//! A save is a sequence of separate filesystem steps: rotate generations,
//! write the document, write its checksum. Each boundary between steps is a
//! [`CrashPoint`]. Setting `PERSISTKV_CRASH_POINT` to a point's name makes
//! the process abort there: no cleanup, no unwinding, no drop handlers, so
//! no flush-on-exit either.
//!
//! The interesting point is `snapshot_after_document_write`. A crash there
//! leaves a document newer than its checksum, which the next load rejects
//! as an integrity mismatch.
//!
//! ```bash
//! PERSISTKV_CRASH_POINT=snapshot_after_document_write ./my_app
//! ```
//!
//! Unknown names arm nothing.

use std::fmt;
use std::sync::OnceLock;

/// Environment variable naming the armed crash point
pub const CRASH_POINT_ENV: &str = "PERSISTKV_CRASH_POINT";

/// A step boundary inside a snapshot save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrashPoint {
    /// Document serialized, no generation moved yet
    BeforeRotate,
    /// Generations shifted, slot 0 empty
    AfterRotate,
    /// Document written, checksum still the previous one
    AfterDocumentWrite,
    /// Document and checksum both written
    AfterChecksumWrite,
}

impl CrashPoint {
    /// Every crash point, in save order
    pub const ALL: [CrashPoint; 4] = [
        CrashPoint::BeforeRotate,
        CrashPoint::AfterRotate,
        CrashPoint::AfterDocumentWrite,
        CrashPoint::AfterChecksumWrite,
    ];

    /// Name used in `PERSISTKV_CRASH_POINT`
    pub fn as_str(&self) -> &'static str {
        match self {
            CrashPoint::BeforeRotate => "snapshot_before_rotate",
            CrashPoint::AfterRotate => "snapshot_after_rotate",
            CrashPoint::AfterDocumentWrite => "snapshot_after_document_write",
            CrashPoint::AfterChecksumWrite => "snapshot_after_checksum_write",
        }
    }

    /// Looks up a crash point by name.
    pub fn from_name(name: &str) -> Option<CrashPoint> {
        Self::ALL.into_iter().find(|point| point.as_str() == name)
    }
}

impl fmt::Display for CrashPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read once; the environment is not consulted again.
static ARMED: OnceLock<Option<CrashPoint>> = OnceLock::new();

/// Returns the crash point armed for this process, if any.
pub fn armed() -> Option<CrashPoint> {
    *ARMED.get_or_init(|| {
        std::env::var(CRASH_POINT_ENV)
            .ok()
            .and_then(|name| CrashPoint::from_name(name.trim()))
    })
}

/// Aborts the process if `point` is the armed crash point.
#[inline]
pub fn maybe_crash(point: CrashPoint) {
    if armed() == Some(point) {
        eprintln!("[CRASH] Triggering crash at point: {}", point);
        std::process::abort();
    }
}
