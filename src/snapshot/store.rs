//! Snapshot store: load and save of (document, checksum) pairs
//!
//! Load order:
//! 1. Document absent → `Missing`
//! 2. Read document bytes in full
//! 3. Checksum file present → verify before parsing, mismatch → `IntegrityMismatch`.
//!    Checksum file absent → accepted as unverified
//! 4. Parse; parse failure or non-object top level → `FormatError`
//!
//! Save order:
//! 1. Serialize
//! 2. Write document (overwrite, fsync)
//! 3. Write checksum of exactly those bytes (overwrite, fsync)
//!
//! Steps 2 and 3 are not atomic with respect to each other. A crash between
//! them leaves a document newer than its checksum; the next load reports
//! `IntegrityMismatch` for it. There is no attempt to paper over that window.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use super::checksum;
use super::codec::{DocumentCodec, JsonCodec};
use super::errors::{SnapshotError, SnapshotResult};
use crate::addressing::SnapshotPrefix;
use crate::crash_point::{maybe_crash, CrashPoint};
use crate::observability::Event;
use crate::value::KvsMap;

/// Reads and writes checksummed snapshot documents.
#[derive(Debug)]
pub struct SnapshotStore {
    codec: Box<dyn DocumentCodec>,
}

impl SnapshotStore {
    /// Create a snapshot store with the given codec
    pub fn new(codec: Box<dyn DocumentCodec>) -> Self {
        Self { codec }
    }

    /// Loads and verifies the document at `prefix`.
    ///
    /// Returns the top-level object's entries.
    pub fn load(&self, prefix: &SnapshotPrefix) -> SnapshotResult<KvsMap> {
        let document_path = prefix.document_path();
        let checksum_path = prefix.checksum_path();

        let bytes = match fs::read(&document_path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(event = %Event::SnapshotMissing, path = %document_path.display(), "document not found");
                return Err(SnapshotError::missing(&document_path));
            }
            Err(e) => return Err(SnapshotError::io_error_at_path(&document_path, e)),
        };

        match fs::read(&checksum_path) {
            Ok(record) => {
                let stored = checksum::decode_record(&record)
                    .ok_or_else(|| SnapshotError::malformed_checksum(&checksum_path, record.len()))?;
                if !checksum::verify(&bytes, stored) {
                    let computed = checksum::compute(&bytes);
                    warn!(
                        event = %Event::SnapshotIntegrityMismatch,
                        path = %document_path.display(),
                        stored,
                        computed,
                        "document does not match its checksum"
                    );
                    return Err(SnapshotError::integrity_mismatch(&document_path, stored, computed));
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    event = %Event::SnapshotUnverified,
                    path = %document_path.display(),
                    "checksum file absent, loading unverified document"
                );
            }
            Err(e) => return Err(SnapshotError::io_error_at_path(&checksum_path, e)),
        }

        let value = self.codec.parse(&bytes).map_err(|e| {
            SnapshotError::format_error(format!("Failed to parse {}", document_path.display()))
                .with_details(e.to_string())
        })?;

        let kind = value.kind();
        let map = value.into_object().map_err(|_| {
            SnapshotError::format_error(format!(
                "Top level of {} is {}, expected Object",
                document_path.display(),
                kind
            ))
        })?;

        info!(
            event = %Event::SnapshotLoaded,
            path = %document_path.display(),
            keys = map.len(),
            "document loaded"
        );
        Ok(map)
    }

    /// Serializes `document` as a top-level object and writes it with its
    /// checksum at `prefix`. Parent directories are created as needed.
    pub fn save(&self, prefix: &SnapshotPrefix, document: &KvsMap) -> SnapshotResult<()> {
        let bytes = self.encode(prefix, document)?;
        self.write(prefix, &bytes)
    }

    /// Saves `document` as generation 0 of `generations`, rotating first.
    ///
    /// The document is serialized before anything on disk moves, so a value
    /// that cannot be written leaves every existing generation in place.
    pub fn save_generation(
        &self,
        generations: &[SnapshotPrefix],
        document: &KvsMap,
    ) -> SnapshotResult<()> {
        let Some(current) = generations.first() else {
            return Err(SnapshotError::format_error("No generation to save into"));
        };
        let bytes = self.encode(current, document)?;
        self.rotate(generations)?;
        self.write(current, &bytes)
    }

    fn encode(&self, prefix: &SnapshotPrefix, document: &KvsMap) -> SnapshotResult<Vec<u8>> {
        self.codec.serialize(document).map_err(|e| {
            SnapshotError::format_error(format!("Failed to serialize {}", prefix))
                .with_details(e.to_string())
        })
    }

    fn write(&self, prefix: &SnapshotPrefix, bytes: &[u8]) -> SnapshotResult<()> {
        let document_path = prefix.document_path();
        let checksum_path = prefix.checksum_path();

        if let Some(parent) = document_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| SnapshotError::io_error_at_path(parent, e))?;
            }
        }

        write_synced(&document_path, bytes)?;
        maybe_crash(CrashPoint::AfterDocumentWrite);

        let record = checksum::encode(checksum::compute(bytes));
        write_synced(&checksum_path, &record)?;
        maybe_crash(CrashPoint::AfterChecksumWrite);

        info!(
            event = %Event::SnapshotSaved,
            path = %document_path.display(),
            bytes = bytes.len(),
            "document saved"
        );
        Ok(())
    }

    /// Shifts every generation one slot older.
    ///
    /// `generations[i]` is the prefix of generation `i`. For `i` from the
    /// last index down to 1, generation `i - 1` is renamed onto generation
    /// `i`, so the oldest is overwritten and slot 0 is left free. Gaps are
    /// skipped. A generation moved without a checksum never inherits the
    /// stale checksum of the slot it lands on.
    pub fn rotate(&self, generations: &[SnapshotPrefix]) -> SnapshotResult<()> {
        maybe_crash(CrashPoint::BeforeRotate);

        for idx in (1..generations.len()).rev() {
            let older = &generations[idx];
            let newer = &generations[idx - 1];

            let from = newer.document_path();
            let to = older.document_path();
            match fs::rename(&from, &to) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(SnapshotError::io_error_at_path(&from, e)),
            }

            let from = newer.checksum_path();
            let to = older.checksum_path();
            match fs::rename(&from, &to) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => remove_if_exists(&to)?,
                Err(e) => return Err(SnapshotError::io_error_at_path(&from, e)),
            }

            debug!(
                event = %Event::SnapshotRotated,
                from = %newer,
                to = %older,
                "generation rotated"
            );
        }

        maybe_crash(CrashPoint::AfterRotate);
        Ok(())
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new(Box::new(JsonCodec))
    }
}

/// Writes `bytes` to `path`, replacing any previous content, and fsyncs.
fn write_synced(path: &Path, bytes: &[u8]) -> SnapshotResult<()> {
    let mut file = File::create(path).map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    file.write_all(bytes)
        .map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    file.sync_all()
        .map_err(|e| SnapshotError::io_error_at_path(path, e))?;
    Ok(())
}

fn remove_if_exists(path: &Path) -> SnapshotResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SnapshotError::io_error_at_path(path, e)),
    }
}
