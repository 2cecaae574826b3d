//! Snapshot Rotation Tests
//!
//! Each flush shifts older generations one slot back before writing
//! generation 0. At most `snapshot_max_count` older generations survive.
//! Restore loads an older generation into memory without touching disk.

use persistkv::{InstanceId, Kvs, KvsBuilder, RestoreError, SnapshotErrorCode, SnapshotId, Value};
use std::fs;
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

const PROCESS: &str = "rotation";
const INSTANCE: InstanceId = InstanceId(4);

fn open(temp_dir: &TempDir, max: usize) -> Kvs {
    KvsBuilder::new(PROCESS, INSTANCE)
        .base_dir(temp_dir.path())
        .snapshot_max_count(max)
        .flush_on_exit(false)
        .open()
        .unwrap()
}

/// Flushes `count` times, storing the flush number under "counter".
fn flush_counter(kvs: &mut Kvs, count: usize) {
    for i in 1..=count {
        kvs.set_value("counter", i as f64);
        kvs.flush().unwrap();
    }
}

// =============================================================================
// Rotation
// =============================================================================

#[test]
fn test_snapshot_count_grows_to_max() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);

    assert_eq!(kvs.snapshot_count(), 0);
    for expected in [0, 1, 2, 3, 3, 3] {
        kvs.set_value("x", 1.0);
        kvs.flush().unwrap();
        assert_eq!(kvs.snapshot_count(), expected);
    }
    assert_eq!(kvs.snapshot_max_count(), 3);
}

#[test]
fn test_generations_hold_previous_flushes() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 5);

    let reopened = open(&temp_dir, 3);
    assert_eq!(reopened.get_value("counter").unwrap(), Value::Number(5.0));

    for (generation, counter) in [(1, 4.0), (2, 3.0), (3, 2.0)] {
        let path = reopened.kvs_file_path(SnapshotId(generation)).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_object().unwrap()["counter"], Value::Number(counter));
    }
    assert!(reopened.kvs_file_path(SnapshotId(4)).is_err());
}

#[test]
fn test_each_generation_keeps_its_checksum() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 2);
    flush_counter(&mut kvs, 3);

    for generation in 0..=2 {
        assert!(kvs.hash_file_path(SnapshotId(generation)).is_ok());
    }
    for generation in 1..=2 {
        kvs.snapshot_restore(SnapshotId(generation)).unwrap();
    }
}

#[test]
fn test_zero_max_count_disables_rotation() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 0);
    flush_counter(&mut kvs, 3);

    assert_eq!(kvs.snapshot_count(), 0);
    assert!(kvs.kvs_file_path(SnapshotId::CURRENT).is_ok());
    assert!(kvs
        .kvs_file_path(SnapshotId(1))
        .unwrap_err()
        .is_missing());
}

// =============================================================================
// Restore
// =============================================================================

#[test]
fn test_restore_replaces_live_mapping() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 3);
    kvs.set_value("unsaved", true);

    kvs.snapshot_restore(SnapshotId(2)).unwrap();

    assert_eq!(kvs.get_value("counter").unwrap(), Value::Number(1.0));
    assert!(!kvs.key_exists("unsaved"));
}

#[test]
fn test_restore_does_not_write() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 2);
    let current = kvs.kvs_file_path(SnapshotId::CURRENT).unwrap();
    let before = fs::read(&current).unwrap();

    kvs.snapshot_restore(SnapshotId(1)).unwrap();

    assert_eq!(fs::read(&current).unwrap(), before);
    assert_eq!(kvs.snapshot_count(), 1);
}

#[test]
fn test_restore_rejects_current_generation() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 2);

    let err = kvs.snapshot_restore(SnapshotId::CURRENT).unwrap_err();
    assert!(matches!(err, RestoreError::InvalidSnapshotId(SnapshotId(0))));
}

#[test]
fn test_restore_rejects_id_beyond_count() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 2);

    assert_eq!(kvs.snapshot_count(), 1);
    let err = kvs.snapshot_restore(SnapshotId(2)).unwrap_err();
    assert!(matches!(err, RestoreError::InvalidSnapshotId(SnapshotId(2))));
}

#[test]
fn test_restore_verifies_generation() {
    let temp_dir = TempDir::new().unwrap();
    let mut kvs = open(&temp_dir, 3);
    flush_counter(&mut kvs, 2);

    let older = kvs.kvs_file_path(SnapshotId(1)).unwrap();
    fs::write(&older, r#"{"counter":99}"#).unwrap();

    match kvs.snapshot_restore(SnapshotId(1)) {
        Err(RestoreError::Snapshot(e)) => {
            assert_eq!(e.code(), SnapshotErrorCode::IntegrityMismatch)
        }
        other => panic!("Expected integrity failure, got {:?}", other),
    }
    assert_eq!(kvs.get_value("counter").unwrap(), Value::Number(2.0));
}
