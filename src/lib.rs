//! persistkv - A checksummed, per-instance persistent key-value store
//!
//! Each instance lives in two documents under `<base_dir>/<process_name>/`:
//! a read-only defaults document and a rotating series of instance
//! snapshots. Every document is paired with a 4-byte rolling checksum that
//! is verified before the document is parsed.

pub mod addressing;
pub mod config;
pub mod crash_point;
pub mod kvs;
pub mod observability;
pub mod snapshot;
pub mod value;

pub use addressing::{InstanceId, SnapshotId};
pub use config::{ConfigError, KvsConfig};
pub use kvs::{Kvs, KvsBuilder, LookupError, OpenError, OpenPolicy, RestoreError};
pub use snapshot::{SnapshotError, SnapshotErrorCode};
pub use value::{KvsMap, Value, ValueError, ValueKind};
