//! Snapshot subsystem for persistkv
//!
//! A snapshot is a pair of files sharing one prefix:
//! - `<prefix>.json` (the serialized document, top level always an object)
//! - `<prefix>.hash` (4-byte big-endian rolling checksum of the document bytes)
//!
//! # Design Principles
//!
//! - Verify before parse
//! - A checksum disagreement is never ignored
//! - An absent checksum file is tolerated and logged
//! - Deterministic serialization, so equal mappings produce equal checksums
//! - Whatever `save` accepts, `load` returns unchanged; trees too deep to parse are refused up front
//!
//! # Important
//!
//! Document and checksum are written as two separate files. Nothing here
//! makes the pair atomic. A torn save is detected on the next load, not
//! repaired.

pub mod checksum;
mod codec;
mod errors;
mod store;

pub use codec::{CodecError, DocumentCodec, JsonCodec, MAX_NESTING_DEPTH};
pub use errors::{SnapshotError, SnapshotErrorCode, SnapshotResult};
pub use store::SnapshotStore;
