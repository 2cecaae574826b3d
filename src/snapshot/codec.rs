//! Document codec seam
//!
//! The snapshot store does not care how a value tree is spelled on disk,
//! only that `parse` and `serialize` agree: whatever `serialize` accepts,
//! `parse` must give back unchanged. `JsonCodec` is the default and writes
//! plain, pretty-printed JSON.

use thiserror::Error;

use crate::value::{object_is_finite, object_nesting_depth, KvsMap, Value};

/// Deepest nesting of arrays and objects, top-level object included, that
/// `JsonCodec` writes. `serde_json` refuses to parse anything deeper.
pub const MAX_NESTING_DEPTH: usize = 127;

/// Codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialize error: {0}")]
    Serialize(String),

    #[error("Non-finite number cannot be serialized")]
    NonFiniteNumber,

    #[error("Nesting depth {depth} exceeds maximum {max}")]
    NestingTooDeep { depth: usize, max: usize },
}

/// Converts a document to and from bytes.
pub trait DocumentCodec: Send + Sync + std::fmt::Debug {
    /// Parse document bytes into a value tree
    fn parse(&self, bytes: &[u8]) -> Result<Value, CodecError>;

    /// Serialize the entries of a top-level object into document bytes
    fn serialize(&self, document: &KvsMap) -> Result<Vec<u8>, CodecError>;
}

/// JSON document codec
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl DocumentCodec for JsonCodec {
    fn parse(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        serde_json::from_slice(bytes).map_err(|e| CodecError::Parse(e.to_string()))
    }

    fn serialize(&self, document: &KvsMap) -> Result<Vec<u8>, CodecError> {
        // serde_json would silently write NaN and infinities as null.
        if !object_is_finite(document) {
            return Err(CodecError::NonFiniteNumber);
        }
        let depth = object_nesting_depth(document);
        if depth > MAX_NESTING_DEPTH {
            return Err(CodecError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        serde_json::to_vec_pretty(document).map_err(|e| CodecError::Serialize(e.to_string()))
    }
}
