//! Value access errors

use thiserror::Error;

use super::ValueKind;

/// Result type for value access
pub type ValueResult<T> = Result<T, ValueError>;

/// Value access errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("Cannot convert to a value: {0}")]
    Serialize(String),

    #[error("Cannot read value as the requested type: {0}")]
    Deserialize(String),
}
