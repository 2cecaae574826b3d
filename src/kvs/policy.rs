//! Open policies

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a document must exist when a store is opened.
///
/// Governs absence only. A present but corrupt document fails the open
/// under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenPolicy {
    /// Absence fails the open
    Required,
    /// Absence yields an empty mapping
    #[default]
    Optional,
}

impl OpenPolicy {
    /// Returns the policy name
    pub fn as_str(&self) -> &'static str {
        match self {
            OpenPolicy::Required => "required",
            OpenPolicy::Optional => "optional",
        }
    }

    /// Returns true if absence fails the open
    pub fn is_required(&self) -> bool {
        matches!(self, OpenPolicy::Required)
    }
}

impl fmt::Display for OpenPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
