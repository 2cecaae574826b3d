//! Store configuration
//!
//! Loaded from a JSON file. Every field is optional:
//!
//! ```json
//! {
//!     "base_dir": "/var/lib/myapp",
//!     "defaults": "required",
//!     "kvs": "optional",
//!     "flush_on_exit": true,
//!     "snapshot_max_count": 3
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kvs::OpenPolicy;

/// Upper bound on retained snapshot generations
pub const SNAPSHOT_MAX_COUNT_LIMIT: usize = 32;

/// Default number of retained snapshot generations
pub const DEFAULT_SNAPSHOT_MAX_COUNT: usize = 3;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(String),

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvsConfig {
    /// Directory holding one subdirectory per process (default ".")
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    /// Open policy for the defaults document
    #[serde(default)]
    pub defaults: OpenPolicy,

    /// Open policy for the instance document
    #[serde(default)]
    pub kvs: OpenPolicy,

    /// Persist the instance mapping when the handle is dropped
    #[serde(default = "default_flush_on_exit")]
    pub flush_on_exit: bool,

    /// Number of older generations kept on flush (0 disables rotation)
    #[serde(default = "default_snapshot_max_count")]
    pub snapshot_max_count: usize,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_flush_on_exit() -> bool {
    true
}

fn default_snapshot_max_count() -> usize {
    DEFAULT_SNAPSHOT_MAX_COUNT
}

impl Default for KvsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            defaults: OpenPolicy::default(),
            kvs: OpenPolicy::default(),
            flush_on_exit: default_flush_on_exit(),
            snapshot_max_count: default_snapshot_max_count(),
        }
    }
}

impl KvsConfig {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(format!("{}: {}", path.display(), e)))?;

        let config: KvsConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("base_dir must not be empty".into()));
        }

        if self.snapshot_max_count > SNAPSHOT_MAX_COUNT_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "snapshot_max_count must be <= {}, got {}",
                SNAPSHOT_MAX_COUNT_LIMIT, self.snapshot_max_count
            )));
        }

        Ok(())
    }
}

/// Checks that `name` is usable as a single directory component.
pub fn validate_process_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Invalid("process name must not be empty".into()));
    }
    if name == "." || name == ".." {
        return Err(ConfigError::Invalid(format!(
            "process name must not be '{}'",
            name
        )));
    }
    if name.contains('/') || name.contains('\\') || name.contains('\0') {
        return Err(ConfigError::Invalid(format!(
            "process name must not contain path separators: '{}'",
            name
        )));
    }
    Ok(())
}
