//! Store handle builder

use std::path::PathBuf;

use crate::addressing::InstanceId;
use crate::config::KvsConfig;
use crate::snapshot::{DocumentCodec, SnapshotStore};

use super::errors::OpenError;
use super::policy::OpenPolicy;
use super::Kvs;

/// Collects open parameters for a [`Kvs`].
///
/// ```ignore
/// let kvs = KvsBuilder::new("my_process", InstanceId(0))
///     .base_dir("/var/lib/my_process")
///     .defaults(OpenPolicy::Required)
///     .open()?;
/// ```
#[derive(Debug)]
pub struct KvsBuilder {
    pub(super) process_name: String,
    pub(super) instance_id: InstanceId,
    pub(super) config: KvsConfig,
    pub(super) store: SnapshotStore,
}

impl KvsBuilder {
    /// Start a builder with the default configuration
    pub fn new(process_name: impl Into<String>, instance_id: InstanceId) -> Self {
        Self {
            process_name: process_name.into(),
            instance_id,
            config: KvsConfig::default(),
            store: SnapshotStore::default(),
        }
    }

    /// Replace every setting with those of `config`
    pub fn config(mut self, config: KvsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.config.base_dir = base_dir.into();
        self
    }

    pub fn defaults(mut self, policy: OpenPolicy) -> Self {
        self.config.defaults = policy;
        self
    }

    pub fn kvs(mut self, policy: OpenPolicy) -> Self {
        self.config.kvs = policy;
        self
    }

    pub fn flush_on_exit(mut self, flush_on_exit: bool) -> Self {
        self.config.flush_on_exit = flush_on_exit;
        self
    }

    pub fn snapshot_max_count(mut self, count: usize) -> Self {
        self.config.snapshot_max_count = count;
        self
    }

    /// Use a document codec other than JSON
    pub fn codec(mut self, codec: Box<dyn DocumentCodec>) -> Self {
        self.store = SnapshotStore::new(codec);
        self
    }

    /// Open the store
    pub fn open(self) -> Result<Kvs, OpenError> {
        Kvs::open_with(self)
    }
}
