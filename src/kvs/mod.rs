//! Store handle
//!
//! A `Kvs` owns two mappings loaded at open time:
//! - the instance mapping (live, mutable, persisted by `flush`)
//! - the defaults mapping (read-only fallback, never written)
//!
//! # Open
//!
//! 1. Validate configuration and process name
//! 2. Load `kvs_<id>_default` under the defaults policy
//! 3. Load `kvs_<id>_0` under the kvs policy
//!
//! Policy governs absence only. An integrity or format failure fails the
//! open under either policy.
//!
//! # Lookup
//!
//! Instance mapping first, then defaults. Lookup never copies a default
//! into the instance mapping.
//!
//! # Release
//!
//! Dropping a handle with `flush_on_exit` set persists the instance mapping.
//! A failure there is logged and swallowed.
//!
//! # Concurrency
//!
//! No internal locking. Two handles writing the same instance, in one process
//! or several, will corrupt each other; serializing access is the caller's job.

mod builder;
mod errors;
mod policy;

pub use builder::KvsBuilder;
pub use errors::{LookupError, OpenError, RestoreError};
pub use policy::OpenPolicy;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::addressing::{self, InstanceId, SnapshotId, SnapshotPrefix};
use crate::config::validate_process_name;
use crate::observability::Event;
use crate::snapshot::{SnapshotError, SnapshotResult, SnapshotStore};
use crate::value::{KvsMap, Value, ValueError};

/// Handle to one persistent key-value instance.
#[derive(Debug)]
pub struct Kvs {
    process_name: String,
    instance_id: InstanceId,
    base_dir: PathBuf,
    kvs: KvsMap,
    defaults: KvsMap,
    defaults_policy: OpenPolicy,
    kvs_policy: OpenPolicy,
    flush_on_exit: bool,
    snapshot_max_count: usize,
    store: SnapshotStore,
}

impl Kvs {
    /// Open an instance with the default JSON codec.
    ///
    /// Rotation keeps the default number of generations and the handle
    /// flushes on drop. Use [`KvsBuilder`] for anything else.
    pub fn open(
        base_dir: impl Into<PathBuf>,
        process_name: &str,
        instance_id: InstanceId,
        defaults_policy: OpenPolicy,
        kvs_policy: OpenPolicy,
    ) -> Result<Self, OpenError> {
        KvsBuilder::new(process_name, instance_id)
            .base_dir(base_dir)
            .defaults(defaults_policy)
            .kvs(kvs_policy)
            .open()
    }

    pub(crate) fn open_with(builder: KvsBuilder) -> Result<Self, OpenError> {
        let KvsBuilder {
            process_name,
            instance_id,
            config,
            store,
        } = builder;

        debug!(
            event = %Event::KvsOpenBegin,
            process = %process_name,
            instance = %instance_id,
            defaults = %config.defaults,
            kvs = %config.kvs,
            "opening kvs"
        );

        let opened = config
            .validate()
            .and_then(|()| validate_process_name(&process_name))
            .map_err(OpenError::from)
            .and_then(|()| {
                let defaults_prefix =
                    addressing::defaults_prefix(&config.base_dir, &process_name, instance_id);
                let defaults = load_with_policy(&store, &defaults_prefix, config.defaults)?
                    .ok_or_else(|| OpenError::MissingDefaults {
                        path: defaults_prefix.document_path(),
                    })?;

                let kvs_prefix = addressing::instance_prefix(
                    &config.base_dir,
                    &process_name,
                    instance_id,
                    SnapshotId::CURRENT,
                );
                let kvs = load_with_policy(&store, &kvs_prefix, config.kvs)?.ok_or_else(|| {
                    OpenError::MissingKvs {
                        path: kvs_prefix.document_path(),
                    }
                })?;

                Ok((defaults, kvs))
            });

        let (defaults, kvs) = match opened {
            Ok(mappings) => mappings,
            Err(e) if e.is_corruption() => {
                error!(
                    event = %Event::KvsOpenFailed,
                    process = %process_name,
                    instance = %instance_id,
                    error = %e,
                    "kvs open failed on a damaged document"
                );
                return Err(e);
            }
            Err(e) => {
                warn!(
                    event = %Event::KvsOpenFailed,
                    process = %process_name,
                    instance = %instance_id,
                    error = %e,
                    "kvs open failed"
                );
                return Err(e);
            }
        };

        info!(
            event = %Event::KvsOpenComplete,
            process = %process_name,
            instance = %instance_id,
            keys = kvs.len(),
            default_keys = defaults.len(),
            "kvs opened"
        );

        Ok(Self {
            process_name,
            instance_id,
            base_dir: config.base_dir,
            kvs,
            defaults,
            defaults_policy: config.defaults,
            kvs_policy: config.kvs,
            flush_on_exit: config.flush_on_exit,
            snapshot_max_count: config.snapshot_max_count,
            store,
        })
    }

    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    pub fn instance_id(&self) -> InstanceId {
        self.instance_id
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Policy the defaults document was opened with
    pub fn defaults_policy(&self) -> OpenPolicy {
        self.defaults_policy
    }

    /// Policy the instance document was opened with
    pub fn kvs_policy(&self) -> OpenPolicy {
        self.kvs_policy
    }

    /// Whether dropping this handle persists the instance mapping
    pub fn flush_on_exit(&self) -> bool {
        self.flush_on_exit
    }

    pub fn set_flush_on_exit(&mut self, flush_on_exit: bool) {
        self.flush_on_exit = flush_on_exit;
    }

    fn lookup(&self, key: &str) -> Result<&Value, LookupError> {
        self.kvs
            .get(key)
            .or_else(|| self.defaults.get(key))
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }

    /// Returns a copy of the value for `key`, falling back to defaults.
    pub fn get_value(&self, key: &str) -> Result<Value, LookupError> {
        self.lookup(key).cloned()
    }

    /// Returns the value for `key` converted to `T`.
    ///
    /// Fails with `TypeMismatch` if the stored kind is not `T`'s kind.
    pub fn get_value_as<T>(&self, key: &str) -> Result<T, LookupError>
    where
        T: for<'a> TryFrom<&'a Value, Error = ValueError>,
    {
        let value = self.lookup(key)?;
        T::try_from(value).map_err(|source| LookupError::TypeMismatch {
            key: key.to_string(),
            source,
        })
    }

    /// Reads the value for `key` back as any deserializable type.
    ///
    /// Falls back to defaults like [`Kvs::get_value`]. A value whose shape
    /// does not fit `T` is a `TypeMismatch`.
    pub fn get_deserialized<T: DeserializeOwned>(&self, key: &str) -> Result<T, LookupError> {
        self.lookup(key)?
            .deserialize_into()
            .map_err(|source| LookupError::TypeMismatch {
                key: key.to_string(),
                source,
            })
    }

    /// Returns the default value for `key`, ignoring the instance mapping.
    pub fn get_default_value(&self, key: &str) -> Result<Value, LookupError> {
        self.defaults
            .get(key)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }

    /// Returns true if `key` currently resolves to its default.
    pub fn is_value_default(&self, key: &str) -> Result<bool, LookupError> {
        if self.kvs.contains_key(key) {
            Ok(false)
        } else if self.defaults.contains_key(key) {
            Ok(true)
        } else {
            Err(LookupError::NotFound(key.to_string()))
        }
    }

    /// Returns true if `key` is in the instance mapping. Defaults are not consulted.
    pub fn key_exists(&self, key: &str) -> bool {
        self.kvs.contains_key(key)
    }

    /// Keys of the instance mapping, in order.
    pub fn get_all_keys(&self) -> Vec<String> {
        self.kvs.keys().cloned().collect()
    }

    /// Inserts or overwrites `key` in the instance mapping.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.kvs.insert(key.into(), value.into());
    }

    /// Stores any serializable type under `key`.
    ///
    /// The instance mapping is untouched if `value` cannot be converted.
    pub fn set_serialized<T: Serialize + ?Sized>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), ValueError> {
        let value = Value::from_serializable(value)?;
        self.kvs.insert(key.into(), value);
        Ok(())
    }

    /// Removes `key` from the instance mapping.
    pub fn remove_key(&mut self, key: &str) -> Result<(), LookupError> {
        self.kvs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| LookupError::NotFound(key.to_string()))
    }

    /// Clears the instance mapping. Defaults are untouched.
    pub fn reset(&mut self) {
        self.kvs.clear();
    }

    fn prefix(&self, id: SnapshotId) -> SnapshotPrefix {
        addressing::instance_prefix(&self.base_dir, &self.process_name, self.instance_id, id)
    }

    /// Persists the instance mapping as generation 0.
    ///
    /// Existing generations are rotated first unless the maximum is 0.
    pub fn flush(&self) -> SnapshotResult<()> {
        if self.snapshot_max_count == 0 {
            self.store.save(&self.prefix(SnapshotId::CURRENT), &self.kvs)?;
        } else {
            let generations: Vec<_> = (0..=self.snapshot_max_count)
                .map(|id| self.prefix(SnapshotId(id)))
                .collect();
            self.store.save_generation(&generations, &self.kvs)?;
        }

        info!(
            event = %Event::FlushComplete,
            process = %self.process_name,
            instance = %self.instance_id,
            keys = self.kvs.len(),
            "kvs flushed"
        );
        Ok(())
    }

    /// Maximum number of older generations kept
    pub fn snapshot_max_count(&self) -> usize {
        self.snapshot_max_count
    }

    /// Number of older generations on disk, counting up from 1 until the
    /// first gap.
    pub fn snapshot_count(&self) -> usize {
        (1..=self.snapshot_max_count)
            .take_while(|&id| self.prefix(SnapshotId(id)).document_path().exists())
            .count()
    }

    /// Replaces the instance mapping with older generation `id`.
    ///
    /// Nothing is written; the restored mapping reaches disk on the next flush.
    pub fn snapshot_restore(&mut self, id: SnapshotId) -> Result<(), RestoreError> {
        if id == SnapshotId::CURRENT || id.value() > self.snapshot_count() {
            return Err(RestoreError::InvalidSnapshotId(id));
        }

        self.kvs = self.store.load(&self.prefix(id))?;

        info!(
            event = %Event::SnapshotRestored,
            process = %self.process_name,
            instance = %self.instance_id,
            generation = %id,
            "snapshot restored"
        );
        Ok(())
    }

    /// Path of generation `id`'s document, if it exists.
    pub fn kvs_file_path(&self, id: SnapshotId) -> SnapshotResult<PathBuf> {
        existing(self.prefix(id).document_path())
    }

    /// Path of generation `id`'s checksum file, if it exists.
    pub fn hash_file_path(&self, id: SnapshotId) -> SnapshotResult<PathBuf> {
        existing(self.prefix(id).checksum_path())
    }
}

impl Drop for Kvs {
    fn drop(&mut self) {
        if self.flush_on_exit {
            if let Err(e) = self.flush() {
                error!(
                    event = %Event::FlushOnExitFailed,
                    process = %self.process_name,
                    instance = %self.instance_id,
                    error = %e,
                    "flush on release failed"
                );
            }
        }

        debug!(
            event = %Event::KvsReleased,
            process = %self.process_name,
            instance = %self.instance_id,
            "kvs released"
        );
    }
}

/// Loads `prefix`, mapping absence to `None` under the optional policy.
fn load_with_policy(
    store: &SnapshotStore,
    prefix: &SnapshotPrefix,
    policy: OpenPolicy,
) -> Result<Option<KvsMap>, SnapshotError> {
    match store.load(prefix) {
        Ok(map) => Ok(Some(map)),
        Err(e) if e.is_missing() && !policy.is_required() => Ok(Some(KvsMap::new())),
        Err(e) if e.is_missing() => Ok(None),
        Err(e) => Err(e),
    }
}

fn existing(path: PathBuf) -> SnapshotResult<PathBuf> {
    if path.exists() {
        Ok(path)
    } else {
        Err(SnapshotError::missing(&path))
    }
}
