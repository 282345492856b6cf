//! Versioned persistent store with forward-only schema migration.
//!
//! Every persisted record in TechPulse goes through a [`VersionedStore`],
//! which wraps one key in the shared [`KeyValue`] namespace and stamps a
//! `_version` field on every write. On read, older records are walked
//! forward through the migration chain one version at a time.
//!
//! Failure policy: corrupted data is treated as absence (warn + default),
//! and a failing migration step pins the record at the last version it
//! actually reached. It is never silently advanced past a failure or rolled
//! back.

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use crate::kv::KeyValue;

/// Prefix for every TechPulse key in the shared flat namespace.
const STORAGE_PREFIX: &str = "techpulse_";

/// A pure record transformation from version N-1 to version N.
///
/// Migrations are cumulative and append-only: the full chain is preserved so
/// a record written long ago can still be walked forward step by step.
pub type Migration = fn(Value) -> Result<Value>;

/// A versioned store bound to one key.
///
/// `T` is the record shape at the *current* version. Older stored shapes are
/// reached via the migration chain before deserialization.
pub struct VersionedStore<T> {
    kv: Arc<dyn KeyValue>,
    key: String,
    version: u32,
    migrations: BTreeMap<u32, Migration>,
    _record: PhantomData<fn() -> T>,
}

impl<T> VersionedStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// Create a store over `key` (prefix applied internally) at the declared
    /// schema `version`. `migrations[n]` transforms a record from version
    /// `n - 1` to version `n`.
    pub fn new(
        kv: Arc<dyn KeyValue>,
        key: &str,
        version: u32,
        migrations: BTreeMap<u32, Migration>,
    ) -> Result<Self> {
        if key.is_empty() {
            bail!("store key must not be empty");
        }
        if version == 0 {
            bail!("store version must be a positive integer");
        }
        Ok(Self {
            kv,
            key: format!("{STORAGE_PREFIX}{key}"),
            version,
            migrations,
            _record: PhantomData,
        })
    }

    /// Read the record, migrating it forward to the current version.
    ///
    /// Absence, corruption, and failed deserialization all degrade to
    /// `T::default()` with a warning; this method never surfaces storage
    /// problems to the caller.
    pub fn read(&self) -> T {
        let raw = match self.kv.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(err) => {
                warn!(key = %self.key, error = %err, "storage read failed, using default");
                return T::default();
            }
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                warn!(key = %self.key, "stored value is not an object, resetting to default");
                return T::default();
            }
            Err(err) => {
                warn!(key = %self.key, error = %err, "corrupted data, resetting to default");
                return T::default();
            }
        };

        let migrated = self.apply_migrations(value);
        match serde_json::from_value(migrated) {
            Ok(record) => record,
            Err(err) => {
                warn!(key = %self.key, error = %err, "stored record does not match schema, using default");
                T::default()
            }
        }
    }

    /// Persist `record`, stamped with the current declared version.
    ///
    /// Always writes the *current* version regardless of what was read.
    pub fn write(&self, record: &T) -> Result<()> {
        let mut value = serde_json::to_value(record)?;
        value["_version"] = Value::from(self.version);
        self.kv.set(&self.key, &value.to_string())
    }

    /// Remove the persisted record entirely.
    pub fn clear(&self) -> Result<()> {
        self.kv.remove(&self.key)
    }

    /// Walk the migration chain from the record's stored version up to the
    /// declared version. On a failing step, stop advancing and pin `_version`
    /// at the last version actually reached.
    fn apply_migrations(&self, mut value: Value) -> Value {
        let mut current = value
            .get("_version")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;

        while current < self.version {
            let next = current + 1;
            if let Some(migrate) = self.migrations.get(&next) {
                match migrate(value.clone()) {
                    Ok(migrated) if migrated.is_object() => value = migrated,
                    Ok(_) => {
                        warn!(
                            key = %self.key,
                            version = next,
                            "migration produced a non-object record, keeping last reached version"
                        );
                        value["_version"] = Value::from(current);
                        return value;
                    }
                    Err(err) => {
                        warn!(
                            key = %self.key,
                            version = next,
                            error = %err,
                            "migration failed, keeping record at last reached version"
                        );
                        value["_version"] = Value::from(current);
                        return value;
                    }
                }
            }
            value["_version"] = Value::from(next);
            current = next;
        }

        value
    }
}
