//! Persisted user settings.
//!
//! Owns the `techpulse_settings` key. Other components read these values
//! (the aggregator checks enabled sources, the trend tracker reads threshold
//! defaults) but this store only persists and retrieves, it does not
//! interpret.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::kv::KeyValue;
use crate::models::Source;
use crate::storage::VersionedStore;

const SETTINGS_KEY: &str = "settings";
const SETTINGS_VERSION: u32 = 1;

/// User configuration consumed by the aggregator and trend tracker.
///
/// Unknown or missing fields fall back to defaults on read, so settings
/// written by older builds stay loadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled_sources: Vec<Source>,
    pub stories_per_source: u32,
    pub trending_window_days: u32,
    pub trending_spike_threshold: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled_sources: vec![Source::HackerNews],
            stories_per_source: 30,
            trending_window_days: 7,
            trending_spike_threshold: 2.0,
        }
    }
}

/// Store wrapper around [`Settings`].
pub struct SettingsStore {
    store: VersionedStore<Settings>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValue>) -> Result<Self> {
        let store = VersionedStore::new(kv, SETTINGS_KEY, SETTINGS_VERSION, BTreeMap::new())?;
        Ok(Self { store })
    }

    /// Current settings, merged with defaults for anything unset.
    pub fn get(&self) -> Settings {
        self.store.read()
    }

    /// Read-modify-write a settings change.
    pub fn update(&self, apply: impl FnOnce(&mut Settings)) -> Result<Settings> {
        let mut settings = self.store.read();
        apply(&mut settings);
        self.store.write(&settings)?;
        Ok(settings)
    }

    /// Drop all stored settings, reverting to defaults.
    pub fn reset(&self) -> Result<()> {
        self.store.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;

    #[test]
    fn test_defaults_when_unset() {
        let store = SettingsStore::new(Arc::new(MemoryKv::new())).unwrap();
        let settings = store.get();
        assert_eq!(settings.enabled_sources, vec![Source::HackerNews]);
        assert_eq!(settings.stories_per_source, 30);
        assert_eq!(settings.trending_window_days, 7);
        assert_eq!(settings.trending_spike_threshold, 2.0);
    }

    #[test]
    fn test_update_persists() {
        let kv = Arc::new(MemoryKv::new());
        let store = SettingsStore::new(kv.clone()).unwrap();
        store
            .update(|s| {
                s.enabled_sources = vec![Source::GitHub, Source::Reddit];
                s.stories_per_source = 10;
            })
            .unwrap();

        // A fresh handle over the same kv sees the change
        let store = SettingsStore::new(kv).unwrap();
        let settings = store.get();
        assert_eq!(settings.enabled_sources, vec![Source::GitHub, Source::Reddit]);
        assert_eq!(settings.stories_per_source, 10);
        // Untouched fields keep their defaults
        assert_eq!(settings.trending_window_days, 7);
    }

    #[test]
    fn test_reset_reverts_to_defaults() {
        let store = SettingsStore::new(Arc::new(MemoryKv::new())).unwrap();
        store.update(|s| s.stories_per_source = 5).unwrap();
        store.reset().unwrap();
        assert_eq!(store.get(), Settings::default());
    }
}
