//! Reading-history tracking for the knowledge profile.
//!
//! Owns the `techpulse_user_knowledge` key. Records which items the user
//! engaged with and tallies per-topic counts for downstream blind-spot
//! analysis. Counters are purely additive and keyed by the same canonical
//! keyword identity as [`crate::keyword`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::keyword::normalize_keyword;
use crate::kv::KeyValue;
use crate::models::Item;
use crate::storage::VersionedStore;

const KNOWLEDGE_KEY: &str = "user_knowledge";
const KNOWLEDGE_VERSION: u32 = 1;

/// Persisted engagement history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeHistory {
    #[serde(default)]
    pub history: Vec<ReadRecord>,
    #[serde(default)]
    pub tag_counts: HashMap<String, u32>,
}

/// One read event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRecord {
    pub item_id: String,
    pub timestamp: i64,
    pub tags: Vec<String>,
}

/// A topic with its engagement count.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: u32,
}

/// Tracks what the user has read.
pub struct KnowledgeTracker {
    store: VersionedStore<KnowledgeHistory>,
}

impl KnowledgeTracker {
    pub fn new(kv: Arc<dyn KeyValue>) -> Result<Self> {
        let store = VersionedStore::new(kv, KNOWLEDGE_KEY, KNOWLEDGE_VERSION, BTreeMap::new())?;
        Ok(Self { store })
    }

    /// Record that an item was read. Idempotent per item id: a second mark
    /// for the same id is a no-op.
    pub fn mark_read(&self, item: &Item) -> Result<()> {
        let mut data = self.store.read();
        if data.history.iter().any(|r| r.item_id == item.id()) {
            return Ok(());
        }

        data.history.push(ReadRecord {
            item_id: item.id().to_string(),
            timestamp: Utc::now().timestamp(),
            tags: item.tags().to_vec(),
        });
        for tag in item.tags() {
            *data.tag_counts.entry(normalize_keyword(tag)).or_insert(0) += 1;
        }

        self.store.write(&data)
    }

    /// Full per-topic engagement counts, for blind-spot analysis.
    pub fn tag_profile(&self) -> HashMap<String, u32> {
        self.store.read().tag_counts
    }

    /// The user's top interests, sorted by count descending (ties broken by
    /// tag for determinism).
    pub fn interests(&self, top_n: usize) -> Vec<TagCount> {
        let mut counts: Vec<TagCount> = self
            .store
            .read()
            .tag_counts
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag.cmp(&b.tag)));
        counts.truncate(top_n);
        counts
    }
}
