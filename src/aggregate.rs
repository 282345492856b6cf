//! Multi-source aggregation: concurrent fetch, dedup, ranking, cache.
//!
//! The [`Aggregator`] is the single entry point for building the merged
//! feed. It owns the adapter registry, a handle to the settings store, and
//! the in-memory feed cache. There is no global state, so test runs stay
//! isolated.
//!
//! Failure semantics: adapter failures are per-adapter and non-fatal. An
//! empty adapter set and an all-adapters-failed pass both degrade to an
//! empty feed, never an error.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tracing::{debug, warn};

use crate::adapters::AdapterRegistry;
use crate::models::Item;
use crate::settings::SettingsStore;

/// Options for one aggregation pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Per-source story limit; falls back to the settings value.
    pub limit: Option<u32>,
    /// Bypass the cache even when it is still fresh.
    pub force_refresh: bool,
}

/// One cached aggregation result. Replaced wholesale on every successful
/// pass, never partially updated.
struct FeedCache {
    items: Vec<Item>,
    captured_at: Instant,
}

/// Merges, deduplicates, ranks, and caches items from all enabled sources.
pub struct Aggregator {
    registry: AdapterRegistry,
    settings: SettingsStore,
    cache: Mutex<Option<FeedCache>>,
    ttl: Duration,
}

impl Aggregator {
    pub fn new(registry: AdapterRegistry, settings: SettingsStore, ttl: Duration) -> Self {
        Self {
            registry,
            settings,
            cache: Mutex::new(None),
            ttl,
        }
    }

    /// Fetch stories from all enabled sources, merge, deduplicate, and sort.
    ///
    /// Returns the cached feed when it is non-empty and younger than the
    /// cache TTL (unless `force_refresh` is set). Callers receive a copy;
    /// mutating it never affects the cache.
    pub async fn fetch_all(&self, options: FetchOptions) -> Vec<Item> {
        if !options.force_refresh {
            let cache = self.cache.lock().unwrap();
            if let Some(cached) = cache.as_ref() {
                if !cached.items.is_empty() && cached.captured_at.elapsed() < self.ttl {
                    debug!(items = cached.items.len(), "serving feed from cache");
                    return cached.items.clone();
                }
            }
        }

        let settings = self.settings.get();
        let limit = options.limit.unwrap_or(settings.stories_per_source);

        let adapters = self.registry.enabled(&settings.enabled_sources);
        if adapters.is_empty() {
            warn!("no enabled sources, returning empty feed");
            return Vec::new();
        }

        // True fan-out: every adapter future is issued before any result is
        // awaited, and the merge only starts once all of them have settled.
        let fetches = adapters
            .iter()
            .map(|adapter| async move { (adapter.source(), adapter.fetch_stories(limit).await) });

        let mut merged = Vec::new();
        for (source, result) in join_all(fetches).await {
            match result {
                Ok(items) => {
                    debug!(%source, count = items.len(), "adapter returned items");
                    merged.extend(items);
                }
                Err(err) => warn!(%source, error = %err, "adapter failed"),
            }
        }

        let feed = dedup_and_sort(merged);

        let mut cache = self.cache.lock().unwrap();
        *cache = Some(FeedCache {
            items: feed.clone(),
            captured_at: Instant::now(),
        });
        feed
    }
}

/// Remove duplicates, keeping the higher-scored entry, then rank.
///
/// Items group by `url` when non-empty, otherwise by `id`, so items without
/// a URL (e.g. Ask HN posts) never collapse into each other even with
/// identical titles. Within a group the strictly higher score wins; ties
/// keep whichever was seen first. The result sorts by score descending,
/// tie-broken by timestamp descending.
fn dedup_and_sort(items: Vec<Item>) -> Vec<Item> {
    let mut kept: Vec<Item> = Vec::with_capacity(items.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in items {
        let key = if item.url().is_empty() {
            format!("id\0{}", item.id())
        } else {
            format!("url\0{}", item.url())
        };
        match index.get(&key) {
            Some(&slot) => {
                if item.score() > kept[slot].score() {
                    kept[slot] = item;
                }
            }
            None => {
                index.insert(key, kept.len());
                kept.push(item);
            }
        }
    }

    // Stable sort: full ties keep first-seen order
    kept.sort_by(|a, b| {
        b.score()
            .cmp(&a.score())
            .then_with(|| b.timestamp().cmp(&a.timestamp()))
    });
    kept
}
