//! Source adapters.
//!
//! Each adapter wraps one external API and maps its responses into the
//! canonical [`Item`] shape, calling [`crate::keyword::extract_keywords`]
//! for the tags field. Adapters surface their own failures as `Err`; the
//! aggregator absorbs those at its merge boundary so one dead source never
//! blanks the feed.
//!
//! Adding a source: implement [`SourceAdapter`], add the variant to
//! [`Source`], and register the adapter in
//! [`AdapterRegistry::with_default_adapters`]. No other file changes.

pub mod arxiv;
pub mod github;
pub mod hackernews;
pub mod producthunt;
pub mod reddit;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{Item, Source};

/// A content source that produces normalized items.
///
/// `fetch_stories` is called on the tokio runtime and performs the source's
/// network I/O. It returns at most `limit` items; fewer (or zero) is normal
/// when the source is quiet.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Which [`Source`] this adapter serves. Used to match against the
    /// enabled-source list in settings.
    fn source(&self) -> Source;

    /// Fetch up to `limit` stories from the external API.
    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>>;
}

/// Explicit registration list of adapters.
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            adapters: Vec::new(),
        }
    }

    /// Create a registry with every built-in adapter, sharing one HTTP
    /// client.
    pub fn with_default_adapters(client: reqwest::Client) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(hackernews::HackerNewsAdapter::new(client.clone())));
        registry.register(Box::new(github::GitHubAdapter::new(client.clone())));
        registry.register(Box::new(reddit::RedditAdapter::new(client.clone())));
        registry.register(Box::new(producthunt::ProductHuntAdapter::new(
            client.clone(),
        )));
        registry.register(Box::new(arxiv::ArxivAdapter::new(client)));
        registry
    }

    /// Register an adapter.
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.push(adapter);
    }

    /// Adapters whose source is in `enabled`, in registration order.
    pub fn enabled(&self, enabled: &[Source]) -> Vec<&dyn SourceAdapter> {
        self.adapters
            .iter()
            .filter(|a| enabled.contains(&a.source()))
            .map(|a| a.as_ref())
            .collect()
    }

    /// All registered adapters.
    pub fn adapters(&self) -> &[Box<dyn SourceAdapter>] {
        &self.adapters
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}
