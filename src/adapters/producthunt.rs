//! Product Hunt adapter.
//!
//! Reads the public feed through the rss2json bridge, which avoids the
//! authenticated GraphQL API. The feed carries no vote counts, so items get
//! a fixed high-visibility score.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::keyword::extract_keywords;
use crate::models::{Item, RawItem, Source};

use super::SourceAdapter;

const FEED_URL: &str = "https://www.producthunt.com/feed";
const BRIDGE_URL: &str = "https://api.rss2json.com/v1/api.json";

/// The feed has no votes; launches get a fixed visibility score.
const DEFAULT_SCORE: f64 = 80.0;

pub struct ProductHuntAdapter {
    client: Client,
}

impl ProductHuntAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    status: String,
    #[serde(default)]
    items: Vec<FeedItem>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    title: String,
    #[serde(default)]
    link: Option<String>,
    #[serde(default)]
    guid: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
    #[serde(default)]
    categories: Vec<String>,
}

#[async_trait]
impl SourceAdapter for ProductHuntAdapter {
    fn source(&self) -> Source {
        Source::ProductHunt
    }

    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>> {
        let body: BridgeResponse = self
            .client
            .get(BRIDGE_URL)
            .query(&[("rss_url", FEED_URL)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("failed to decode rss2json response")?;

        if body.status != "ok" {
            bail!("rss2json returned status '{}'", body.status);
        }

        // The bridge returns a limited set; take what we get up to the limit.
        Ok(body
            .items
            .into_iter()
            .take(limit as usize)
            .filter_map(|entry| map_entry(entry).ok())
            .collect())
    }
}

fn map_entry(entry: FeedItem) -> Result<Item> {
    // The guid is usually the launch permalink; its last segment makes a
    // stable id. Fall back to a slug of the title.
    let guid = entry.guid.as_deref().unwrap_or("");
    let id_part = guid
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_else(|| entry.title.split_whitespace().collect::<Vec<_>>().join("-"));

    let tags = extract_keywords(&format!("{} {}", entry.title, entry.categories.join(" ")));
    let timestamp = entry.pub_date.as_deref().and_then(parse_pub_date);

    Item::from_raw(RawItem {
        id: format!("ph:{id_part}"),
        title: entry.title,
        url: entry.link.clone(),
        source: Some(Source::ProductHunt),
        score: Some(DEFAULT_SCORE),
        comments: None,
        author: entry.author.or_else(|| Some("Product Hunt".to_string())),
        timestamp,
        tags,
        discussion_url: entry.link,
        summary: None,
    })
}

/// rss2json emits `YYYY-MM-DD HH:MM:SS`; some feeds pass through RFC 2822.
fn parse_pub_date(raw: &str) -> Option<i64> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc().timestamp());
    }
    DateTime::parse_from_rfc2822(raw).map(|dt| dt.timestamp()).ok()
}
