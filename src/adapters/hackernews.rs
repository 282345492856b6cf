//! Hacker News adapter (Firebase API).

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::keyword::extract_keywords;
use crate::models::{Item, RawItem, Source};

use super::SourceAdapter;

const API_BASE: &str = "https://hacker-news.firebaseio.com/v0";

/// Points at which a story maps to a score of 100.
const MAX_POINTS: f64 = 500.0;

pub struct HackerNewsAdapter {
    client: Client,
}

impl HackerNewsAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_item(&self, id: u64) -> Result<HnStory> {
        let url = format!("{API_BASE}/item/{id}.json");
        let story = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<HnStory>()
            .await
            .with_context(|| format!("failed to decode HN item {id}"))?;
        Ok(story)
    }
}

#[derive(Debug, Deserialize)]
struct HnStory {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: Option<f64>,
    #[serde(default)]
    descendants: Option<i64>,
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

#[async_trait]
impl SourceAdapter for HackerNewsAdapter {
    fn source(&self) -> Source {
        Source::HackerNews
    }

    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>> {
        let ids: Vec<u64> = self
            .client
            .get(format!("{API_BASE}/topstories.json"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("failed to decode HN top story ids")?;

        let fetches = ids
            .into_iter()
            .take(limit as usize)
            .map(|id| self.fetch_item(id));

        let mut items = Vec::new();
        for result in join_all(fetches).await {
            let story = match result {
                Ok(story) => story,
                Err(err) => {
                    debug!(error = %err, "skipping HN item");
                    continue;
                }
            };
            match map_story(story) {
                Ok(item) => items.push(item),
                Err(err) => debug!(error = %err, "skipping unmappable HN item"),
            }
        }
        Ok(items)
    }
}

fn map_story(story: HnStory) -> Result<Item> {
    let discussion_url = format!("https://news.ycombinator.com/item?id={}", story.id);
    let tags = extract_keywords(&story.title);
    Item::from_raw(RawItem {
        id: format!("hn:{}", story.id),
        title: story.title,
        url: story.url,
        source: Some(Source::HackerNews),
        score: story.score.map(|points| points / MAX_POINTS * 100.0),
        comments: story.descendants,
        author: story.by,
        timestamp: story.time,
        tags,
        discussion_url: Some(discussion_url),
        summary: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_story() {
        let item = map_story(HnStory {
            id: 12345,
            title: "Rust 2.0 announced".to_string(),
            url: Some("https://example.com".to_string()),
            score: Some(250.0),
            descendants: Some(40),
            by: Some("pg".to_string()),
            time: Some(1_700_000_000),
        })
        .unwrap();

        assert_eq!(item.id(), "hn:12345");
        assert_eq!(item.score(), 50);
        assert_eq!(item.comments(), 40);
        assert_eq!(item.discussion_url(), "https://news.ycombinator.com/item?id=12345");
        assert!(item.tags().contains(&"rust".to_string()));
    }

    #[test]
    fn test_score_caps_at_100() {
        let item = map_story(HnStory {
            id: 1,
            title: "Big story".to_string(),
            url: None,
            score: Some(2000.0),
            descendants: None,
            by: None,
            time: Some(0),
        })
        .unwrap();
        assert_eq!(item.score(), 100);
        // Ask HN style posts keep an empty url
        assert_eq!(item.url(), "");
    }
}
