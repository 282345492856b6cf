//! Reddit adapter.
//!
//! Pulls hot posts from a fixed set of tech subreddits, fetched
//! concurrently. A failing subreddit is logged and skipped so the others
//! still contribute.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::keyword::extract_keywords;
use crate::models::{Item, RawItem, Source};

use super::SourceAdapter;

const SUBREDDITS: &[&str] = &[
    "programming",
    "technology",
    "machinelearning",
    "javascript",
    "webdev",
];

/// Upvotes that map to a score of 100.
const MAX_UPVOTES: f64 = 500.0;

pub struct RedditAdapter {
    client: Client,
}

impl RedditAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_subreddit(&self, subreddit: &str, limit: u32) -> Result<Vec<Item>> {
        let url = format!("https://www.reddit.com/r/{subreddit}/hot.json?limit={limit}");
        let listing: Listing = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("failed to decode r/{subreddit} listing"))?;

        Ok(listing
            .data
            .children
            .into_iter()
            .filter(|child| !child.data.stickied)
            .filter_map(|child| map_post(child.data).ok())
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    num_comments: i64,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    created_utc: f64,
    #[serde(default)]
    subreddit: String,
    #[serde(default)]
    permalink: String,
    #[serde(default)]
    stickied: bool,
}

#[async_trait]
impl SourceAdapter for RedditAdapter {
    fn source(&self) -> Source {
        Source::Reddit
    }

    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>> {
        let per_subreddit = limit.div_ceil(SUBREDDITS.len() as u32).max(1);
        let fetches = SUBREDDITS
            .iter()
            .map(|sub| async move { (*sub, self.fetch_subreddit(sub, per_subreddit).await) });

        let mut items = Vec::new();
        for (subreddit, result) in join_all(fetches).await {
            match result {
                Ok(posts) => items.extend(posts),
                Err(err) => warn!(subreddit, error = %err, "failed to fetch subreddit"),
            }
        }
        Ok(items)
    }
}

fn map_post(post: Post) -> Result<Item> {
    let tags = extract_keywords(&format!("{} {}", post.title, post.subreddit));
    Item::from_raw(RawItem {
        id: format!("reddit:{}", post.id),
        title: post.title,
        url: post.url,
        source: Some(Source::Reddit),
        score: Some(post.score / MAX_UPVOTES * 100.0),
        comments: Some(post.num_comments),
        author: post.author,
        timestamp: Some(post.created_utc as i64),
        tags,
        discussion_url: Some(format!("https://reddit.com{}", post.permalink)),
        summary: None,
    })
}
