//! GitHub trending adapter.
//!
//! Uses the search API for repositories created in the last 7 days, sorted
//! by stars. Rate-limit responses (403/429) degrade to an empty result with
//! a warning instead of failing the whole pass.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::keyword::extract_keywords;
use crate::models::{Item, RawItem, Source};

use super::SourceAdapter;

const API_BASE: &str = "https://api.github.com/search/repositories";

/// Stars in a week that map to a score of 100.
const MAX_STARS: f64 = 1000.0;

pub struct GitHubAdapter {
    client: Client,
}

impl GitHubAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    id: u64,
    name: String,
    full_name: String,
    #[serde(default)]
    description: Option<String>,
    html_url: String,
    #[serde(default)]
    stargazers_count: f64,
    #[serde(default)]
    forks_count: i64,
    #[serde(default)]
    owner: Option<Owner>,
    created_at: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Owner {
    login: String,
}

#[async_trait]
impl SourceAdapter for GitHubAdapter {
    fn source(&self) -> Source {
        Source::GitHub
    }

    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>> {
        let since = (Utc::now() - Duration::days(7)).format("%Y-%m-%d");
        let query = format!("created:>{since}");

        let response = self
            .client
            .get(API_BASE)
            .query(&[
                ("q", query.as_str()),
                ("sort", "stars"),
                ("order", "desc"),
                ("per_page", &limit.to_string()),
            ])
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await?;

        let status = response.status();
        if status == 403 || status == 429 {
            warn!("github rate limit exceeded, returning empty list");
            return Ok(Vec::new());
        }
        let body: SearchResponse = response
            .error_for_status()?
            .json()
            .await
            .context("failed to decode GitHub search response")?;

        Ok(body.items.into_iter().filter_map(|r| map_repo(r).ok()).collect())
    }
}

fn map_repo(repo: Repo) -> Result<Item> {
    let description = repo.description.unwrap_or_else(|| "No description".to_string());
    let tags = extract_keywords(&format!(
        "{} {} {}",
        repo.name,
        description,
        repo.language.as_deref().unwrap_or("")
    ));
    let timestamp = DateTime::parse_from_rfc3339(&repo.created_at)
        .map(|dt| dt.timestamp())
        .ok();

    Item::from_raw(RawItem {
        id: format!("gh:{}", repo.id),
        title: format!("{}: {}", repo.full_name, description),
        url: Some(repo.html_url.clone()),
        source: Some(Source::GitHub),
        score: Some(repo.stargazers_count / MAX_STARS * 100.0),
        // Forks as a proxy for discussion activity
        comments: Some(repo.forks_count),
        author: repo.owner.map(|o| o.login),
        timestamp,
        tags,
        discussion_url: Some(format!("{}/issues", repo.html_url)),
        summary: None,
    })
}
