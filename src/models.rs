//! Core data models for the aggregation pipeline.
//!
//! [`RawItem`] is the loose record a source adapter assembles from an external
//! API response. [`Item`] is the canonical, immutable record everything
//! downstream consumes. Construction via [`Item::from_raw`] is the single
//! validation point: after it succeeds, no field is ever re-checked or mutated.

use anyhow::{bail, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// The closed set of content sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    HackerNews,
    GitHub,
    Reddit,
    ProductHunt,
    Arxiv,
}

impl Source {
    /// Every source, in registry order.
    pub const ALL: [Source; 5] = [
        Source::HackerNews,
        Source::GitHub,
        Source::Reddit,
        Source::ProductHunt,
        Source::Arxiv,
    ];

    /// Stable lowercase identifier, used in settings and CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::HackerNews => "hackernews",
            Source::GitHub => "github",
            Source::Reddit => "reddit",
            Source::ProductHunt => "producthunt",
            Source::Arxiv => "arxiv",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "hackernews" => Ok(Source::HackerNews),
            "github" => Ok(Source::GitHub),
            "reddit" => Ok(Source::Reddit),
            "producthunt" => Ok(Source::ProductHunt),
            "arxiv" => Ok(Source::Arxiv),
            other => bail!(
                "unknown source '{}' (expected one of: hackernews, github, reddit, producthunt, arxiv)",
                other
            ),
        }
    }
}

/// Unvalidated per-source data, as mapped from an external API response.
///
/// Adapters fill in what they have; [`Item::from_raw`] supplies defaults and
/// rejects records that are unusable.
#[derive(Debug, Clone, Default)]
pub struct RawItem {
    /// Globally unique, source-prefixed id (e.g. `"hn:12345"`).
    pub id: String,
    pub title: String,
    pub url: Option<String>,
    pub source: Option<Source>,
    /// Normalized popularity; clamped to `[0, 100]` on construction.
    pub score: Option<f64>,
    pub comments: Option<i64>,
    pub author: Option<String>,
    /// Seconds since epoch.
    pub timestamp: Option<i64>,
    pub tags: Vec<String>,
    pub discussion_url: Option<String>,
    pub summary: Option<String>,
}

/// The canonical content record.
///
/// Fields are private and there are no mutators: once constructed, an `Item`
/// is immutable. Accessors return borrowed views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    id: String,
    title: String,
    url: String,
    source: Source,
    score: u32,
    comments: u64,
    author: String,
    timestamp: i64,
    tags: Vec<String>,
    discussion_url: String,
    summary: String,
}

impl Item {
    /// Validate and normalize a [`RawItem`] into a canonical `Item`.
    ///
    /// Fails when `id` or `title` is empty or `source` is absent. Everything
    /// else is coerced: score clamped and rounded into `[0, 100]` (non-finite
    /// input resets to 0), comments clamped non-negative, missing author
    /// becomes `"unknown"`, missing timestamp becomes the current time, and
    /// tags are deduplicated preserving insertion order.
    pub fn from_raw(raw: RawItem) -> Result<Item> {
        if raw.id.trim().is_empty() {
            bail!("item id must not be empty");
        }
        if raw.title.trim().is_empty() {
            bail!("item title must not be empty (id: {})", raw.id);
        }
        let Some(source) = raw.source else {
            bail!("item source is missing (id: {})", raw.id);
        };

        let score = match raw.score {
            Some(s) if s.is_finite() => s.round().clamp(0.0, 100.0) as u32,
            _ => 0,
        };
        let comments = raw.comments.map(|c| c.max(0) as u64).unwrap_or(0);
        let author = match raw.author {
            Some(a) if !a.trim().is_empty() => a,
            _ => "unknown".to_string(),
        };
        let timestamp = raw.timestamp.unwrap_or_else(|| Utc::now().timestamp());

        let mut seen = HashSet::new();
        let mut tags = Vec::with_capacity(raw.tags.len());
        for tag in raw.tags {
            if seen.insert(tag.clone()) {
                tags.push(tag);
            }
        }

        Ok(Item {
            id: raw.id,
            title: raw.title,
            url: raw.url.unwrap_or_default(),
            source,
            score,
            comments,
            author,
            timestamp,
            tags,
            discussion_url: raw.discussion_url.unwrap_or_default(),
            summary: raw.summary.unwrap_or_default(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// May be empty (e.g. self-posts without an external link).
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn source(&self) -> Source {
        self.source
    }

    /// Normalized popularity in `[0, 100]`.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn comments(&self) -> u64 {
        self.comments
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Seconds since epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Canonical keywords, deduplicated, insertion order preserved.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn discussion_url(&self) -> &str {
        &self.discussion_url
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawItem {
        RawItem {
            id: "hn:1".to_string(),
            title: "A story".to_string(),
            source: Some(Source::HackerNews),
            ..Default::default()
        }
    }

    #[test]
    fn test_construction_requires_id_title_source() {
        assert!(Item::from_raw(RawItem {
            id: String::new(),
            ..raw()
        })
        .is_err());
        assert!(Item::from_raw(RawItem {
            title: "   ".to_string(),
            ..raw()
        })
        .is_err());
        assert!(Item::from_raw(RawItem {
            source: None,
            ..raw()
        })
        .is_err());
        assert!(Item::from_raw(raw()).is_ok());
    }

    #[test]
    fn test_score_clamped_and_rounded() {
        let cases = [
            (Some(42.4), 42),
            (Some(42.6), 43),
            (Some(-5.0), 0),
            (Some(250.0), 100),
            (Some(f64::NAN), 0),
            (Some(f64::INFINITY), 0),
            (None, 0),
        ];
        for (input, expected) in cases {
            let item = Item::from_raw(RawItem {
                score: input,
                ..raw()
            })
            .unwrap();
            assert_eq!(item.score(), expected, "score input {:?}", input);
        }
    }

    #[test]
    fn test_comments_clamped_non_negative() {
        let item = Item::from_raw(RawItem {
            comments: Some(-3),
            ..raw()
        })
        .unwrap();
        assert_eq!(item.comments(), 0);

        let item = Item::from_raw(RawItem {
            comments: Some(17),
            ..raw()
        })
        .unwrap();
        assert_eq!(item.comments(), 17);
    }

    #[test]
    fn test_defaults() {
        let item = Item::from_raw(raw()).unwrap();
        assert_eq!(item.author(), "unknown");
        assert_eq!(item.url(), "");
        assert_eq!(item.discussion_url(), "");
        assert_eq!(item.summary(), "");
        assert!(item.timestamp() > 0);

        let item = Item::from_raw(RawItem {
            author: Some("  ".to_string()),
            ..raw()
        })
        .unwrap();
        assert_eq!(item.author(), "unknown");
    }

    #[test]
    fn test_tags_deduplicated_order_preserved() {
        let item = Item::from_raw(RawItem {
            tags: vec![
                "rust".to_string(),
                "wasm".to_string(),
                "rust".to_string(),
                "cli".to_string(),
            ],
            ..raw()
        })
        .unwrap();
        assert_eq!(item.tags(), ["rust", "wasm", "cli"]);
    }

    #[test]
    fn test_identical_input_yields_equal_items() {
        let input = RawItem {
            score: Some(50.0),
            timestamp: Some(1_700_000_000),
            tags: vec!["rust".to_string()],
            ..raw()
        };
        let a = Item::from_raw(input.clone()).unwrap();
        let b = Item::from_raw(input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_source_round_trip() {
        for source in Source::ALL {
            assert_eq!(source.as_str().parse::<Source>().unwrap(), source);
        }
        assert!("slashdot".parse::<Source>().is_err());

        let json = serde_json::to_string(&Source::HackerNews).unwrap();
        assert_eq!(json, "\"hackernews\"");
    }
}
