//! arXiv adapter.
//!
//! Queries the Atom export API for recent CS papers (AI, SE, learning,
//! vision) and parses the feed with `quick-xml`. Papers carry no popularity
//! signal, so they get a fixed base score.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::DateTime;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::Client;
use tracing::debug;

use crate::keyword::extract_keywords;
use crate::models::{Item, RawItem, Source};

use super::SourceAdapter;

const API_BASE: &str = "http://export.arxiv.org/api/query";
const CATEGORY_QUERY: &str = "cat:cs.AI OR cat:cs.SE OR cat:cs.LG OR cat:cs.CV";

/// Papers have no vote signal; fixed base score.
const DEFAULT_SCORE: f64 = 60.0;

pub struct ArxivAdapter {
    client: Client,
}

impl ArxivAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SourceAdapter for ArxivAdapter {
    fn source(&self) -> Source {
        Source::Arxiv
    }

    async fn fetch_stories(&self, limit: u32) -> Result<Vec<Item>> {
        let xml = self
            .client
            .get(API_BASE)
            .query(&[
                ("search_query", CATEGORY_QUERY),
                ("start", "0"),
                ("max_results", &limit.to_string()),
                ("sortBy", "submittedDate"),
                ("sortOrder", "descending"),
            ])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
            .context("failed to read arXiv feed body")?;

        let entries = parse_feed(&xml)?;
        Ok(entries
            .into_iter()
            .filter_map(|entry| match map_entry(entry) {
                Ok(item) => Some(item),
                Err(err) => {
                    debug!(error = %err, "skipping unmappable arXiv entry");
                    None
                }
            })
            .collect())
    }
}

/// One `<entry>` of the Atom feed, as parsed.
#[derive(Debug, Default)]
struct FeedEntry {
    id_url: String,
    title: String,
    summary: String,
    published: String,
    author: String,
    pdf_link: String,
}

/// Fields of an entry that carry text content.
#[derive(Debug, Clone, Copy, PartialEq)]
enum TextField {
    Id,
    Title,
    Summary,
    Published,
    AuthorName,
}

/// Pull all entries out of the Atom feed.
fn parse_feed(xml: &str) -> Result<Vec<FeedEntry>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<FeedEntry> = None;
    let mut in_author = false;
    let mut field: Option<TextField> = None;

    loop {
        match reader.read_event().context("malformed arXiv feed XML")? {
            Event::Start(e) => {
                let name = e.name();
                match name.as_ref() {
                    b"entry" => current = Some(FeedEntry::default()),
                    b"author" if current.is_some() => in_author = true,
                    b"id" if current.is_some() => field = Some(TextField::Id),
                    b"title" if current.is_some() => field = Some(TextField::Title),
                    b"summary" if current.is_some() => field = Some(TextField::Summary),
                    b"published" if current.is_some() => field = Some(TextField::Published),
                    b"name" if in_author => field = Some(TextField::AuthorName),
                    b"link" => {
                        if let Some(entry) = current.as_mut() {
                            read_link(&e, entry)?;
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"link" {
                    if let Some(entry) = current.as_mut() {
                        read_link(&e, entry)?;
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(entry), Some(f)) = (current.as_mut(), field) {
                    let text = t.unescape().context("bad text in arXiv feed")?;
                    let target = match f {
                        TextField::Id => &mut entry.id_url,
                        TextField::Title => &mut entry.title,
                        TextField::Summary => &mut entry.summary,
                        TextField::Published => &mut entry.published,
                        TextField::AuthorName => {
                            // Keep the first author only
                            if entry.author.is_empty() {
                                entry.author.push_str(text.trim());
                            }
                            field = None;
                            continue;
                        }
                    };
                    target.push_str(&text);
                }
            }
            Event::End(e) => {
                match e.name().as_ref() {
                    b"entry" => {
                        if let Some(entry) = current.take() {
                            entries.push(entry);
                        }
                    }
                    b"author" => in_author = false,
                    _ => {}
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(entries)
}

/// Capture the PDF link from a `<link>` element's attributes.
fn read_link(e: &quick_xml::events::BytesStart<'_>, entry: &mut FeedEntry) -> Result<()> {
    let mut href = None;
    let mut is_pdf = false;
    for attr in e.attributes() {
        let attr = attr.context("bad link attribute in arXiv feed")?;
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        match attr.key.as_ref() {
            b"href" => href = Some(value),
            b"title" if value == "pdf" => is_pdf = true,
            _ => {}
        }
    }
    if is_pdf {
        if let Some(href) = href {
            entry.pdf_link = href;
        }
    }
    Ok(())
}

fn map_entry(entry: FeedEntry) -> Result<Item> {
    // Entry id looks like http://arxiv.org/abs/2101.00001v1
    let id_part = entry
        .id_url
        .rsplit('/')
        .next()
        .unwrap_or(entry.id_url.as_str())
        .to_string();
    let title = collapse_whitespace(&entry.title);
    let summary = collapse_whitespace(&entry.summary);
    let tags = extract_keywords(&format!("{title} {summary}"));
    let timestamp = DateTime::parse_from_rfc3339(&entry.published)
        .map(|dt| dt.timestamp())
        .ok();
    let url = if entry.pdf_link.is_empty() {
        entry.id_url.clone()
    } else {
        entry.pdf_link
    };

    Item::from_raw(RawItem {
        id: format!("arxiv:{id_part}"),
        title: format!("[Paper] {title}"),
        url: Some(url),
        source: Some(Source::Arxiv),
        score: Some(DEFAULT_SCORE),
        comments: None,
        author: if entry.author.is_empty() {
            Some("arXiv".to_string())
        } else {
            Some(entry.author)
        },
        timestamp,
        tags,
        // Abstract page
        discussion_url: Some(entry.id_url),
        summary: Some(summary),
    })
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2601.00001v1</id>
    <title>Scaling Laws for
      Sparse Transformers</title>
    <summary>We study sparse transformer models and their scaling behavior.</summary>
    <published>2026-08-29T00:00:00Z</published>
    <author><name>Ada Lovelace</name></author>
    <author><name>Second Author</name></author>
    <link href="http://arxiv.org/abs/2601.00001v1" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2601.00001v1" rel="related" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2601.00002v1</id>
    <title>Program Repair with LLMs</title>
    <summary>Automated program repair using large language models.</summary>
    <published>2026-08-28T12:30:00Z</published>
    <author><name>Grace Hopper</name></author>
    <link href="http://arxiv.org/abs/2601.00002v1" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn test_parse_feed() {
        let entries = parse_feed(SAMPLE_FEED).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].author, "Ada Lovelace");
        assert_eq!(entries[0].pdf_link, "http://arxiv.org/pdf/2601.00001v1");
        assert_eq!(entries[1].pdf_link, "");
    }

    #[test]
    fn test_map_entry() {
        let entries = parse_feed(SAMPLE_FEED).unwrap();
        let item = map_entry(entries.into_iter().next().unwrap()).unwrap();

        assert_eq!(item.id(), "arxiv:2601.00001v1");
        assert_eq!(item.title(), "[Paper] Scaling Laws for Sparse Transformers");
        assert_eq!(item.url(), "http://arxiv.org/pdf/2601.00001v1");
        assert_eq!(item.discussion_url(), "http://arxiv.org/abs/2601.00001v1");
        assert_eq!(item.score(), 60);
        assert_eq!(item.author(), "Ada Lovelace");
        assert!(item.tags().contains(&"transformers".to_string()));
    }

    #[test]
    fn test_missing_pdf_link_falls_back_to_abstract() {
        let entries = parse_feed(SAMPLE_FEED).unwrap();
        let item = map_entry(entries.into_iter().nth(1).unwrap()).unwrap();
        assert_eq!(item.url(), "http://arxiv.org/abs/2601.00002v1");
        assert!(item.tags().contains(&"llm".to_string()));
    }
}
