//! Keyword frequency tracking and spike detection.
//!
//! Owns the `techpulse_keyword_history` key: a mapping from date
//! (`YYYY-MM-DD`) to per-keyword counts, pruned to a 30-day retention window.
//! Keywords are read from item tags (already canonicalized by
//! [`crate::keyword`]) and never re-tokenized here.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use anyhow::Result;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::kv::KeyValue;
use crate::models::Item;
use crate::storage::VersionedStore;

const HISTORY_KEY: &str = "keyword_history";
const HISTORY_VERSION: u32 = 1;

/// Date buckets older than this are pruned on every record pass.
pub const RETENTION_DAYS: i64 = 30;

/// Baseline used for keywords with no occurrence in the whole window, so a
/// brand-new topic is still spike-eligible on its first day.
const NEW_TOPIC_FLOOR: f64 = 0.5;

/// Persisted per-day keyword counts. `BTreeMap` keeps date keys ordered,
/// which the window selection and history series rely on.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendHistory {
    #[serde(default)]
    pub days: BTreeMap<String, HashMap<String, u32>>,
}

/// A keyword spiking today relative to its rolling average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingKeyword {
    pub keyword: String,
    /// Today's occurrence count.
    pub count: u32,
    /// Rounded percent change of today's count against the window average.
    pub change_percent: i64,
}

/// One point in a keyword's history series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCount {
    pub date: String,
    pub count: u32,
}

/// Tracks daily keyword frequency and detects spikes.
pub struct TrendTracker {
    store: VersionedStore<TrendHistory>,
}

impl TrendTracker {
    pub fn new(kv: Arc<dyn KeyValue>) -> Result<Self> {
        let store = VersionedStore::new(kv, HISTORY_KEY, HISTORY_VERSION, BTreeMap::new())?;
        Ok(Self { store })
    }

    /// Record keyword occurrences from a batch of items under today's date,
    /// then prune buckets older than the retention window.
    ///
    /// Counts accumulate: calling twice with the same items doubles them.
    /// Callers are responsible for not double-recording a fetch pass.
    pub fn record_items(&self, items: &[Item]) -> Result<()> {
        self.record_on(items, Utc::now().date_naive())
    }

    /// Detect keywords whose count today is at least `spike_threshold` times
    /// their rolling average over the past `window_days` days with data.
    ///
    /// Returns an empty list when nothing was recorded today or no prior day
    /// exists, since a spike needs a baseline. Sorted by change percent
    /// descending.
    pub fn get_trending(&self, window_days: u32, spike_threshold: f64) -> Vec<TrendingKeyword> {
        self.trending_on(Utc::now().date_naive(), window_days, spike_threshold)
    }

    /// Full chronological series for one keyword. Days with history data but
    /// no occurrence of the keyword are reported as count 0.
    pub fn get_history(&self, keyword: &str) -> Vec<DayCount> {
        let keyword = crate::keyword::normalize_keyword(keyword);
        let data = self.store.read();
        data.days
            .iter()
            .map(|(date, counts)| DayCount {
                date: date.clone(),
                count: counts.get(&keyword).copied().unwrap_or(0),
            })
            .collect()
    }

    fn record_on(&self, items: &[Item], today: NaiveDate) -> Result<()> {
        let mut data = self.store.read();
        let bucket = data.days.entry(date_key(today)).or_default();

        for item in items {
            for tag in item.tags() {
                *bucket.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let cutoff = date_key(today - Duration::days(RETENTION_DAYS));
        data.days.retain(|date, _| date.as_str() >= cutoff.as_str());

        self.store.write(&data)
    }

    fn trending_on(
        &self,
        today: NaiveDate,
        window_days: u32,
        spike_threshold: f64,
    ) -> Vec<TrendingKeyword> {
        let data = self.store.read();
        let today_key = date_key(today);
        let Some(today_counts) = data.days.get(&today_key) else {
            return Vec::new();
        };

        // Most recent prior date keys with data, capped at the window size.
        let prior: Vec<&String> = data.days.keys().filter(|d| **d < today_key).collect();
        let window: Vec<&String> = prior
            .iter()
            .rev()
            .take(window_days as usize)
            .copied()
            .collect();
        if window.is_empty() {
            return Vec::new();
        }

        let mut trending = Vec::new();
        for (keyword, &count) in today_counts {
            let past: Vec<u32> = window
                .iter()
                .filter_map(|d| data.days[*d].get(keyword).copied())
                .collect();

            // Average over the days the keyword actually appeared; a keyword
            // with no prior occurrence gets the new-topic floor baseline.
            let average = if past.is_empty() {
                NEW_TOPIC_FLOOR
            } else {
                past.iter().sum::<u32>() as f64 / past.len() as f64
            };

            if (count as f64) >= average * spike_threshold {
                let change_percent =
                    (((count as f64 - average) / average) * 100.0).round() as i64;
                trending.push(TrendingKeyword {
                    keyword: keyword.clone(),
                    count,
                    change_percent,
                });
            }
        }

        trending.sort_by(|a, b| {
            b.change_percent
                .cmp(&a.change_percent)
                .then_with(|| a.keyword.cmp(&b.keyword))
        });
        trending
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryKv;
    use crate::models::{RawItem, Source};

    fn tracker() -> TrendTracker {
        TrendTracker::new(Arc::new(MemoryKv::new())).unwrap()
    }

    fn item_with_tags(id: &str, tags: &[&str]) -> Item {
        Item::from_raw(RawItem {
            id: id.to_string(),
            title: "t".to_string(),
            source: Some(Source::HackerNews),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        })
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_record_accumulates_counts() {
        let t = tracker();
        let today = day(2026, 8, 30);
        let items = [item_with_tags("a", &["rust", "tokio"]), item_with_tags("b", &["rust"])];
        t.record_on(&items, today).unwrap();
        t.record_on(&items[..1], today).unwrap();

        let history = t.get_history("rust");
        assert_eq!(history, vec![DayCount { date: "2026-08-30".to_string(), count: 3 }]);
    }

    #[test]
    fn test_old_buckets_pruned() {
        let t = tracker();
        t.record_on(&[item_with_tags("a", &["rust"])], day(2026, 1, 1))
            .unwrap();
        t.record_on(&[item_with_tags("b", &["rust"])], day(2026, 8, 30))
            .unwrap();

        let history = t.get_history("rust");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].date, "2026-08-30");
    }

    #[test]
    fn test_spike_detected_against_rolling_average() {
        let t = tracker();
        let yesterday = [item_with_tags("a", &["rust"]), item_with_tags("b", &["rust"])];
        t.record_on(&yesterday, day(2026, 8, 29)).unwrap();

        let today: Vec<Item> = (0..6)
            .map(|i| item_with_tags(&format!("t{i}"), &["rust"]))
            .collect();
        t.record_on(&today, day(2026, 8, 30)).unwrap();

        let trending = t.trending_on(day(2026, 8, 30), 7, 2.0);
        assert_eq!(
            trending,
            vec![TrendingKeyword {
                keyword: "rust".to_string(),
                count: 6,
                change_percent: 200,
            }]
        );
    }

    #[test]
    fn test_below_threshold_not_trending() {
        let t = tracker();
        t.record_on(
            &[item_with_tags("a", &["rust"]), item_with_tags("b", &["rust"])],
            day(2026, 8, 29),
        )
        .unwrap();
        t.record_on(
            &[item_with_tags("c", &["rust"]), item_with_tags("d", &["rust"]), item_with_tags("e", &["rust"])],
            day(2026, 8, 30),
        )
        .unwrap();

        // 3 today vs average 2: below the 2x threshold
        assert!(t.trending_on(day(2026, 8, 30), 7, 2.0).is_empty());
    }

    #[test]
    fn test_no_baseline_returns_empty() {
        let t = tracker();
        t.record_on(&[item_with_tags("a", &["rust"])], day(2026, 8, 30))
            .unwrap();
        // Only today has data: no prior day, no spikes
        assert!(t.trending_on(day(2026, 8, 30), 7, 2.0).is_empty());

        // And with nothing recorded today at all
        let empty = tracker();
        assert!(empty.trending_on(day(2026, 8, 30), 7, 2.0).is_empty());
    }

    #[test]
    fn test_new_topic_uses_floor_average() {
        let t = tracker();
        t.record_on(&[item_with_tags("a", &["rust"])], day(2026, 8, 29))
            .unwrap();
        // "zig" never appeared before today: floor average of 0.5 applies
        t.record_on(
            &[item_with_tags("b", &["zig"]), item_with_tags("c", &["zig"])],
            day(2026, 8, 30),
        )
        .unwrap();

        let trending = t.trending_on(day(2026, 8, 30), 7, 2.0);
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].keyword, "zig");
        assert_eq!(trending[0].count, 2);
        // (2 - 0.5) / 0.5 * 100 = 300
        assert_eq!(trending[0].change_percent, 300);
    }

    #[test]
    fn test_average_over_days_keyword_appeared() {
        let t = tracker();
        // rust appears on two of three prior days: average = (2 + 4) / 2 = 3
        t.record_on(
            &(0..2).map(|i| item_with_tags(&format!("a{i}"), &["rust"])).collect::<Vec<_>>(),
            day(2026, 8, 27),
        )
        .unwrap();
        t.record_on(&[item_with_tags("b", &["go"])], day(2026, 8, 28))
            .unwrap();
        t.record_on(
            &(0..4).map(|i| item_with_tags(&format!("c{i}"), &["rust"])).collect::<Vec<_>>(),
            day(2026, 8, 29),
        )
        .unwrap();
        t.record_on(
            &(0..6).map(|i| item_with_tags(&format!("d{i}"), &["rust"])).collect::<Vec<_>>(),
            day(2026, 8, 30),
        )
        .unwrap();

        let trending = t.trending_on(day(2026, 8, 30), 7, 2.0);
        let rust = trending.iter().find(|t| t.keyword == "rust").unwrap();
        assert_eq!(rust.count, 6);
        // (6 - 3) / 3 * 100 = 100
        assert_eq!(rust.change_percent, 100);
    }

    #[test]
    fn test_window_limits_days_considered() {
        let t = tracker();
        // Heavy count just outside a 1-day window
        t.record_on(
            &(0..10).map(|i| item_with_tags(&format!("a{i}"), &["rust"])).collect::<Vec<_>>(),
            day(2026, 8, 25),
        )
        .unwrap();
        t.record_on(&[item_with_tags("b", &["rust"])], day(2026, 8, 29))
            .unwrap();
        t.record_on(
            &(0..2).map(|i| item_with_tags(&format!("c{i}"), &["rust"])).collect::<Vec<_>>(),
            day(2026, 8, 30),
        )
        .unwrap();

        // window_days = 1 only sees the Aug 29 count of 1: 2 >= 1 * 2.0
        let trending = t.trending_on(day(2026, 8, 30), 1, 2.0);
        assert_eq!(trending.len(), 1);
        assert_eq!(trending[0].change_percent, 100);

        // a wider window pulls in the Aug 25 bucket and kills the spike
        assert!(t.trending_on(day(2026, 8, 30), 7, 2.0).is_empty());
    }

    #[test]
    fn test_sorted_by_change_percent_descending() {
        let t = tracker();
        t.record_on(
            &[item_with_tags("a", &["rust"]), item_with_tags("b", &["go"])],
            day(2026, 8, 29),
        )
        .unwrap();
        let mut today = Vec::new();
        for i in 0..2 {
            today.push(item_with_tags(&format!("r{i}"), &["rust"]));
        }
        for i in 0..5 {
            today.push(item_with_tags(&format!("g{i}"), &["go"]));
        }
        t.record_on(&today, day(2026, 8, 30)).unwrap();

        let trending = t.trending_on(day(2026, 8, 30), 7, 2.0);
        assert_eq!(trending[0].keyword, "go");
        assert_eq!(trending[0].change_percent, 400);
        assert_eq!(trending[1].keyword, "rust");
        assert_eq!(trending[1].change_percent, 100);
    }

    #[test]
    fn test_history_reports_missing_days_as_zero() {
        let t = tracker();
        t.record_on(&[item_with_tags("a", &["rust"])], day(2026, 8, 29))
            .unwrap();
        t.record_on(&[item_with_tags("b", &["go"])], day(2026, 8, 30))
            .unwrap();

        let history = t.get_history("rust");
        assert_eq!(
            history,
            vec![
                DayCount { date: "2026-08-29".to_string(), count: 1 },
                DayCount { date: "2026-08-30".to_string(), count: 0 },
            ]
        );
    }

    #[test]
    fn test_history_normalizes_lookup_keyword() {
        let t = tracker();
        t.record_on(&[item_with_tags("a", &["javascript"])], day(2026, 8, 30))
            .unwrap();
        let history = t.get_history("JS");
        assert_eq!(history[0].count, 1);
    }
}
