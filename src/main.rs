//! # TechPulse CLI (`pulse`)
//!
//! The `pulse` binary is the interface to the aggregation pipeline. It
//! fetches the merged feed, records keyword trends, and inspects the local
//! knowledge profile.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `pulse fetch` | Aggregate all enabled sources and print the ranked feed |
//! | `pulse trending` | Show keywords spiking against their rolling average |
//! | `pulse history <keyword>` | Daily frequency series for one keyword |
//! | `pulse sources` | List sources and whether they are enabled |
//! | `pulse read <item-id>` | Mark a feed item as read |
//! | `pulse interests` | Top topics from the reading history |
//! | `pulse config get/set/reset` | Manage persisted settings |
//!
//! ## Examples
//!
//! ```bash
//! pulse fetch --limit 20
//! pulse trending --window-days 7 --threshold 2.0
//! pulse config set enabled_sources hackernews,github,arxiv
//! pulse history rust
//! ```

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use techpulse::adapters::AdapterRegistry;
use techpulse::aggregate::{Aggregator, FetchOptions};
use techpulse::config::load_config;
use techpulse::knowledge::KnowledgeTracker;
use techpulse::kv::{KeyValue, SqliteKv};
use techpulse::models::Source;
use techpulse::settings::SettingsStore;
use techpulse::trend::TrendTracker;

/// TechPulse, a local-first tech news aggregator with trend tracking.
#[derive(Parser)]
#[command(
    name = "pulse",
    about = "Aggregate tech news sources and track topic trends",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/pulse.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch stories from all enabled sources and print the ranked feed.
    ///
    /// Keyword occurrences from the fetched items are recorded into the
    /// trend history as part of the pass.
    Fetch {
        /// Per-source story limit (defaults to the stored setting).
        #[arg(long)]
        limit: Option<u32>,

        /// Bypass the cache even if the last result is still fresh.
        #[arg(long)]
        refresh: bool,
    },

    /// Show keywords trending today against their rolling average.
    Trending {
        /// Number of prior days to average over (defaults to the stored setting).
        #[arg(long)]
        window_days: Option<u32>,

        /// Spike multiplier (defaults to the stored setting).
        #[arg(long)]
        threshold: Option<f64>,
    },

    /// Print the daily frequency series for one keyword.
    History { keyword: String },

    /// List all sources and whether they are enabled.
    Sources,

    /// Mark a feed item as read (idempotent per item id).
    Read { item_id: String },

    /// Show the top topics from the reading history.
    Interests {
        /// How many topics to show.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },

    /// Manage persisted settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print one setting value.
    Get { key: String },
    /// Change one setting value.
    ///
    /// Keys: enabled_sources (comma-separated), stories_per_source,
    /// trending_window_days, trending_spike_threshold.
    Set { key: String, value: String },
    /// Revert all settings to their defaults.
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let kv: Arc<dyn KeyValue> = Arc::new(SqliteKv::open(&config.store.path)?);
    let settings = SettingsStore::new(kv.clone())?;
    let trends = TrendTracker::new(kv.clone())?;
    let knowledge = KnowledgeTracker::new(kv.clone())?;

    let client = reqwest::Client::builder()
        .user_agent(config.feed.user_agent.clone())
        .timeout(Duration::from_secs(config.feed.request_timeout_secs))
        .build()
        .context("failed to build HTTP client")?;
    let registry = AdapterRegistry::with_default_adapters(client);
    let aggregator = Aggregator::new(
        registry,
        SettingsStore::new(kv.clone())?,
        Duration::from_secs(config.feed.cache_ttl_secs),
    );

    match cli.command {
        Commands::Fetch { limit, refresh } => {
            let feed = aggregator
                .fetch_all(FetchOptions {
                    limit,
                    force_refresh: refresh,
                })
                .await;
            trends.record_items(&feed)?;

            if feed.is_empty() {
                println!("no stories (check enabled sources with `pulse sources`)");
                return Ok(());
            }
            println!("{:<5} {:<12} {:<8} TITLE", "SCORE", "SOURCE", "ID");
            for item in &feed {
                println!(
                    "{:<5} {:<12} {:<8} {}",
                    item.score(),
                    item.source(),
                    truncate(item.id(), 8),
                    truncate(item.title(), 90)
                );
            }
            println!("{} stories", feed.len());
        }

        Commands::Trending {
            window_days,
            threshold,
        } => {
            let stored = settings.get();
            let trending = trends.get_trending(
                window_days.unwrap_or(stored.trending_window_days),
                threshold.unwrap_or(stored.trending_spike_threshold),
            );
            if trending.is_empty() {
                println!("nothing trending yet (need today's data plus at least one prior day)");
                return Ok(());
            }
            println!("{:<24} {:<7} CHANGE", "KEYWORD", "COUNT");
            for entry in trending {
                println!(
                    "{:<24} {:<7} {:+}%",
                    entry.keyword, entry.count, entry.change_percent
                );
            }
        }

        Commands::History { keyword } => {
            let series = trends.get_history(&keyword);
            if series.is_empty() {
                println!("no history recorded yet");
                return Ok(());
            }
            for point in series {
                println!("{} {}", point.date, point.count);
            }
        }

        Commands::Sources => {
            let enabled = settings.get().enabled_sources;
            println!("{:<14} ENABLED", "SOURCE");
            for source in Source::ALL {
                println!("{:<14} {}", source, enabled.contains(&source));
            }
        }

        Commands::Read { item_id } => {
            let feed = aggregator.fetch_all(FetchOptions::default()).await;
            let Some(item) = feed.iter().find(|i| i.id() == item_id) else {
                bail!("item '{}' not found in the current feed", item_id);
            };
            knowledge.mark_read(item)?;
            println!("marked {} as read", item_id);
        }

        Commands::Interests { top } => {
            let interests = knowledge.interests(top);
            if interests.is_empty() {
                println!("no reading history yet");
                return Ok(());
            }
            println!("{:<24} COUNT", "TAG");
            for entry in interests {
                println!("{:<24} {}", entry.tag, entry.count);
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                let s = settings.get();
                match key.as_str() {
                    "enabled_sources" => println!(
                        "{}",
                        s.enabled_sources
                            .iter()
                            .map(Source::as_str)
                            .collect::<Vec<_>>()
                            .join(",")
                    ),
                    "stories_per_source" => println!("{}", s.stories_per_source),
                    "trending_window_days" => println!("{}", s.trending_window_days),
                    "trending_spike_threshold" => println!("{}", s.trending_spike_threshold),
                    other => bail!("unknown setting '{}'", other),
                }
            }
            ConfigAction::Set { key, value } => {
                match key.as_str() {
                    "enabled_sources" => {
                        let sources = value
                            .split(',')
                            .filter(|s| !s.trim().is_empty())
                            .map(|s| Source::from_str(s.trim()))
                            .collect::<Result<Vec<_>>>()?;
                        settings.update(|s| s.enabled_sources = sources)?;
                    }
                    "stories_per_source" => {
                        let parsed: u32 = value
                            .parse()
                            .with_context(|| format!("'{value}' is not a valid count"))?;
                        settings.update(|s| s.stories_per_source = parsed)?;
                    }
                    "trending_window_days" => {
                        let parsed: u32 = value
                            .parse()
                            .with_context(|| format!("'{value}' is not a valid day count"))?;
                        settings.update(|s| s.trending_window_days = parsed)?;
                    }
                    "trending_spike_threshold" => {
                        let parsed: f64 = value
                            .parse()
                            .with_context(|| format!("'{value}' is not a valid threshold"))?;
                        settings.update(|s| s.trending_spike_threshold = parsed)?;
                    }
                    other => bail!("unknown setting '{}'", other),
                }
                println!("ok");
            }
            ConfigAction::Reset => {
                settings.reset()?;
                println!("settings reset to defaults");
            }
        },
    }

    Ok(())
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(1)).collect();
        format!("{cut}…")
    }
}
