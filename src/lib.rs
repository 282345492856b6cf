//! # TechPulse
//!
//! A local-first tech news aggregator with keyword trend tracking.
//!
//! TechPulse ingests items from multiple content sources (Hacker News,
//! GitHub trending, Reddit, Product Hunt, arXiv), normalizes them into one
//! canonical shape, merges and ranks them, and tracks which topics are
//! accelerating in popularity over time. Everything runs in a single client
//! process against local persisted state.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────────┐
//! │   Adapters   │──▶│  Aggregator  │──▶│  merged feed  │
//! │ HN/GH/RD/... │   │ dedup + rank │   └──────┬────────┘
//! └──────┬───────┘   └──────────────┘          │
//!        │ keyword engine (tags)     ┌─────────┴─────────┐
//!        ▼                           ▼                   ▼
//! ┌──────────────┐           ┌──────────────┐   ┌────────────────┐
//! │ canonical    │           │ TrendTracker │   │ Knowledge      │
//! │ Item records │           │ spike scores │   │ Tracker        │
//! └──────────────┘           └──────┬───────┘   └──────┬─────────┘
//!                                   ▼                  ▼
//!                            versioned stores over one SQLite KV
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`models`] | `Source` enum and the immutable `Item` record |
//! | [`keyword`] | Tokenization, stopwords, alias canonicalization |
//! | [`kv`] | Flat key-value persistence primitive |
//! | [`storage`] | Versioned store with forward-only migrations |
//! | [`settings`] | Persisted user settings |
//! | [`adapters`] | Per-source fetch adapters and the registry |
//! | [`aggregate`] | Concurrent fetch, dedup, ranking, cache |
//! | [`trend`] | Daily keyword counts and spike detection |
//! | [`knowledge`] | Reading history and topic profile |
//! | [`config`] | TOML configuration parsing |

pub mod adapters;
pub mod aggregate;
pub mod config;
pub mod keyword;
pub mod knowledge;
pub mod kv;
pub mod models;
pub mod settings;
pub mod storage;
pub mod trend;
