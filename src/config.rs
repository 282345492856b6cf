//! TOML configuration parsing.
//!
//! Application-level configuration (where the database lives, HTTP client
//! tuning), distinct from the persisted user settings in
//! [`crate::settings`], which live inside the database itself.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub feed: FeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/techpulse.sqlite"),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// How long an aggregation result stays fresh.
    pub cache_ttl_secs: u64,
    /// Timeout applied to the shared HTTP client.
    pub request_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            request_timeout_secs: 30,
            user_agent: concat!("techpulse/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Load configuration from `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
    Ok(config)
}
