//! Flat key-value persistence primitive.
//!
//! [`KeyValue`] is the raw storage contract every versioned store is built
//! on: synchronous get/set/remove by string key over a shared namespace.
//! Backends are pluggable: [`SqliteKv`] for the real application state,
//! [`MemoryKv`] for tests.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, RwLock};

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// Synchronous string key-value storage.
pub trait KeyValue: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryKv {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValue for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().unwrap().remove(key);
        Ok(())
    }
}

/// SQLite-backed store: one `kv(key, value)` table.
pub struct SqliteKv {
    conn: Mutex<Connection>,
}

impl SqliteKv {
    /// Open (or create) the database at `path` and ensure the kv table exists.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database: {}", path.display()))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

impl KeyValue for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            [key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_kv_round_trip() {
        let kv = MemoryKv::new();
        assert_eq!(kv.get("a").unwrap(), None);
        kv.set("a", "1").unwrap();
        assert_eq!(kv.get("a").unwrap(), Some("1".to_string()));
        kv.set("a", "2").unwrap();
        assert_eq!(kv.get("a").unwrap(), Some("2".to_string()));
        kv.remove("a").unwrap();
        assert_eq!(kv.get("a").unwrap(), None);
    }

    #[test]
    fn test_sqlite_kv_round_trip() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("data").join("test.sqlite");

        let kv = SqliteKv::open(&path).unwrap();
        kv.set("settings", "{\"a\":1}").unwrap();
        assert_eq!(kv.get("settings").unwrap(), Some("{\"a\":1}".to_string()));

        // Values survive reopening
        drop(kv);
        let kv = SqliteKv::open(&path).unwrap();
        assert_eq!(kv.get("settings").unwrap(), Some("{\"a\":1}".to_string()));
        kv.remove("settings").unwrap();
        assert_eq!(kv.get("settings").unwrap(), None);
    }
}
