//! Persistent series store.
//!
//! Uploaded series are kept under their upload filename so every interaction
//! can re-render everything stored so far. Payloads are the series' JSON form.

use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};
use thiserror::Error;

use crate::data::model::{Series, SeriesCollection, display_name};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database query failed: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("Could not encode or decode series {key}: {source}")]
    Payload {
        key: String,
        source: serde_json::Error,
    },
    #[error("Could not create {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Key-value storage for parsed series, keyed by upload filename.
pub trait SeriesStore {
    /// Insert or overwrite. Overwriting keeps the key's original position.
    fn put(&mut self, key: &str, series: &Series) -> Result<(), StoreError>;
    fn get(&self, key: &str) -> Result<Option<Series>, StoreError>;
    /// Keys in first-insertion order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
    fn remove(&mut self, key: &str) -> Result<bool, StoreError>;
    fn clear(&mut self) -> Result<(), StoreError>;

    /// Every stored series, in key order. Each series is renamed after its
    /// key so files sharing a base name (`run.csv`, `run.dat`) stay apart.
    fn load_all(&self) -> Result<SeriesCollection, StoreError> {
        let mut collection = SeriesCollection::new();
        for key in self.keys()? {
            if let Some(mut series) = self.get(&key)? {
                series.display_name = display_name(&key);
                series.name = key;
                collection.insert(series);
            }
        }
        Ok(collection)
    }
}

fn encode(key: &str, series: &Series) -> Result<String, StoreError> {
    serde_json::to_string(series).map_err(|source| StoreError::Payload {
        key: key.to_string(),
        source,
    })
}

fn decode(key: &str, payload: &str) -> Result<Series, StoreError> {
    serde_json::from_str(payload).map_err(|source| StoreError::Payload {
        key: key.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SeriesStore for MemoryStore {
    fn put(&mut self, key: &str, series: &Series) -> Result<(), StoreError> {
        let payload = encode(key, series)?;
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => *slot = payload,
            None => self.entries.push((key.to_string(), payload)),
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Series>, StoreError> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(k, payload)| decode(k, payload))
            .transpose()
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.iter().map(|(k, _)| k.clone()).collect())
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| k != key);
        Ok(self.entries.len() != before)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.entries.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SQLite store
// ---------------------------------------------------------------------------

/// SQLite-backed store: one row per series in a single `series` table.
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file, creating parent folders as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let store = Self {
            connection: Connection::open(path)?,
        };
        store.apply_schema()?;
        log::info!("Opened series store at {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            connection: Connection::open_in_memory()?,
        };
        store.apply_schema()?;
        Ok(store)
    }

    fn apply_schema(&self) -> Result<(), StoreError> {
        self.connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS series (
                 key TEXT PRIMARY KEY NOT NULL,
                 payload TEXT NOT NULL
             );",
        )?;
        Ok(())
    }
}

impl SeriesStore for SqliteStore {
    fn put(&mut self, key: &str, series: &Series) -> Result<(), StoreError> {
        let payload = encode(key, series)?;
        self.connection
            .prepare_cached(
                "INSERT INTO series (key, payload) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET payload = excluded.payload",
            )?
            .execute(params![key, payload])?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Series>, StoreError> {
        let payload: Option<String> = self
            .connection
            .query_row(
                "SELECT payload FROM series WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        payload.map(|p| decode(key, &p)).transpose()
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut stmt = self
            .connection
            .prepare_cached("SELECT key FROM series ORDER BY rowid")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    fn remove(&mut self, key: &str) -> Result<bool, StoreError> {
        let removed = self
            .connection
            .execute("DELETE FROM series WHERE key = ?1", params![key])?;
        Ok(removed > 0)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.connection.execute("DELETE FROM series", [])?;
        Ok(())
    }
}
