//! Storage layer for acp-checklists.
//!
//! Two concerns live here:
//!
//! - the [`KeyValueStore`] seam behind which preferences are persisted, with
//!   a `SQLite` implementation ([`Storage`]) and an in-memory one
//!   ([`MemoryStore`]);
//! - the `cached_resources` table backing the offline resource cache.

pub mod memory;
pub mod migrations;
pub mod schema;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Error, Result};

pub use memory::MemoryStore;

/// String key-value persistence.
///
/// Every operation may fail; callers decide whether a failure matters.
pub trait KeyValueStore: fmt::Debug {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// A response body stored in the offline cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResource {
    /// Request path, relative to the origin root.
    pub url: String,
    /// HTTP status of the stored response.
    pub status: u16,
    /// Content type of the stored response.
    pub content_type: Option<String>,
    /// Response body.
    pub body: Vec<u8>,
    /// When the response was stored.
    pub cached_at: DateTime<Utc>,
}

/// `SQLite`-backed storage.
#[derive(Debug)]
pub struct Storage {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Storage {
    /// Open or create a storage database at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    /// Initializes the schema if this is a new database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        migrations::initialize_schema(&conn)?;

        info!("Database opened successfully at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory storage instance for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn preference(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM preferences WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    /// Write a preference.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set_preference(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO preferences (key, value, updated_at) VALUES (?1, ?2, ?3)",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!(key, "Stored preference");
        Ok(())
    }

    /// Delete a preference. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_preference(&self, key: &str) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM preferences WHERE key = ?1", [key])?;
        Ok(affected > 0)
    }

    /// Look up a cached response.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cached_resource(&self, cache_name: &str, url: &str) -> Result<Option<CachedResource>> {
        let resource = self
            .conn
            .query_row(
                r"
                SELECT url, status, content_type, body, cached_at
                FROM cached_resources WHERE cache_name = ?1 AND url = ?2
                ",
                [cache_name, url],
                Self::row_to_resource,
            )
            .optional()?;
        Ok(resource)
    }

    /// Store a single response, replacing any previous one for the same URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn put_resource(&self, cache_name: &str, resource: &CachedResource) -> Result<()> {
        Self::insert_resource(&self.conn, cache_name, resource)?;
        debug!(cache_name, url = %resource.url, "Cached resource");
        Ok(())
    }

    /// Store a batch of responses in one transaction: either every resource
    /// is stored or none is.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails; nothing is stored.
    pub fn put_resources(&self, cache_name: &str, resources: &[CachedResource]) -> Result<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for resource in resources {
            Self::insert_resource(&tx, cache_name, resource)?;
        }
        tx.commit()?;

        info!(cache_name, count = resources.len(), "Stored cache generation");
        Ok(resources.len())
    }

    fn insert_resource(
        conn: &Connection,
        cache_name: &str,
        resource: &CachedResource,
    ) -> Result<()> {
        conn.execute(
            r"
            INSERT OR REPLACE INTO cached_resources
                (cache_name, url, status, content_type, body, cached_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                cache_name,
                resource.url,
                resource.status,
                resource.content_type,
                resource.body,
                resource.cached_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Every resource of a cache generation, ordered by URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cached_resources(&self, cache_name: &str) -> Result<Vec<CachedResource>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT url, status, content_type, body, cached_at
            FROM cached_resources WHERE cache_name = ?1 ORDER BY url
            ",
        )?;

        let resources = stmt
            .query_map([cache_name], Self::row_to_resource)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(resources)
    }

    /// Names of every stored cache generation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cache_names(&self) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT DISTINCT cache_name FROM cached_resources ORDER BY cache_name")?;

        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(names)
    }

    /// Every stored cache generation with its number of resources.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn cache_sizes(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            r"
            SELECT cache_name, COUNT(*) FROM cached_resources
            GROUP BY cache_name ORDER BY cache_name
            ",
        )?;

        let sizes = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(sizes)
    }

    /// Delete every resource of a cache generation.
    ///
    /// Returns the number of resources deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_cache(&self, cache_name: &str) -> Result<usize> {
        let affected = self
            .conn
            .execute("DELETE FROM cached_resources WHERE cache_name = ?1", [cache_name])?;

        if affected > 0 {
            info!("Deleted cache {} ({} resources)", cache_name, affected);
        }
        Ok(affected)
    }

    /// Get database statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StorageStats> {
        let preferences: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM preferences", [], |row| row.get(0))?;

        let cached_resources: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM cached_resources", [], |row| row.get(0))?;

        let cache_generations = self.cache_names()?.len();

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StorageStats {
            preferences,
            cached_resources,
            cache_generations,
            db_size_bytes,
        })
    }

    fn row_to_resource(row: &rusqlite::Row) -> rusqlite::Result<CachedResource> {
        let cached_at: String = row.get(4)?;
        let cached_at = DateTime::parse_from_rfc3339(&cached_at)
            .map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc));

        Ok(CachedResource {
            url: row.get(0)?,
            status: row.get(1)?,
            content_type: row.get(2)?,
            body: row.get(3)?,
            cached_at,
        })
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.preference(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_preference(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.delete_preference(key).map(|_| ())
    }
}

/// Statistics about the storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    /// Number of stored preferences.
    pub preferences: i64,
    /// Number of cached resources across every generation.
    pub cached_resources: i64,
    /// Number of cache generations.
    pub cache_generations: usize,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
