//! `SQLite` schema definitions for acp-checklists.
//!
//! This module contains the SQL statements for creating and managing
//! the database schema.

/// SQL statement to create the preferences table.
///
/// Holds the small key-value pairs the app persists across launches
/// (favorite tab, welcome card dismissal).
pub const CREATE_PREFERENCES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS preferences (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
)
";

/// SQL statement to create the offline resource cache table.
pub const CREATE_CACHED_RESOURCES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS cached_resources (
    cache_name TEXT NOT NULL,
    url TEXT NOT NULL,
    status INTEGER NOT NULL,
    content_type TEXT,
    body BLOB NOT NULL,
    cached_at TEXT NOT NULL,
    PRIMARY KEY (cache_name, url)
)
";

/// SQL statement to create an index on `cache_name` for generation purges.
pub const CREATE_CACHE_NAME_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_cached_resources_name ON cached_resources(cache_name)
";

/// SQL statement to create the metadata table for storing key-value pairs.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_PREFERENCES_TABLE,
    CREATE_CACHED_RESOURCES_TABLE,
    CREATE_CACHE_NAME_INDEX,
    CREATE_METADATA_TABLE,
];
