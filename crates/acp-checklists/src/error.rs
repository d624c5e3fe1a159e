//! Error types for acp-checklists.
//!
//! This module defines all error types used throughout the crate. Most of them
//! are reported to the user and leave the session untouched; storage failures
//! are caught where they happen and degrade to defaults (see
//! [`crate::preferences`]).

use std::path::PathBuf;
use thiserror::Error;

use crate::checklist::ItemKey;
use crate::tab::TabId;

/// The main error type for acp-checklists operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// The key-value store refused or could not serve a request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Catalog Errors ===
    /// Failed to read a catalog file.
    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        /// Path of the catalog file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The catalog parsed but is inconsistent.
    #[error("invalid catalog: {message}")]
    CatalogValidation {
        /// Description of the inconsistency.
        message: String,
    },

    // === Session Errors ===
    /// A tab identifier could not be parsed or is not known.
    #[error("unknown tab '{0}'")]
    UnknownTab(String),

    /// The tab has no checklist document.
    #[error("no checklist found for tab {0}")]
    DocumentNotFound(TabId),

    /// An item key could not be parsed.
    #[error("invalid item key '{0}' (expected <section>-<item>)")]
    InvalidItemKey(String),

    /// The key does not name a checkable item of the tab's checklist.
    #[error("item {key} is not a checkable item of {tab}")]
    NotCheckable {
        /// Tab the toggle was aimed at.
        tab: TabId,
        /// The rejected key.
        key: ItemKey,
    },

    /// The section index is past the end of the checklist.
    #[error("{tab} has no section {section}")]
    SectionOutOfRange {
        /// Tab the toggle was aimed at.
        tab: TabId,
        /// The rejected section index.
        section: usize,
    },

    // === Offline Cache Errors ===
    /// The origin could not produce a resource.
    #[error("failed to fetch {url}: {message}")]
    Fetch {
        /// The requested URL.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    /// The resource is neither reachable nor cached.
    #[error("resource unavailable offline: {url}")]
    ResourceUnavailable {
        /// The requested URL.
        url: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for acp-checklists operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new storage-unavailable error.
    #[must_use]
    pub fn storage_unavailable(message: impl Into<String>) -> Self {
        Self::StorageUnavailable(message.into())
    }

    /// Create a new catalog validation error.
    #[must_use]
    pub fn catalog(message: impl Into<String>) -> Self {
        Self::CatalogValidation {
            message: message.into(),
        }
    }

    /// Create a fetch error for the given URL.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this error rejects user input without touching any state.
    #[must_use]
    pub fn is_rejected_input(&self) -> bool {
        matches!(
            self,
            Self::UnknownTab(_)
                | Self::DocumentNotFound(_)
                | Self::InvalidItemKey(_)
                | Self::NotCheckable { .. }
                | Self::SectionOutOfRange { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownTab("ZZZZ".to_string());
        assert_eq!(err.to_string(), "unknown tab 'ZZZZ'");

        let err = Error::storage_unavailable("quota exceeded");
        assert_eq!(err.to_string(), "storage unavailable: quota exceeded");
    }

    #[test]
    fn test_not_checkable_display() {
        let err = Error::NotCheckable {
            tab: TabId::new("GIYA"),
            key: ItemKey::new(1, 3),
        };
        let msg = err.to_string();
        assert!(msg.contains("GIYA"));
        assert!(msg.contains("1-3"));
    }

    #[test]
    fn test_section_out_of_range_display() {
        let err = Error::SectionOutOfRange {
            tab: TabId::new("BUBK"),
            section: 12,
        };
        assert_eq!(err.to_string(), "BUBK has no section 12");
    }

    #[test]
    fn test_document_not_found_display() {
        let err = Error::DocumentNotFound(TabId::new("XXXX"));
        assert!(err.to_string().contains("XXXX"));
    }

    #[test]
    fn test_is_rejected_input() {
        assert!(Error::InvalidItemKey("a-b".to_string()).is_rejected_input());
        assert!(Error::UnknownTab("x".to_string()).is_rejected_input());
        assert!(Error::DocumentNotFound(TabId::notice()).is_rejected_input());
        assert!(!Error::storage_unavailable("denied").is_rejected_input());
        assert!(!Error::catalog("bad").is_rejected_input());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = Error::fetch("/index.html", "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("/index.html"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn test_catalog_error_display() {
        let err = Error::catalog("recap for unknown aircraft ABCD");
        assert_eq!(
            err.to_string(),
            "invalid catalog: recap for unknown aircraft ABCD"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
