//! `acp-checklists` - Interactive aircraft checklists for a flying club
//!
//! This library holds the checklist catalog, the per-tab checking sessions
//! with their next/skipped highlights, persisted preferences and an offline
//! resource cache. The `acpcheck` binary drives it from a terminal.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod catalog;
pub mod checklist;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod offline;
pub mod preferences;
pub mod progress;
pub mod render;
pub mod session;
pub mod storage;
pub mod tab;

pub use app::{App, Effect, Intent, Screen};
pub use catalog::Catalog;
pub use checklist::{CheckedState, ChecklistDocument, ItemKey};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use offline::{CachePolicy, OfflineCache};
pub use preferences::Preferences;
pub use progress::{Highlight, Progress, SectionStatus};
pub use session::SessionStore;
pub use storage::{KeyValueStore, MemoryStore, Storage, StorageStats};
pub use tab::TabId;
