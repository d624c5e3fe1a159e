//! Configuration management for acp-checklists.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::offline::{
    CachePolicy, CacheVersion, DEFAULT_NETWORK_FIRST, DEFAULT_PRECACHE, DEFAULT_VERSION,
};
use crate::tab::{TabId, TabKind, NOTICE};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "acp-checklists";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "checklists.db";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "ACP_CHECKLISTS_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ACP_CHECKLISTS_`, sections
///    separated by `__`, e.g. `ACP_CHECKLISTS_APP__DEFAULT_TAB`)
/// 2. TOML config file at `~/.config/acp-checklists/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Application behavior.
    pub app: AppConfig,
    /// Offline cache configuration.
    pub cache: CacheConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/acp-checklists/checklists.db`
    pub database_path: Option<PathBuf>,
}

/// Catalog-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON catalog replacing the built-in one.
    pub path: Option<PathBuf>,
}

/// Application behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Tab shown at startup when no favorite is set.
    pub default_tab: String,
}

/// Offline cache configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache generation version, or `auto` to derive it from the contents.
    pub version: String,
    /// Resources stored at install time.
    pub precache: Vec<String>,
    /// Resources fetched from the origin before the cache.
    pub network_first: Vec<String>,
    /// Directory served as origin when `--origin` is not given.
    pub origin: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_tab: NOTICE.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            version: DEFAULT_VERSION.to_string(),
            precache: DEFAULT_PRECACHE.iter().map(ToString::to_string).collect(),
            network_first: DEFAULT_NETWORK_FIRST
                .iter()
                .map(ToString::to_string)
                .collect(),
            origin: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        let tab = self.default_tab()?;
        if tab.kind() == TabKind::Favorites {
            return Err(Error::ConfigValidation {
                message: "default_tab cannot be the favorite chooser".to_string(),
            });
        }

        self.cache.version.parse::<CacheVersion>()?;

        if self.cache.precache.iter().any(|url| url.trim().is_empty()) {
            return Err(Error::ConfigValidation {
                message: "precache entries cannot be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// The startup tab used when no favorite is set.
    ///
    /// # Errors
    ///
    /// Returns an error if `app.default_tab` is not a tab identifier.
    pub fn default_tab(&self) -> Result<TabId> {
        self.app
            .default_tab
            .parse()
            .map_err(|_| Error::ConfigValidation {
                message: format!("invalid default_tab '{}'", self.app.default_tab),
            })
    }

    /// The offline cache policy.
    ///
    /// # Errors
    ///
    /// Returns an error if `cache.version` is invalid.
    pub fn cache_policy(&self) -> Result<CachePolicy> {
        Ok(CachePolicy {
            version: self.cache.version.parse()?,
            precache: self.cache.precache.clone(),
            network_first: self.cache.network_first.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_temp_config(name: &str, contents: &str) -> PathBuf {
        let dir =
            std::env::temp_dir().join(format!("acp-checklists-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert!(config.catalog.path.is_none());
        assert_eq!(config.app.default_tab, "NOTICE");
        assert_eq!(config.cache.version, "v2");
        assert!(config.cache.precache.contains(&"index.html".to_string()));
        assert_eq!(config.cache.network_first, vec!["catalog.json"]);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_favorites_default() {
        let mut config = Config::default();
        config.app.default_tab = "favori".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("favorite chooser"));
    }

    #[test]
    fn test_validate_rejects_blank_default_tab() {
        let mut config = Config::default();
        config.app.default_tab = "  ".to_string();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("default_tab"));
    }

    #[test]
    fn test_validate_rejects_bad_cache_version() {
        let mut config = Config::default();
        config.cache.version = "v 3".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_precache_entry() {
        let mut config = Config::default();
        config.cache.precache.push(String::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("precache"));
    }

    #[test]
    fn test_database_path_default() {
        let path = Config::default().database_path();
        assert!(path.to_string_lossy().contains("checklists.db"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_default_tab() {
        let mut config = Config::default();
        assert_eq!(config.default_tab().unwrap(), TabId::notice());

        config.app.default_tab = "giya".to_string();
        assert_eq!(config.default_tab().unwrap(), TabId::new("GIYA"));
    }

    #[test]
    fn test_cache_policy() {
        let mut config = Config::default();
        assert_eq!(
            config.cache_policy().unwrap().version,
            CacheVersion::Fixed("v2".to_string())
        );

        config.cache.version = "auto".to_string();
        assert_eq!(config.cache_policy().unwrap().version, CacheVersion::Auto);
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("acp-checklists"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_default_data_dir() {
        let path = Config::default_data_dir();
        assert!(path.to_string_lossy().contains("acp-checklists"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config.app, AppConfig::default());
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = write_temp_config(
            "valid.toml",
            r#"
            [app]
            default_tab = "HPPL"

            [cache]
            version = "auto"
            network_first = ["catalog.json", "manifest.json"]
            "#,
        );

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.default_tab().unwrap(), TabId::new("HPPL"));
        assert_eq!(config.cache.version, "auto");
        assert_eq!(config.cache.network_first.len(), 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.cache.precache, CacheConfig::default().precache);
    }

    #[test]
    fn test_load_reads_every_section() {
        let path = write_temp_config(
            "sections.toml",
            r#"
            [storage]
            database_path = "/var/lib/acp/checklists.db"

            [catalog]
            path = "/etc/acp/catalog.json"

            [cache]
            origin = "/srv/acp/www"
            "#,
        );

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(
            config.database_path(),
            PathBuf::from("/var/lib/acp/checklists.db")
        );
        assert_eq!(
            config.catalog.path,
            Some(PathBuf::from("/etc/acp/catalog.json"))
        );
        assert_eq!(config.cache.origin, Some(PathBuf::from("/srv/acp/www")));
        assert_eq!(config.app, AppConfig::default());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = write_temp_config(
            "invalid.toml",
            r#"
            [app]
            default_tab = "FAVORI"
            "#,
        );

        assert!(Config::load_from(Some(path)).is_err());
    }

    #[test]
    fn test_config_serialize_round_trip() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("default_tab"));

        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_section_deserialize() {
        let json = r#"{"cache": {"version": "v7"}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.cache.version, "v7");
        assert_eq!(config.cache.network_first, vec!["catalog.json"]);
        assert_eq!(config.app.default_tab, "NOTICE");
    }
}
