//! Offline resource cache.
//!
//! Application resources are copied from an [`Origin`] into named cache
//! generations stored in `SQLite`, so the app keeps working without a
//! network. The lifecycle has three steps:
//!
//! 1. [`OfflineCache::install`] fetches every precached resource and stores
//!    them as a new generation, all or nothing.
//! 2. [`OfflineCache::fetch`] answers requests: cache-first for most
//!    resources, network-first for those that must stay fresh.
//! 3. [`OfflineCache::activate`] deletes every generation but the current one.

use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::storage::{CachedResource, Storage};

/// Prefix of every cache generation name.
pub const CACHE_PREFIX: &str = "acp-checklists-cache-";

/// Preference key remembering the installed generation.
const CURRENT_CACHE_KEY: &str = "acp-checklists-cache-current";

/// Resources stored at install time.
pub const DEFAULT_PRECACHE: &[&str] = &[
    "/",
    "index.html",
    "manifest.json",
    "icon-192x192.png",
    "icon-512x512.png",
    "maskable_icon.png",
    "apple-touch-icon.png",
];

/// Resources fetched from the origin before falling back to the cache.
pub const DEFAULT_NETWORK_FIRST: &[&str] = &["catalog.json"];

/// Fixed version used when none is configured.
pub const DEFAULT_VERSION: &str = "v2";

/// A request for an application resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method, e.g. `GET`.
    pub method: String,
    /// Resource path relative to the origin root.
    pub url: String,
}

impl Request {
    /// Create a `GET` request.
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// Create a request with an arbitrary method.
    #[must_use]
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
        }
    }

    /// Check whether this is a `GET` request.
    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// The cache key of this request.
    #[must_use]
    pub fn cache_key(&self) -> String {
        normalize_url(&self.url)
    }
}

/// A response to a [`Request`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// HTTP status.
    pub status: u16,
    /// Content type, when known.
    pub content_type: Option<String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl Response {
    /// A `200 OK` response.
    #[must_use]
    pub fn ok(content_type: Option<String>, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type,
            body,
        }
    }

    /// A `404 Not Found` response.
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            status: 404,
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Check whether the response is cacheable (status 200).
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    fn into_resource(self, url: String) -> CachedResource {
        CachedResource {
            url,
            status: self.status,
            content_type: self.content_type,
            body: self.body,
            cached_at: Utc::now(),
        }
    }
}

impl From<CachedResource> for Response {
    fn from(resource: CachedResource) -> Self {
        Self {
            status: resource.status,
            content_type: resource.content_type,
            body: resource.body,
        }
    }
}

/// Where a response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Served from the current cache generation.
    Cache,
    /// Fetched from the origin.
    Network,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A response and its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    /// The response.
    pub response: Response,
    /// Where it came from.
    pub source: Source,
}

/// Where resources are fetched from.
#[async_trait]
pub trait Origin: Send + Sync {
    /// Fetch a resource.
    ///
    /// A missing resource is a response with status 404, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the origin cannot be reached.
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// An [`Origin`] serving files from a local directory, the way a static web
/// server would. `/` serves `index.html`.
#[derive(Debug, Clone)]
pub struct DirectoryOrigin {
    root: PathBuf,
}

impl DirectoryOrigin {
    /// Serve files under `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The served directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a cache key to a file under the root; `None` for paths escaping it.
    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let relative = if key == "/" { "index.html" } else { key };
        let relative = Path::new(relative);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return None;
        }
        Some(self.root.join(relative))
    }
}

#[async_trait]
impl Origin for DirectoryOrigin {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let key = request.cache_key();
        let Some(path) = self.resolve(&key) else {
            debug!(url = %request.url, "Rejected path outside origin root");
            return Ok(Response::not_found());
        };

        match tokio::fs::read(&path).await {
            Ok(body) => Ok(Response::ok(content_type(&path), body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Response::not_found()),
            Err(e) => Err(Error::fetch(&request.url, e.to_string())),
        }
    }
}

fn content_type(path: &Path) -> Option<String> {
    let mime = match path.extension()?.to_str()? {
        "html" => "text/html; charset=utf-8",
        "json" => "application/json",
        "js" => "text/javascript",
        "css" => "text/css",
        "png" => "image/png",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Cache key of a URL: leading `/` and `./` dropped, except for the root.
fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let stripped = trimmed.trim_start_matches("./").trim_start_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        stripped.to_string()
    }
}

/// How cache generations are versioned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheVersion {
    /// A version chosen by hand, bumped on every deployment.
    Fixed(String),
    /// A fingerprint of the precached contents.
    Auto,
}

impl FromStr for CacheVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            Ok(Self::Auto)
        } else if s.is_empty() || s.contains(char::is_whitespace) {
            Err(Error::ConfigValidation {
                message: format!("invalid cache version '{s}'"),
            })
        } else {
            Ok(Self::Fixed(s.to_string()))
        }
    }
}

impl fmt::Display for CacheVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(version) => f.write_str(version),
            Self::Auto => f.write_str("auto"),
        }
    }
}

impl Serialize for CacheVersion {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CacheVersion {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which resources are cached and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Versioning scheme.
    pub version: CacheVersion,
    /// Resources stored at install time.
    pub precache: Vec<String>,
    /// Resources that try the origin before the cache.
    pub network_first: Vec<String>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            version: CacheVersion::Fixed(DEFAULT_VERSION.to_string()),
            precache: DEFAULT_PRECACHE.iter().map(ToString::to_string).collect(),
            network_first: DEFAULT_NETWORK_FIRST
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl CachePolicy {
    fn is_network_first(&self, key: &str) -> bool {
        self.network_first.iter().any(|url| normalize_url(url) == key)
    }
}

/// Summary of the stored generations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStatus {
    /// Current generation, if one is installed or fixed.
    pub current: Option<String>,
    /// Every stored generation with its resource count.
    pub generations: Vec<(String, usize)>,
}

/// The offline cache over a [`Storage`].
#[derive(Debug)]
pub struct OfflineCache<'s> {
    storage: &'s Storage,
    policy: CachePolicy,
}

impl<'s> OfflineCache<'s> {
    /// Create a cache over `storage`.
    #[must_use]
    pub fn new(storage: &'s Storage, policy: CachePolicy) -> Self {
        Self { storage, policy }
    }

    /// The policy in use.
    #[must_use]
    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Name of the current generation.
    ///
    /// A fixed version names it directly; an automatic one is only known once
    /// a generation was installed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn current_name(&self) -> Result<Option<String>> {
        match &self.policy.version {
            CacheVersion::Fixed(version) => Ok(Some(format!("{CACHE_PREFIX}{version}"))),
            CacheVersion::Auto => self.storage.preference(CURRENT_CACHE_KEY),
        }
    }

    /// Fetch every precached resource and store them as a new generation.
    ///
    /// Returns the generation name. If any resource fails or is not a
    /// `200`, nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if a resource cannot be fetched or stored.
    pub async fn install(&self, origin: &dyn Origin) -> Result<String> {
        let mut resources = Vec::with_capacity(self.policy.precache.len());
        for url in &self.policy.precache {
            let request = Request::get(url.as_str());
            let response = origin.fetch(&request).await?;
            if !response.is_ok() {
                return Err(Error::fetch(url, format!("status {}", response.status)));
            }
            resources.push(response.into_resource(request.cache_key()));
        }

        let name = match &self.policy.version {
            CacheVersion::Fixed(version) => format!("{CACHE_PREFIX}{version}"),
            CacheVersion::Auto => format!("{CACHE_PREFIX}{}", fingerprint(&resources)),
        };

        self.storage.put_resources(&name, &resources)?;
        self.storage.set_preference(CURRENT_CACHE_KEY, &name)?;

        info!(cache = %name, resources = resources.len(), "Installed offline cache");
        Ok(name)
    }

    /// Answer a request.
    ///
    /// Non-`GET` requests go straight to the origin and are never stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource is neither cached nor reachable.
    pub async fn fetch(&self, request: &Request, origin: &dyn Origin) -> Result<Fetched> {
        if !request.is_get() {
            let response = origin.fetch(request).await?;
            return Ok(Fetched {
                response,
                source: Source::Network,
            });
        }

        let key = request.cache_key();
        let Some(name) = self.current_name()? else {
            debug!(url = %key, "No cache installed, passing through");
            let response = origin.fetch(request).await?;
            return Ok(Fetched {
                response,
                source: Source::Network,
            });
        };

        if self.policy.is_network_first(&key) {
            self.network_first(&name, &key, request, origin).await
        } else {
            self.cache_first(&name, &key, request, origin).await
        }
    }

    async fn network_first(
        &self,
        name: &str,
        key: &str,
        request: &Request,
        origin: &dyn Origin,
    ) -> Result<Fetched> {
        match origin.fetch(request).await {
            Ok(response) => {
                self.store(name, key, &response)?;
                Ok(Fetched {
                    response,
                    source: Source::Network,
                })
            }
            Err(e) => {
                warn!(url = %key, error = %e, "Origin unreachable, falling back to cache");
                self.storage
                    .cached_resource(name, key)?
                    .map(|resource| Fetched {
                        response: resource.into(),
                        source: Source::Cache,
                    })
                    .ok_or_else(|| Error::ResourceUnavailable {
                        url: key.to_string(),
                    })
            }
        }
    }

    async fn cache_first(
        &self,
        name: &str,
        key: &str,
        request: &Request,
        origin: &dyn Origin,
    ) -> Result<Fetched> {
        if let Some(resource) = self.storage.cached_resource(name, key)? {
            debug!(url = %key, "Cache hit");
            return Ok(Fetched {
                response: resource.into(),
                source: Source::Cache,
            });
        }

        let response = origin.fetch(request).await.map_err(|e| {
            warn!(url = %key, error = %e, "Cache miss and origin unreachable");
            Error::ResourceUnavailable {
                url: key.to_string(),
            }
        })?;
        self.store(name, key, &response)?;
        Ok(Fetched {
            response,
            source: Source::Network,
        })
    }

    fn store(&self, name: &str, key: &str, response: &Response) -> Result<()> {
        if response.is_ok() {
            self.storage
                .put_resource(name, &response.clone().into_resource(key.to_string()))?;
        }
        Ok(())
    }

    /// Delete every generation except the current one.
    ///
    /// Returns the deleted generation names.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn activate(&self) -> Result<Vec<String>> {
        let Some(current) = self.current_name()? else {
            warn!("No cache installed, nothing to activate");
            return Ok(Vec::new());
        };

        let mut purged = Vec::new();
        for name in self.storage.cache_names()? {
            if name != current {
                self.storage.delete_cache(&name)?;
                purged.push(name);
            }
        }

        info!(cache = %current, purged = purged.len(), "Activated offline cache");
        Ok(purged)
    }

    /// Current generation and stored generations.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn status(&self) -> Result<CacheStatus> {
        Ok(CacheStatus {
            current: self.current_name()?,
            generations: self.storage.cache_sizes()?,
        })
    }
}

/// Short BLAKE3 fingerprint of a set of resources.
fn fingerprint(resources: &[CachedResource]) -> String {
    let mut hasher = blake3::Hasher::new();
    for resource in resources {
        hasher.update(resource.url.as_bytes());
        hasher.update(&[0]);
        hasher.update(&resource.body);
        hasher.update(&[0]);
    }
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..12].to_string()
}
