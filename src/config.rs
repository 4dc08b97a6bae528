//! Application configuration loaded from the environment.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Default index cache timeout in seconds.
pub const DEFAULT_INDEX_CACHE_TIMEOUT: u64 = 20;

/// Default upload limit for multipart bodies.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Page cache TTLs keyed by template name.
///
/// A missing name or a zero timeout means the view is rendered on every
/// request.
#[derive(Debug, Clone, Default)]
pub struct CacheTimeouts(HashMap<String, u64>);

impl CacheTimeouts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, template: impl Into<String>, seconds: u64) -> Self {
        self.0.insert(template.into(), seconds);
        self
    }

    pub fn get(&self, template: &str) -> Duration {
        Duration::from_secs(self.0.get(template).copied().unwrap_or(0))
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// SQLite connection URL.
    pub database_url: String,

    /// Directory uploaded images are written to and served from.
    pub media_root: PathBuf,

    pub cache_timeouts: CacheTimeouts,

    /// Sessions expire after this much inactivity.
    pub session_inactivity: time::Duration,

    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `YATUBE_BIND_ADDR` (default: "0.0.0.0:8080")
    /// - `DATABASE_URL` (default: "sqlite://yatube.db?mode=rwc")
    /// - `MEDIA_ROOT` (default: "media")
    /// - `INDEX_CACHE_TIMEOUT` seconds (default: 20)
    /// - `FOLLOW_CACHE_TIMEOUT` seconds (default: the index timeout)
    /// - `SESSION_INACTIVITY_MINUTES` (default: 60)
    /// - `MAX_UPLOAD_BYTES` (default: 10 MiB)
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr = dotenv::var("YATUBE_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let database_url =
            dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://yatube.db?mode=rwc".to_string());

        let media_root = PathBuf::from(dotenv::var("MEDIA_ROOT").unwrap_or_else(|_| "media".to_string()));

        let index_timeout = parse_var("INDEX_CACHE_TIMEOUT")?.unwrap_or(DEFAULT_INDEX_CACHE_TIMEOUT);
        let follow_timeout = parse_var("FOLLOW_CACHE_TIMEOUT")?.unwrap_or(index_timeout);
        let cache_timeouts = CacheTimeouts::new()
            .with("index", index_timeout)
            .with("follow", follow_timeout);

        let inactivity_minutes: i64 = parse_var("SESSION_INACTIVITY_MINUTES")?.unwrap_or(60);
        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        tracing::info!(
            bind_addr = %bind_addr,
            database_url = %database_url,
            media_root = ?media_root,
            index_cache_timeout = index_timeout,
            follow_cache_timeout = follow_timeout,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            database_url,
            media_root,
            cache_timeouts,
            session_inactivity: time::Duration::minutes(inactivity_minutes),
            max_upload_bytes,
        })
    }

    /// Configuration for tests and embedding: no caching, the given media root.
    pub fn with_media_root(media_root: impl Into<PathBuf>) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            database_url: "sqlite::memory:".to_string(),
            media_root: media_root.into(),
            cache_timeouts: CacheTimeouts::new(),
            session_inactivity: time::Duration::minutes(60),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

fn parse_var<T>(name: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match dotenv::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{name} must be a number: {e}")),
        Err(_) => Ok(None),
    }
}
