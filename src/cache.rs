//! In-memory page cache with moka.
//!
//! Rendered post lists are cached per request path and query for the TTL
//! configured for their template. Entries are never invalidated on write;
//! stale content is served until the TTL runs out.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use crate::AppResult;

/// Maximum number of cached pages.
pub const DEFAULT_CACHE_CAPACITY: u64 = 1000;

#[async_trait]
pub trait PageCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, html: String, ttl: Duration);
}

#[derive(Clone, Debug)]
struct CachedPage {
    html: Arc<str>,
    ttl: Duration,
    cached_at: time::OffsetDateTime,
}

/// Expires each page after its own TTL, restarting the clock on overwrite.
struct PageExpiry;

impl Expiry<String, CachedPage> for PageExpiry {
    fn expire_after_create(&self, _key: &String, value: &CachedPage, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedPage,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

#[derive(Clone)]
pub struct MokaPageCache {
    pages: Cache<String, CachedPage>,
}

impl MokaPageCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            pages: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PageExpiry)
                .build(),
        }
    }
}

impl Default for MokaPageCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[async_trait]
impl PageCache for MokaPageCache {
    async fn get(&self, key: &str) -> Option<String> {
        let page = self.pages.get(key).await?;
        tracing::debug!(key = %key, cached_at = %page.cached_at, "cache hit");
        Some(page.html.to_string())
    }

    async fn set(&self, key: &str, html: String, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let page = CachedPage {
            html: html.into(),
            ttl,
            cached_at: time::OffsetDateTime::now_utc(),
        };
        self.pages.insert(key.to_owned(), page).await;
    }
}

/// Get a cached page or render and cache it.
///
/// A zero `ttl` bypasses the cache entirely.
pub async fn get_or_render<F, Fut>(cache: &dyn PageCache, key: &str, ttl: Duration, render: F) -> AppResult<String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = AppResult<String>>,
{
    if ttl.is_zero() {
        return render().await;
    }

    if let Some(html) = cache.get(key).await {
        return Ok(html);
    }

    tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "cache miss, rendering");
    let html = render().await?;
    cache.set(key, html.clone(), ttl).await;
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_cache_hit() {
        let cache = MokaPageCache::default();
        let ttl = Duration::from_secs(60);

        let html = get_or_render(&cache, "index:/", ttl, || async { Ok("first".to_owned()) })
            .await
            .unwrap();
        assert_eq!(html, "first");

        let html = get_or_render(&cache, "index:/", ttl, || async { Ok("second".to_owned()) })
            .await
            .unwrap();
        assert_eq!(html, "first");
    }

    #[tokio::test]
    async fn test_zero_ttl_always_renders() {
        let cache = MokaPageCache::default();

        for expected in ["one", "two"] {
            let html = get_or_render(&cache, "index:/", Duration::ZERO, || async { Ok(expected.to_owned()) })
                .await
                .unwrap();
            assert_eq!(html, expected);
        }
        assert!(cache.get("index:/").await.is_none());
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let cache = MokaPageCache::default();
        cache.set("index:/", "stale".to_owned(), Duration::from_millis(300)).await;
        assert_eq!(cache.get("index:/").await.as_deref(), Some("stale"));

        tokio::time::sleep(Duration::from_millis(450)).await;
        assert!(cache.get("index:/").await.is_none());
    }

    #[tokio::test]
    async fn test_different_keys() {
        let cache = MokaPageCache::default();
        let ttl = Duration::from_secs(60);
        cache.set("index:/?page=1", "one".to_owned(), ttl).await;
        cache.set("index:/?page=2", "two".to_owned(), ttl).await;

        assert_eq!(cache.get("index:/?page=1").await.as_deref(), Some("one"));
        assert_eq!(cache.get("index:/?page=2").await.as_deref(), Some("two"));
    }
}
