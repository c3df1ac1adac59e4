//! Cache-aware feed fetching.

use chrono::Utc;

use briefcast_shared::{CachedFeed, Result};
use briefcast_storage::FeedCache;

use crate::FeedSource;

/// Default window within which a cached feed is served without refreshing.
pub const DEFAULT_FRESH_TTL_MS: i64 = 30 * 60 * 1000;

/// Fetch a source through the cache.
///
/// A cache entry younger than `ttl_ms` is returned as-is. Otherwise the
/// source is fetched and the cache refreshed; when the refresh fails and a
/// stale entry exists, the stale entry is served instead of the error. An
/// absent cache degrades to a direct fetch.
pub async fn fetch_with_cache(
    source: &dyn FeedSource,
    cache: Option<&FeedCache>,
    ttl_ms: i64,
) -> Result<CachedFeed> {
    let cached = match cache {
        Some(cache) => match cache.get(source.id()).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(source = source.id(), error = %e, "feed cache read failed");
                None
            }
        },
        None => None,
    };

    let now = Utc::now().timestamp_millis();
    if let Some(entry) = &cached {
        if now - entry.updated < ttl_ms {
            tracing::debug!(source = source.id(), "serving fresh cached feed");
            return Ok(entry.clone());
        }
    }

    match source.fetch().await {
        Ok(items) => {
            if let Some(cache) = cache {
                if let Err(e) = cache.set(source.id(), &items).await {
                    tracing::warn!(source = source.id(), error = %e, "feed cache write failed");
                }
            }
            Ok(CachedFeed {
                id: source.id().to_string(),
                updated: now,
                items,
            })
        }
        Err(e) => match cached {
            Some(stale) => {
                tracing::warn!(
                    source = source.id(),
                    error = %e,
                    "feed refresh failed, serving stale cache"
                );
                Ok(stale)
            }
            None => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use briefcast_shared::{BriefcastError, FeedItem};
    use briefcast_storage::MemoryFeedCache;

    use super::*;

    struct StubSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl FeedSource for StubSource {
        fn id(&self) -> &'static str {
            "stub"
        }

        fn label(&self) -> &'static str {
            "Stub source"
        }

        async fn fetch(&self) -> Result<Vec<FeedItem>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BriefcastError::Network("upstream down".into()));
            }
            Ok(vec![FeedItem {
                id: "fresh".into(),
                title: "Fresh item".into(),
                url: "https://example.com/fresh".into(),
                mobile_url: None,
                published_at: None,
            }])
        }
    }

    #[tokio::test]
    async fn fresh_cache_short_circuits_the_fetch() {
        let cache = FeedCache::Memory(MemoryFeedCache::new());
        let source = StubSource::new(false);

        // Prime the cache, then ask again within the TTL.
        fetch_with_cache(&source, Some(&cache), DEFAULT_FRESH_TTL_MS)
            .await
            .expect("prime");
        let entry = fetch_with_cache(&source, Some(&cache), DEFAULT_FRESH_TTL_MS)
            .await
            .expect("cached");

        assert_eq!(entry.items.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_cache_is_served_when_the_refresh_fails() {
        let cache = FeedCache::Memory(MemoryFeedCache::new());

        let healthy = StubSource::new(false);
        fetch_with_cache(&healthy, Some(&cache), DEFAULT_FRESH_TTL_MS)
            .await
            .expect("prime");

        // A zero TTL forces a refresh; the failing source falls back to cache.
        let failing = StubSource::new(true);
        let entry = fetch_with_cache(&failing, Some(&cache), 0)
            .await
            .expect("stale fallback");
        assert_eq!(entry.items[0].id, "fresh");
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_cache_degrades_to_direct_fetch() {
        let source = StubSource::new(false);
        let entry = fetch_with_cache(&source, None, DEFAULT_FRESH_TTL_MS)
            .await
            .expect("direct");
        assert_eq!(entry.items.len(), 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_error_without_cache_propagates() {
        let source = StubSource::new(true);
        let err = fetch_with_cache(&source, None, DEFAULT_FRESH_TTL_MS)
            .await
            .expect_err("error");
        assert!(matches!(err, BriefcastError::Network(_)));
    }
}
