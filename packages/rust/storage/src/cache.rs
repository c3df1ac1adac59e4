//! Feed-cache capability with two backends.
//!
//! The backend is selected once at startup: the persistent store when it can
//! be opened, an in-memory map when it cannot, and no cache at all when
//! caching is disabled via the environment. Callers tolerate an absent cache
//! by fetching directly.

use std::collections::HashMap;
use std::path::Path;

use chrono::Utc;
use tokio::sync::Mutex;

use briefcast_shared::{CachedFeed, FeedItem, Result, cache_enabled, store_path};

use crate::Storage;

/// Feed cache backend, fixed for the life of the process.
pub enum FeedCache {
    /// Backed by the libSQL store's `feed_cache` table.
    Sqlite(Storage),
    /// Backed by a process-local map; contents die with the process.
    Memory(MemoryFeedCache),
}

impl FeedCache {
    /// Select a backend based on environment and store availability.
    ///
    /// Returns `None` when caching is disabled outright.
    pub async fn from_env() -> Option<FeedCache> {
        if !cache_enabled() {
            return None;
        }

        let path = match store_path() {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "cannot resolve store path, using in-memory cache");
                return Some(FeedCache::Memory(MemoryFeedCache::new()));
            }
        };

        Some(Self::select(&path).await)
    }

    /// Select a backend for an explicit store path.
    pub async fn select(path: &Path) -> FeedCache {
        match Storage::open(path).await {
            Ok(storage) => FeedCache::Sqlite(storage),
            Err(e) => {
                tracing::warn!(error = %e, "failed to open feed cache store, using in-memory cache");
                FeedCache::Memory(MemoryFeedCache::new())
            }
        }
    }

    /// Store (or replace) the cached items for a source.
    pub async fn set(&self, key: &str, items: &[FeedItem]) -> Result<()> {
        match self {
            FeedCache::Sqlite(storage) => storage.cache_set(key, items).await,
            FeedCache::Memory(memory) => {
                memory.set(key, items).await;
                Ok(())
            }
        }
    }

    /// Read the cached entry for a source, if any.
    pub async fn get(&self, key: &str) -> Result<Option<CachedFeed>> {
        match self {
            FeedCache::Sqlite(storage) => storage.cache_get(key).await,
            FeedCache::Memory(memory) => Ok(memory.get(key).await),
        }
    }

    /// Read cached entries for several sources; missing keys are skipped.
    pub async fn get_many(&self, keys: &[&str]) -> Result<Vec<CachedFeed>> {
        match self {
            FeedCache::Sqlite(storage) => storage.cache_get_many(keys).await,
            FeedCache::Memory(memory) => Ok(memory.get_many(keys).await),
        }
    }

    /// Drop the cached entry for a source.
    pub async fn delete(&self, key: &str) -> Result<()> {
        match self {
            FeedCache::Sqlite(storage) => storage.cache_delete(key).await,
            FeedCache::Memory(memory) => {
                memory.delete(key).await;
                Ok(())
            }
        }
    }
}

/// In-memory fallback cache.
pub struct MemoryFeedCache {
    entries: Mutex<HashMap<String, CachedFeed>>,
}

impl MemoryFeedCache {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    async fn set(&self, key: &str, items: &[FeedItem]) {
        let entry = CachedFeed {
            id: key.to_string(),
            updated: Utc::now().timestamp_millis(),
            items: items.to_vec(),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
    }

    async fn get(&self, key: &str) -> Option<CachedFeed> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn get_many(&self, keys: &[&str]) -> Vec<CachedFeed> {
        let entries = self.entries.lock().await;
        keys.iter()
            .filter_map(|key| entries.get(*key).cloned())
            .collect()
    }

    async fn delete(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }
}

impl Default for MemoryFeedCache {
    fn default() -> Self {
        Self::new()
    }
}
