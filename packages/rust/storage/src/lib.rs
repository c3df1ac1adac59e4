//! libSQL storage layer for briefcast.
//!
//! The [`Storage`] struct wraps a local libSQL database holding the singleton
//! API-configuration row and the feed cache. [`FeedCache`] layers the
//! two-variant cache capability (persistent store or in-memory map) on top.
//!
//! **Access rules:**
//! - Reads of the config row never create the store ([`Storage::open_if_exists`])
//! - Saves create the store and schema on first write ([`Storage::open`])

mod cache;
mod migrations;

use std::path::Path;

use chrono::Utc;
use libsql::{Connection, Database, params};

use briefcast_shared::{ApiConfig, BriefcastError, CachedFeed, FeedItem, Result};

pub use cache::{FeedCache, MemoryFeedCache};

/// Fixed key of the singleton configuration row.
const CONFIG_ROW_ID: &str = "default";

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path` and apply pending migrations.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| BriefcastError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.run_migrations().await?;
        Ok(storage)
    }

    /// Open the database only if the backing file already exists.
    ///
    /// Reads must never create the store, so this returns `None` for a
    /// missing file instead of materializing an empty schema.
    pub async fn open_if_exists(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(Self::open(path).await?))
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    BriefcastError::Storage(format!(
                        "migration v{} failed: {e}",
                        migration.version
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    // -----------------------------------------------------------------------
    // API config singleton
    // -----------------------------------------------------------------------

    /// Read the singleton configuration row, if one has ever been saved.
    pub async fn get_api_config(&self) -> Result<Option<ApiConfig>> {
        let mut rows = self
            .conn
            .query(
                "SELECT search_api_key, reader_api_key, llm_api_key, llm_base_url, llm_model, updated
                 FROM api_config WHERE id = ?1",
                params![CONFIG_ROW_ID],
            )
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(ApiConfig {
                search_api_key: normalize_value(row.get::<String>(0).ok()),
                reader_api_key: normalize_value(row.get::<String>(1).ok()),
                llm_api_key: normalize_value(row.get::<String>(2).ok()),
                llm_base_url: normalize_value(row.get::<String>(3).ok()),
                llm_model: normalize_value(row.get::<String>(4).ok()),
                updated_at: row.get::<i64>(5).ok(),
            })),
            Ok(None) => Ok(None),
            Err(e) => Err(BriefcastError::Storage(e.to_string())),
        }
    }

    /// Fully replace the singleton configuration row.
    ///
    /// Every column is overwritten with the provided value (or NULL), so a
    /// save with partial fields clears the omitted ones. Returns the stored
    /// config stamped with the write timestamp.
    pub async fn save_api_config(&self, config: &ApiConfig) -> Result<ApiConfig> {
        let now = Utc::now().timestamp_millis();
        let normalized = ApiConfig {
            search_api_key: normalize_value(config.search_api_key.clone()),
            reader_api_key: normalize_value(config.reader_api_key.clone()),
            llm_api_key: normalize_value(config.llm_api_key.clone()),
            llm_base_url: normalize_value(config.llm_base_url.clone()),
            llm_model: normalize_value(config.llm_model.clone()),
            updated_at: Some(now),
        };

        self.conn
            .execute(
                "INSERT INTO api_config (id, search_api_key, reader_api_key, llm_api_key, llm_base_url, llm_model, updated)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(id) DO UPDATE SET
                   search_api_key = excluded.search_api_key,
                   reader_api_key = excluded.reader_api_key,
                   llm_api_key = excluded.llm_api_key,
                   llm_base_url = excluded.llm_base_url,
                   llm_model = excluded.llm_model,
                   updated = excluded.updated",
                params![
                    CONFIG_ROW_ID,
                    normalized.search_api_key.as_deref(),
                    normalized.reader_api_key.as_deref(),
                    normalized.llm_api_key.as_deref(),
                    normalized.llm_base_url.as_deref(),
                    normalized.llm_model.as_deref(),
                    now,
                ],
            )
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;

        Ok(normalized)
    }

    // -----------------------------------------------------------------------
    // Feed cache table
    // -----------------------------------------------------------------------

    /// Store (or replace) the cached items for a feed source.
    pub async fn cache_set(&self, key: &str, items: &[FeedItem]) -> Result<()> {
        let now = Utc::now().timestamp_millis();
        let data = serde_json::to_string(items)
            .map_err(|e| BriefcastError::Storage(format!("cache payload encode: {e}")))?;

        self.conn
            .execute(
                "INSERT OR REPLACE INTO feed_cache (id, updated, data) VALUES (?1, ?2, ?3)",
                params![key, now, data.as_str()],
            )
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;
        tracing::debug!(key, count = items.len(), "feed cache updated");
        Ok(())
    }

    /// Read the cached items for a feed source, if any.
    pub async fn cache_get(&self, key: &str) -> Result<Option<CachedFeed>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, updated, data FROM feed_cache WHERE id = ?1",
                params![key],
            )
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_cached_feed(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(BriefcastError::Storage(e.to_string())),
        }
    }

    /// Read cached entries for several sources, in the order they were asked for.
    ///
    /// Missing keys are simply absent from the result.
    pub async fn cache_get_many(&self, keys: &[&str]) -> Result<Vec<CachedFeed>> {
        let mut results = Vec::new();
        for key in keys {
            if let Some(entry) = self.cache_get(key).await? {
                results.push(entry);
            }
        }
        Ok(results)
    }

    /// Drop the cached entry for a feed source.
    pub async fn cache_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM feed_cache WHERE id = ?1", params![key])
            .await
            .map_err(|e| BriefcastError::Storage(e.to_string()))?;
        Ok(())
    }
}

/// Trim a stored value, treating blank text the same as NULL.
fn normalize_value(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Convert a database row to a [`CachedFeed`].
fn row_to_cached_feed(row: &libsql::Row) -> Result<CachedFeed> {
    let id: String = row
        .get(0)
        .map_err(|e| BriefcastError::Storage(e.to_string()))?;
    let updated: i64 = row
        .get(1)
        .map_err(|e| BriefcastError::Storage(e.to_string()))?;
    let data: String = row
        .get(2)
        .map_err(|e| BriefcastError::Storage(e.to_string()))?;
    let items: Vec<FeedItem> = serde_json::from_str(&data)
        .map_err(|e| BriefcastError::Storage(format!("cache payload decode: {e}")))?;

    Ok(CachedFeed { id, updated, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn item(id: &str, title: &str) -> FeedItem {
        FeedItem {
            id: id.into(),
            title: title.into(),
            url: format!("https://example.com/{id}"),
            mobile_url: None,
            published_at: Some(1_700_000_000_000),
        }
    }

    #[tokio::test]
    async fn open_and_migrate() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::open(&dir.path().join("test.db")).await.expect("open");
        assert_eq!(storage.schema_version().await, 1);
    }

    #[tokio::test]
    async fn idempotent_migration() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("test.db");
        let s1 = Storage::open(&path).await.expect("first open");
        drop(s1);
        let s2 = Storage::open(&path).await.expect("second open");
        assert_eq!(s2.schema_version().await, 1);
    }

    #[tokio::test]
    async fn open_if_exists_never_creates_the_store() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("missing.db");

        let opened = Storage::open_if_exists(&path).await.expect("open_if_exists");
        assert!(opened.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn config_roundtrip_and_full_replace() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::open(&dir.path().join("test.db")).await.expect("open");

        assert!(storage.get_api_config().await.expect("read").is_none());

        let saved = storage
            .save_api_config(&ApiConfig {
                search_api_key: Some("serp-key".into()),
                llm_api_key: Some("llm-key".into()),
                ..ApiConfig::default()
            })
            .await
            .expect("save");
        assert!(saved.updated_at.is_some());

        let stored = storage.get_api_config().await.expect("read").expect("row");
        assert_eq!(stored.search_api_key.as_deref(), Some("serp-key"));
        assert_eq!(stored.llm_api_key.as_deref(), Some("llm-key"));
        assert!(stored.llm_model.is_none());

        // A second save replaces the whole row; omitted fields are cleared.
        storage
            .save_api_config(&ApiConfig {
                llm_model: Some("deepseek-chat".into()),
                ..ApiConfig::default()
            })
            .await
            .expect("replace");

        let stored = storage.get_api_config().await.expect("read").expect("row");
        assert!(stored.search_api_key.is_none());
        assert_eq!(stored.llm_model.as_deref(), Some("deepseek-chat"));
    }

    #[tokio::test]
    async fn blank_values_are_stored_as_absent() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::open(&dir.path().join("test.db")).await.expect("open");

        storage
            .save_api_config(&ApiConfig {
                search_api_key: Some("   ".into()),
                llm_api_key: Some("key".into()),
                ..ApiConfig::default()
            })
            .await
            .expect("save");

        let stored = storage.get_api_config().await.expect("read").expect("row");
        assert!(stored.search_api_key.is_none());
        assert_eq!(stored.llm_api_key.as_deref(), Some("key"));
    }

    #[tokio::test]
    async fn feed_cache_roundtrip() {
        let dir = TempDir::new().expect("tempdir");
        let storage = Storage::open(&dir.path().join("test.db")).await.expect("open");

        assert!(storage.cache_get("newswire").await.expect("miss").is_none());

        storage
            .cache_set("newswire", &[item("a", "First"), item("b", "Second")])
            .await
            .expect("set");

        let entry = storage.cache_get("newswire").await.expect("get").expect("hit");
        assert_eq!(entry.id, "newswire");
        assert_eq!(entry.items.len(), 2);
        assert_eq!(entry.items[0].title, "First");

        storage
            .cache_set("broadcaster", &[item("c", "Third")])
            .await
            .expect("set");

        let entries = storage
            .cache_get_many(&["newswire", "broadcaster", "unknown"])
            .await
            .expect("get_many");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "newswire");
        assert_eq!(entries[1].id, "broadcaster");

        storage.cache_delete("newswire").await.expect("delete");
        assert!(storage.cache_get("newswire").await.expect("miss").is_none());
    }
}
