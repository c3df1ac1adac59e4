//! Pluggable feed-source connectors and their closed registry.
//!
//! Each connector produces a normalized, newest-first list of [`FeedItem`]s
//! for one upstream site and fails when it cannot produce a single valid
//! item. The registry is resolved once at startup into an ordered
//! collection; there is no runtime plugin loading.

mod broadcaster;
mod cached;
mod newswire;

use async_trait::async_trait;

use briefcast_shared::{FeedItem, Result};

pub use broadcaster::BroadcasterSource;
pub use cached::{DEFAULT_FRESH_TTL_MS, fetch_with_cache};
pub use newswire::NewswireSource;

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// A feed-source connector for one upstream site.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Stable identifier, used as the cache key.
    fn id(&self) -> &'static str;

    /// Human-readable label for display.
    fn label(&self) -> &'static str;

    /// Produce the current item list, sorted by publish time descending.
    ///
    /// Must fail if no item passes the connector's own validity checks.
    async fn fetch(&self) -> Result<Vec<FeedItem>>;
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Holds the registered connectors in display order.
pub struct SourceRegistry {
    sources: Vec<Box<dyn FeedSource>>,
}

impl SourceRegistry {
    /// Create a registry with all built-in connectors.
    pub fn new() -> Result<Self> {
        Ok(Self {
            sources: vec![
                Box::new(NewswireSource::new()?),
                Box::new(BroadcasterSource::new()?),
            ],
        })
    }

    /// Look up a connector by identifier.
    pub fn get(&self, id: &str) -> Option<&dyn FeedSource> {
        self.sources
            .iter()
            .find(|source| source.id() == id)
            .map(|source| source.as_ref())
    }

    /// Iterate the connectors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn FeedSource> {
        self.sources.iter().map(|source| source.as_ref())
    }

    /// Identifiers of every registered connector.
    pub fn ids(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.id()).collect()
    }
}
