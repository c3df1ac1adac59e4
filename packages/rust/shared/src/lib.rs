//! Shared types, error model, and configuration helpers for briefcast.
//!
//! This crate is the foundation depended on by all other briefcast crates.
//! It provides:
//! - [`BriefcastError`] — the unified error type
//! - Domain types ([`SectionTemplate`], [`SectionResult`], [`ApiConfig`], ...)
//! - The static section catalog and environment/path helpers

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use catalog::{section_templates, template_by_id};
pub use config::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, cache_enabled, env_config, read_env, store_path,
};
pub use error::{BriefcastError, Result};
pub use types::{
    ApiConfig, BriefingRequest, BriefingResponse, CachedFeed, ConfigSnapshot, ConfigSource,
    FeedItem, Reference, RetrievedSource, RuntimeConfig, SearchMode, SearchQuery, SectionContext,
    SectionOverride, SectionResult, SectionRuntime, SectionTemplate, StatusRecord, StatusReport,
    WORDS_PER_MINUTE,
};
