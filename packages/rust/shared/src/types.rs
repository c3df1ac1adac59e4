//! Core domain types for briefcast briefings.

use serde::{Deserialize, Serialize};

/// Word budget per minute of briefing time, used to derive section targets.
pub const WORDS_PER_MINUTE: f64 = 260.0;

// ---------------------------------------------------------------------------
// Section catalog types
// ---------------------------------------------------------------------------

/// A named search query attached to a section template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Stable query identifier within the section.
    pub id: String,
    /// Human-readable label, recorded as the origin of results it produces.
    pub label: String,
    /// The query string handed to the search provider verbatim.
    pub query: String,
}

/// Immutable catalog entry describing one briefing section.
///
/// Templates are defined once at process start and only ever read afterwards;
/// requests adjust them through [`SectionOverride`], never in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionTemplate {
    /// Stable section identifier.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Default spoken duration in minutes.
    pub duration_minutes: f64,
    /// Default prompt text used when the request supplies none.
    pub default_prompt: String,
    /// Recommended upstream outlets, surfaced to operators for context.
    pub recommended_sources: Vec<String>,
    /// Search queries issued in declared order when gathering context.
    pub search_queries: Vec<SearchQuery>,
    /// Explicit word target; when absent the target derives from duration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_words: Option<u32>,
}

/// Per-request adjustment of a single section, partial by field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionOverride {
    /// Identifier of the template this override targets.
    pub id: String,
    /// Replacement prompt; whitespace-only text counts as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Replacement duration in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
}

/// A template merged with at most one override, ready for generation.
#[derive(Debug, Clone)]
pub struct SectionRuntime {
    /// The catalog entry this runtime resolves, borrowed for the process
    /// lifetime (the catalog is static and never copied per request).
    pub template: &'static SectionTemplate,
    /// Resolved prompt text.
    pub prompt: String,
    /// Resolved duration in minutes.
    pub duration_minutes: f64,
    /// Resolved word target, always derived deterministically.
    pub target_words: u32,
}

// ---------------------------------------------------------------------------
// Retrieval types
// ---------------------------------------------------------------------------

/// Whether a generation request performs web retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Search the web and extract source bodies before generating.
    #[default]
    Web,
    /// Generate from the section prompt alone, no network retrieval.
    Skip,
}

/// One deduplicated search result, optionally hydrated with extracted body text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedSource {
    pub title: String,
    /// Canonical URL; unique within one section's context.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// Label of the query that first produced this URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Extracted body text; absent when extraction failed or was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A section runtime plus everything gathered for it.
#[derive(Debug, Clone)]
pub struct SectionContext {
    pub runtime: SectionRuntime,
    /// Capped, deduplicated source list (empty when retrieval was skipped).
    pub sources: Vec<RetrievedSource>,
    /// Every query string that was attempted, successful or not.
    pub used_queries: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generation result types
// ---------------------------------------------------------------------------

/// A cited source in a finished section, stripped of body text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reference {
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// One generated briefing section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionResult {
    pub id: String,
    pub title: String,
    pub duration_minutes: f64,
    pub target_words: u32,
    /// The generated briefing text.
    pub content: String,
    pub references: Vec<Reference>,
    pub used_queries: Vec<String>,
}

/// Inbound generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingRequest {
    /// Optional per-section overrides; unknown identifiers are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<SectionOverride>>,
    /// Retrieval mode; defaults to [`SearchMode::Web`] when unspecified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_mode: Option<SearchMode>,
}

/// Outbound generation response, sections in template order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BriefingResponse {
    pub sections: Vec<SectionResult>,
    /// The search mode actually used.
    pub search_mode: SearchMode,
}

// ---------------------------------------------------------------------------
// Configuration types
// ---------------------------------------------------------------------------

/// The five provider credentials, each optional, as stored or read from env.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reader_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_model: Option<String>,
    /// Millisecond timestamp of the last persisted save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl ApiConfig {
    /// A config counts as present only when at least one field carries a value.
    pub fn has_any_value(&self) -> bool {
        self.search_api_key.is_some()
            || self.reader_api_key.is_some()
            || self.llm_api_key.is_some()
            || self.llm_base_url.is_some()
            || self.llm_model.is_some()
    }
}

/// Which configuration source is currently effective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// A persisted row exists, even a partially populated one.
    Persisted,
    /// No persisted row; at least one environment field is set.
    Environment,
    /// Neither store nor environment provides any value.
    None,
}

/// Resolved configuration view plus its provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<ApiConfig>,
    pub source: ConfigSource,
    /// Whether a backing store file exists on disk.
    pub store_exists: bool,
}

/// The effective runtime configuration used by generation and probing.
///
/// Merged field-by-field: persisted value if present, else environment,
/// else the hardcoded default (base URL and model only).
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub search_api_key: Option<String>,
    pub reader_api_key: Option<String>,
    pub llm_api_key: Option<String>,
    /// Never empty; falls back to the provider default.
    pub llm_base_url: String,
    /// Never empty; falls back to the provider default.
    pub llm_model: String,
    pub updated_at: Option<i64>,
    pub source: ConfigSource,
}

// ---------------------------------------------------------------------------
// Status probe types
// ---------------------------------------------------------------------------

/// Outcome of probing one external dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRecord {
    /// Dependency identifier: `search`, `reader`, or `llm`.
    pub id: String,
    /// Human label for display.
    pub label: String,
    pub ok: bool,
    /// Wall-clock latency; absent when the probe was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Millisecond timestamp of the check.
    pub checked_at: i64,
    pub message: String,
}

/// Full status report: provenance plus one record per dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub source: ConfigSource,
    /// Fixed order: search provider, content reader, generation model.
    pub statuses: Vec<StatusRecord>,
}

// ---------------------------------------------------------------------------
// Feed types
// ---------------------------------------------------------------------------

/// One normalized item produced by a feed-source connector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    /// Stable upstream identifier (falls back to the URL).
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_url: Option<String>,
    /// Millisecond publish timestamp when the upstream exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<i64>,
}

/// A cached feed result: the source key, items, and refresh timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedFeed {
    pub id: String,
    /// Millisecond timestamp of the last refresh.
    pub updated: i64,
    pub items: Vec<FeedItem>,
}
