//! Dependency status probing.
//!
//! One minimal live request per configured dependency, each bounded by the
//! client's probe timeout. A dependency with no credential is reported as
//! unreachable with a fixed message and no latency, without touching the
//! network. Probes are independent of each other; the report order is fixed:
//! search provider, content reader, generation model.

use std::time::Instant;

use chrono::Utc;

use briefcast_llm::ChatClient;
use briefcast_retrieval::{ReaderClient, SearchClient};
use briefcast_shared::{Result, RuntimeConfig, StatusRecord, StatusReport};

/// Probe all three dependencies and assemble the report.
pub async fn check_status(runtime: &RuntimeConfig) -> StatusReport {
    let (search, reader, llm) = tokio::join!(
        probe_search(runtime),
        probe_reader(runtime),
        probe_llm(runtime),
    );

    StatusReport {
        source: runtime.source,
        statuses: vec![search, reader, llm],
    }
}

async fn probe_search(runtime: &RuntimeConfig) -> StatusRecord {
    let Some(key) = runtime.search_api_key.as_deref() else {
        return missing_credential("search", "Search provider", "missing search API key");
    };

    let started = Instant::now();
    let outcome = match SearchClient::new(key) {
        Ok(client) => client.ping().await,
        Err(e) => Err(e),
    };
    probe_record("search", "Search provider", started, outcome)
}

async fn probe_reader(runtime: &RuntimeConfig) -> StatusRecord {
    let Some(key) = runtime.reader_api_key.as_deref() else {
        return missing_credential("reader", "Content reader", "missing reader API key");
    };

    let started = Instant::now();
    let outcome = match ReaderClient::new(key) {
        Ok(client) => client.ping().await,
        Err(e) => Err(e),
    };
    probe_record("reader", "Content reader", started, outcome)
}

async fn probe_llm(runtime: &RuntimeConfig) -> StatusRecord {
    let Some(key) = runtime.llm_api_key.as_deref() else {
        return missing_credential("llm", "Generation model", "missing generation API key");
    };

    let started = Instant::now();
    let outcome = match ChatClient::new(key, &runtime.llm_base_url, &runtime.llm_model) {
        Ok(client) => client.ping().await,
        Err(e) => Err(e),
    };
    probe_record("llm", "Generation model", started, outcome)
}

/// Record for a dependency whose probe was skipped outright.
fn missing_credential(id: &str, label: &str, message: &str) -> StatusRecord {
    StatusRecord {
        id: id.to_string(),
        label: label.to_string(),
        ok: false,
        latency_ms: None,
        checked_at: Utc::now().timestamp_millis(),
        message: message.to_string(),
    }
}

/// Record for a probe that actually ran, successful or not.
fn probe_record(id: &str, label: &str, started: Instant, outcome: Result<()>) -> StatusRecord {
    let latency_ms = started.elapsed().as_millis() as u64;
    let (ok, message) = match outcome {
        Ok(()) => (true, "reachable".to_string()),
        Err(e) => (false, e.to_string()),
    };

    if !ok {
        tracing::warn!(dependency = id, %message, "dependency probe failed");
    }

    StatusRecord {
        id: id.to_string(),
        label: label.to_string(),
        ok,
        latency_ms: Some(latency_ms),
        checked_at: Utc::now().timestamp_millis(),
        message,
    }
}
