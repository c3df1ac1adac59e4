//! Layered configuration resolver.
//!
//! Two independent read sources feed one effective runtime configuration:
//! the persisted singleton row (when a backing store exists) and the
//! environment. Precedence is field-by-field: persisted value if present,
//! else environment value, else a hardcoded default for the two fields that
//! have one (base URL and model).
//!
//! Provenance rules:
//! - `persisted` whenever any persisted row exists, even partially populated
//! - `environment` only when no row exists and at least one env field is set
//! - `none` otherwise

use std::path::Path;

use briefcast_shared::{
    ApiConfig, ConfigSnapshot, ConfigSource, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, Result,
    RuntimeConfig, env_config, store_path,
};
use briefcast_storage::Storage;

// ---------------------------------------------------------------------------
// Pure merge functions
// ---------------------------------------------------------------------------

/// Compute the snapshot for a given pair of read results.
///
/// The snapshot surfaces the persisted row when one exists; otherwise the
/// environment config, but only when it actually carries a value.
pub fn build_snapshot(
    persisted: Option<ApiConfig>,
    environment: ApiConfig,
    store_exists: bool,
) -> ConfigSnapshot {
    let source = match (&persisted, environment.has_any_value()) {
        (Some(_), _) => ConfigSource::Persisted,
        (None, true) => ConfigSource::Environment,
        (None, false) => ConfigSource::None,
    };

    let config = match source {
        ConfigSource::Persisted => persisted,
        ConfigSource::Environment => Some(environment),
        ConfigSource::None => None,
    };

    ConfigSnapshot {
        config,
        source,
        store_exists,
    }
}

/// Merge persisted and environment configs into the effective runtime view.
///
/// Field-by-field null-coalescing, with the guarantee that base URL and
/// model are never empty in the result.
pub fn merge_runtime(persisted: Option<&ApiConfig>, environment: &ApiConfig) -> RuntimeConfig {
    let pick = |persisted_value: Option<&String>, env_value: Option<&String>| {
        persisted_value.or(env_value).cloned()
    };

    let source = if persisted.is_some() {
        ConfigSource::Persisted
    } else if environment.has_any_value() {
        ConfigSource::Environment
    } else {
        ConfigSource::None
    };

    RuntimeConfig {
        search_api_key: pick(
            persisted.and_then(|c| c.search_api_key.as_ref()),
            environment.search_api_key.as_ref(),
        ),
        reader_api_key: pick(
            persisted.and_then(|c| c.reader_api_key.as_ref()),
            environment.reader_api_key.as_ref(),
        ),
        llm_api_key: pick(
            persisted.and_then(|c| c.llm_api_key.as_ref()),
            environment.llm_api_key.as_ref(),
        ),
        llm_base_url: pick(
            persisted.and_then(|c| c.llm_base_url.as_ref()),
            environment.llm_base_url.as_ref(),
        )
        .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
        llm_model: pick(
            persisted.and_then(|c| c.llm_model.as_ref()),
            environment.llm_model.as_ref(),
        )
        .unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
        updated_at: persisted.and_then(|c| c.updated_at),
        source,
    }
}

// ---------------------------------------------------------------------------
// Store-backed operations
// ---------------------------------------------------------------------------

/// Read the persisted row from an explicit store path.
///
/// A missing store file yields `None`; the store is never created on read.
pub async fn read_persisted(path: &Path) -> Result<Option<ApiConfig>> {
    match Storage::open_if_exists(path).await? {
        Some(storage) => storage.get_api_config().await,
        None => Ok(None),
    }
}

/// Resolve the current snapshot from the default store path and environment.
pub async fn snapshot() -> Result<ConfigSnapshot> {
    snapshot_from(&store_path()?).await
}

/// Resolve the current snapshot from an explicit store path.
pub async fn snapshot_from(path: &Path) -> Result<ConfigSnapshot> {
    let persisted = read_persisted(path).await?;
    Ok(build_snapshot(persisted, env_config(), path.exists()))
}

/// Resolve the effective runtime configuration from the default store path.
pub async fn resolve_runtime() -> Result<RuntimeConfig> {
    resolve_runtime_from(&store_path()?).await
}

/// Resolve the effective runtime configuration from an explicit store path.
pub async fn resolve_runtime_from(path: &Path) -> Result<RuntimeConfig> {
    let persisted = read_persisted(path).await?;
    Ok(merge_runtime(persisted.as_ref(), &env_config()))
}

/// Persist a configuration, creating the store on first write.
///
/// The singleton row is fully replaced; a successful save always resolves
/// to `persisted` provenance.
pub async fn save(config: &ApiConfig) -> Result<ConfigSnapshot> {
    save_to(&store_path()?, config).await
}

/// Persist a configuration to an explicit store path.
pub async fn save_to(path: &Path, config: &ApiConfig) -> Result<ConfigSnapshot> {
    let storage = Storage::open(path).await?;
    let saved = storage.save_api_config(config).await?;
    tracing::info!(path = %path.display(), "configuration saved");

    Ok(ConfigSnapshot {
        config: Some(saved),
        source: ConfigSource::Persisted,
        store_exists: true,
    })
}
