//! Environment-derived configuration and store-path resolution.
//!
//! The persisted store lives at `~/.briefcast/briefcast.db` unless
//! `BRIEFCAST_DB_PATH` points elsewhere. Credential variables are read with
//! trim-and-drop-empty semantics: a blank value is the same as unset.

use std::path::PathBuf;

use crate::error::{BriefcastError, Result};
use crate::types::ApiConfig;

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".briefcast";

/// Default store file name.
const STORE_FILE_NAME: &str = "briefcast.db";

/// Environment variable names for the five credentials.
pub const ENV_SEARCH_API_KEY: &str = "BRIEFCAST_SEARCH_API_KEY";
pub const ENV_READER_API_KEY: &str = "BRIEFCAST_READER_API_KEY";
pub const ENV_LLM_API_KEY: &str = "BRIEFCAST_LLM_API_KEY";
pub const ENV_LLM_BASE_URL: &str = "BRIEFCAST_LLM_BASE_URL";
pub const ENV_LLM_MODEL: &str = "BRIEFCAST_LLM_MODEL";

/// Store path override and cache toggle.
pub const ENV_DB_PATH: &str = "BRIEFCAST_DB_PATH";
pub const ENV_ENABLE_CACHE: &str = "BRIEFCAST_ENABLE_CACHE";

/// Hardcoded fallbacks for the two fields that always resolve to a value.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.deepseek.com";
pub const DEFAULT_LLM_MODEL: &str = "deepseek-chat";

/// Read an environment variable, treating blank values as unset.
pub fn read_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Assemble an [`ApiConfig`] from the environment.
///
/// All five fields are optional; the result may be entirely empty, which
/// callers treat as "no environment configuration".
pub fn env_config() -> ApiConfig {
    ApiConfig {
        search_api_key: read_env(ENV_SEARCH_API_KEY),
        reader_api_key: read_env(ENV_READER_API_KEY),
        llm_api_key: read_env(ENV_LLM_API_KEY),
        llm_base_url: read_env(ENV_LLM_BASE_URL),
        llm_model: read_env(ENV_LLM_MODEL),
        updated_at: None,
    }
}

/// Resolve the path of the persisted configuration store.
pub fn store_path() -> Result<PathBuf> {
    if let Some(path) = read_env(ENV_DB_PATH) {
        return Ok(PathBuf::from(path));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| BriefcastError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME).join(STORE_FILE_NAME))
}

/// Whether the feed cache is enabled (`BRIEFCAST_ENABLE_CACHE=false` disables it).
pub fn cache_enabled() -> bool {
    read_env(ENV_ENABLE_CACHE).as_deref() != Some("false")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_env_drops_unset_variables() {
        // Deliberately unset variable name: reading it yields None.
        assert!(read_env("BRIEFCAST_TEST_NONEXISTENT_VAR_93471").is_none());
    }

    #[test]
    fn defaults_are_nonempty() {
        assert!(DEFAULT_LLM_BASE_URL.starts_with("https://"));
        assert!(!DEFAULT_LLM_MODEL.is_empty());
    }
}
