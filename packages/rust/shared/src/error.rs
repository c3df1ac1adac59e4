//! Error types for briefcast.
//!
//! Library crates use [`BriefcastError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all briefcast operations.
#[derive(Debug, thiserror::Error)]
pub enum BriefcastError {
    /// Configuration loading or validation error (missing credential, bad path).
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error talking to an upstream provider.
    #[error("network error: {0}")]
    Network(String),

    /// Fatal generation failure (empty or malformed model response).
    #[error("generation error: {0}")]
    Generation(String),

    /// Database or storage layer error.
    #[error("storage error: {0}")]
    Storage(String),

    /// Data validation error (malformed request, empty feed, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, BriefcastError>;

impl BriefcastError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = BriefcastError::config("generation API key is not configured");
        assert_eq!(
            err.to_string(),
            "config error: generation API key is not configured"
        );

        let err = BriefcastError::Generation("model returned an empty completion".into());
        assert!(err.to_string().contains("empty completion"));
    }
}
