//! Error types for askweb.
//!
//! Library crates use [`AskWebError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all askweb operations.
#[derive(Debug, thiserror::Error)]
pub enum AskWebError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during search or an LLM call.
    #[error("network error: {0}")]
    Network(String),

    /// The search engine returned no usable results.
    #[error("no search results found for '{query}'")]
    NoResults { query: String },

    /// Every page failed or yielded no text.
    #[error("failed to extract content from the search results")]
    EmptyCorpus,

    /// Language-model request or response error.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The language model has no credentials configured.
    #[error("LLM unconfigured: {0}")]
    Unconfigured(String),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A setting is outside its allowed range.
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, AskWebError>;

impl AskWebError {
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

    /// Whether this error ends the whole run rather than a single page or question.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Llm(_) | Self::Unconfigured(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = AskWebError::config("missing endpoint");
        assert_eq!(err.to_string(), "config error: missing endpoint");

        let err = AskWebError::NoResults {
            query: "rust ownership".into(),
        };
        assert!(err.to_string().contains("rust ownership"));
    }

    #[test]
    fn llm_errors_are_not_fatal() {
        assert!(!AskWebError::Llm("HTTP 500".into()).is_fatal());
        assert!(!AskWebError::Unconfigured("no key".into()).is_fatal());
        assert!(AskWebError::EmptyCorpus.is_fatal());
        assert!(AskWebError::Cancelled.is_fatal());
    }
}
