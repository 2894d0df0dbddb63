//! Error types for SalesAgent.
//!
//! Library crates use [`SalesAgentError`] via `thiserror`.
//! App crates (cli/tui) wrap this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all SalesAgent operations.
#[derive(Debug, thiserror::Error)]
pub enum SalesAgentError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Lead ledger read/write error (CSV encoding or decoding).
    #[error("ledger error at {path:?}: {message}")]
    Ledger { path: PathBuf, message: String },

    /// Vector index database error.
    #[error("storage error: {0}")]
    Storage(String),

    /// The vector index could not be opened for querying.
    #[error("could not open the catalog index: {0}. Run `salesagent ingest` first.")]
    IndexUnavailable(String),

    /// Embedding/chat provider error (HTTP, API, or response decoding).
    #[error("provider error: {0}")]
    Provider(String),

    /// Catalog or response parsing error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Rejected user input (empty question, missing product name, ...).
    #[error("{message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SalesAgentError>;

impl SalesAgentError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
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

    /// Create a ledger error for the ledger file at `path`.
    pub fn ledger(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::Ledger {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Whether this error came from rejected user input rather than a failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = SalesAgentError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = SalesAgentError::validation("Type a question first.");
        assert_eq!(err.to_string(), "Type a question first.");
        assert!(err.is_validation());
    }

    #[test]
    fn index_unavailable_mentions_ingest() {
        let err = SalesAgentError::IndexUnavailable("no such file".into());
        let msg = err.to_string();
        assert!(msg.contains("no such file"));
        assert!(msg.contains("salesagent ingest"));
    }

    #[test]
    fn io_error_carries_path() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = SalesAgentError::io("/readonly/leads.csv", source);
        assert!(err.to_string().contains("/readonly/leads.csv"));
        assert!(!err.is_validation());
    }
}
