//! Error types for recap.
//!
//! Library crates use [`RecapError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all recap operations.
#[derive(Debug, thiserror::Error)]
pub enum RecapError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error reaching a source.
    #[error("network error: {0}")]
    Network(String),

    /// Payload-shape error: an expected structural element is absent.
    #[error("payload error: {message}")]
    Shape { message: String },

    /// An embedded date string failed to parse.
    #[error("date error: {message}")]
    Date { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, RecapError>;

impl RecapError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a payload-shape error from any displayable message.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape {
            message: msg.into(),
        }
    }

    /// Create a date-parse error from any displayable message.
    pub fn date(msg: impl Into<String>) -> Self {
        Self::Date {
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
        let err = RecapError::config("notes token missing");
        assert_eq!(err.to_string(), "config error: notes token missing");

        let err = RecapError::shape("diary row without a title");
        assert!(err.to_string().contains("diary row"));

        let err = RecapError::date("byline date 'Smarch 1' did not parse");
        assert!(err.to_string().starts_with("date error:"));
    }
}
