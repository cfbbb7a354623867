//! Error types for wikiharvest operations.
//!
//! Most public operations in this crate degrade to empty results instead of
//! returning these errors; the `try_*` lookups and the transport layer surface
//! them so callers can decide whether a failure matters.
//!
//! # Example
//!
//! ```rust
//! use wikiharvest_core::{HarvestError, Result};
//!
//! fn first_paragraph(text: &str) -> Result<&str> {
//!     text.split("\n\n").next().filter(|p| !p.is_empty()).ok_or(HarvestError::NoContent)
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for retrieval, lookup and reporting operations.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// HTTP request errors from reqwest.
    ///
    /// Wraps network errors, DNS failures and connection problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided or built from configuration.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Upstream answered with a non-success status code.
    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { status: u16, url: String },

    /// Upstream payload did not have the expected shape.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// No article content could be assembled from any tier.
    #[error("Content not found")]
    NoContent,

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// File write errors.
    #[error("Failed to write to file: {0}")]
    WriteError(#[from] std::io::Error),

    /// Invalid client configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Locale profile files are missing or invalid.
    #[error("Locale profile error: {0}")]
    LocaleError(String),

    /// The external summarizer could not produce a paragraph.
    #[error("Summarizer failed: {0}")]
    Summarizer(String),
}

impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::MalformedResponse(err.to_string())
    }
}

impl From<regex::Error> for HarvestError {
    fn from(err: regex::Error) -> Self {
        HarvestError::LocaleError(err.to_string())
    }
}

/// Result type alias for HarvestError.
pub type Result<T> = std::result::Result<T, HarvestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvestError::InvalidUrl("not a url".to_string());
        assert!(err.to_string().contains("Invalid URL"));
    }

    #[test]
    fn test_upstream_status_error() {
        let err = HarvestError::UpstreamStatus { status: 503, url: "https://tr.wikipedia.org/w/api.php".to_string() };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("tr.wikipedia.org"));
    }

    #[test]
    fn test_timeout_error() {
        let err = HarvestError::Timeout { timeout: 10 };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_serde_error_is_malformed_response() {
        let err: HarvestError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, HarvestError::MalformedResponse(_)));
    }
}
