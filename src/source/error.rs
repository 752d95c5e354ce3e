//! Error types for the search API source.
//!
//! Every variant carries the URL that failed so the "skip this unit and
//! continue" log lines in the collection and fetch phases stay actionable.

use thiserror::Error;

/// Errors that can occur while talking to the notice search API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error requesting {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout requesting {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Non-success HTTP response.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body could not be interpreted as the expected JSON shape.
    #[error("malformed response from {url}: {reason}")]
    Malformed {
        /// The URL whose payload was rejected.
        url: String,
        /// What was wrong with the payload.
        reason: String,
    },

    /// The source URL could not be built.
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL string.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

impl SourceError {
    /// Creates a transport error, folding reqwest timeouts into [`SourceError::Timeout`].
    pub fn transport(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-payload error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates an invalid URL error.
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidUrl { url: url.into() }
    }

    /// Short, stable label for structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Timeout { .. } => "timeout",
            Self::HttpStatus { .. } => "http_status",
            Self::Malformed { .. } => "malformed",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::ClientBuild { .. } => "client_build",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_timeout_display() {
        let error = SourceError::timeout("https://api.example.com/notices");
        assert!(error.to_string().contains("timeout"));
        assert!(error.to_string().contains("https://api.example.com/notices"));
        assert_eq!(error.kind(), "timeout");
    }

    #[test]
    fn test_source_error_http_status_display() {
        let error = SourceError::http_status("https://api.example.com/notices", 403);
        let msg = error.to_string();
        assert!(msg.contains("403"), "Expected '403' in: {msg}");
        assert_eq!(error.kind(), "http_status");
    }

    #[test]
    fn test_source_error_malformed_display() {
        let error = SourceError::malformed("https://api.example.com/x", "expected a JSON object");
        let msg = error.to_string();
        assert!(msg.contains("malformed"));
        assert!(msg.contains("expected a JSON object"));
        assert_eq!(error.kind(), "malformed");
    }
}
