//! Error types for scrollstream
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for scrollstream
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    // ============================================================================
    // Request Construction Errors
    // ============================================================================
    #[error("Invalid request: {message}")]
    Request { message: String },

    // ============================================================================
    // Response Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Search service reported an error: {reason}")]
    Service { reason: String },
}

impl Error {
    /// Create a request construction error
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a service error from the reason reported in a response body
    pub fn service(reason: impl Into<String>) -> Self {
        Self::Service {
            reason: reason.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for scrollstream
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::request("index name is empty");
        assert_eq!(err.to_string(), "Invalid request: index name is empty");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::service("all shards failed");
        assert_eq!(
            err.to_string(),
            "Search service reported an error: all shards failed"
        );
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::http_status(408, "").is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(401, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::request("bad target").is_retryable());
        assert!(!Error::service("parse failure").is_retryable());
        assert!(!Error::MaxRetriesExceeded { max_retries: 3 }.is_retryable());
    }
}
