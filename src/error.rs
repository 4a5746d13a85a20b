//! Error types for July Paging
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Every error belongs to one [`ErrorKind`]. The paginator uses the kind to
//! decide whether a failed `fetch_more` leaves it `failed` (transient) or
//! untouched (configuration). Any response from the server, including a
//! non-success status, is transient; configuration errors are raised locally
//! before a request goes out.

use thiserror::Error;

/// The main error type for July Paging
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Invalid query parameter '{param}': {message}")]
    InvalidQuery { param: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Response from generation {issued} discarded, paginator is at generation {current}")]
    Superseded { issued: u64, current: u64 },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),

    /// Raised by custom [`ListTransport`](crate::transport::ListTransport) implementations
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network or server failure; retrying the same request may succeed
    Transient,
    /// Malformed endpoint, query or configuration; retrying will not help
    Configuration,
    /// A response arrived for a paginator generation that has since been reset
    Superseded,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid query parameter error
    pub fn invalid_query(param: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            param: param.into(),
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

    /// Create an application-level API error
    pub fn api(code: i64, message: impl Into<String>) -> Self {
        Self::Api {
            code,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::InvalidQuery { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => ErrorKind::Configuration,
            Error::Superseded { .. } => ErrorKind::Superseded,
            _ => ErrorKind::Transient,
        }
    }

    /// Check if this error is transient
    pub fn is_transient(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Check if this error is a configuration error
    pub fn is_configuration(&self) -> bool {
        self.kind() == ErrorKind::Configuration
    }

    /// Check if this error is a stale-generation discard
    pub fn is_superseded(&self) -> bool {
        self.kind() == ErrorKind::Superseded
    }

    /// Check if the HTTP layer should retry this error
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for July Paging
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::invalid_query("page", "reserved for pagination");
        assert_eq!(
            err.to_string(),
            "Invalid query parameter 'page': reserved for pagination"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::api(1001, "参数错误");
        assert_eq!(err.to_string(), "API error 1001: 参数错误");
    }

    #[test_case(400 => ErrorKind::Transient ; "bad request")]
    #[test_case(401 => ErrorKind::Transient ; "unauthorized")]
    #[test_case(403 => ErrorKind::Transient ; "forbidden")]
    #[test_case(404 => ErrorKind::Transient ; "not found")]
    #[test_case(408 => ErrorKind::Transient ; "request timeout")]
    #[test_case(429 => ErrorKind::Transient ; "too many requests")]
    #[test_case(500 => ErrorKind::Transient ; "internal error")]
    #[test_case(503 => ErrorKind::Transient ; "unavailable")]
    fn test_status_kind(status: u16) -> ErrorKind {
        Error::http_status(status, "").kind()
    }

    #[test]
    fn test_kind_classification() {
        assert!(Error::config("x").is_configuration());
        assert!(Error::invalid_query("tag", "empty key").is_configuration());
        assert!(Error::api(1, "failed").is_transient());
        assert!(Error::decode("not json").is_transient());
        assert!(Error::Timeout { timeout_ms: 10 }.is_transient());
        assert!(Error::from(anyhow::anyhow!("socket closed")).is_transient());
        assert!(Error::Superseded {
            issued: 0,
            current: 1
        }
        .is_superseded());
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(429, "").is_retryable());
        assert!(Error::http_status(500, "").is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::http_status(404, "").is_retryable());
        assert!(!Error::api(1, "").is_retryable());
        assert!(!Error::config("test").is_retryable());
    }
}
