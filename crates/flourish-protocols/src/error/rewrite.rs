//! Rewrite service errors.

use thiserror::Error;

/// Errors produced by the rewrite client and server.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The request was rejected by the service (HTTP 4xx). Never retried.
    #[error("Invalid request: {code}: {message}")]
    Invalid { code: String, message: String },

    /// The service failed (HTTP 5xx).
    #[error("Service error: {status} - {message}")]
    Service { status: u16, message: String },

    /// The upstream text-generation provider failed.
    #[error("Provider error: {0}")]
    Provider(String),

    /// Transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded the client-side deadline.
    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl RewriteError {
    /// Whether a single bounded retry is allowed for this failure.
    ///
    /// 4xx responses carry a verdict on the request itself and are final;
    /// everything else is treated as transient.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, RewriteError::Invalid { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_is_not_retryable() {
        let err = RewriteError::Invalid {
            code: "INVALID_INPUT".to_string(),
            message: "Text and mode are required.".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("INVALID_INPUT"));
    }

    #[test]
    fn test_service_error_is_retryable() {
        let err = RewriteError::Service {
            status: 502,
            message: "Bad Gateway".to_string(),
        };
        assert!(err.is_retryable());
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_network_error_is_retryable() {
        let err = RewriteError::Network("connection refused".to_string());
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Network error"));
    }

    #[test]
    fn test_timeout_is_retryable() {
        let err = RewriteError::Timeout(10);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_provider_error_display() {
        let err = RewriteError::Provider("AI provider failed.".to_string());
        assert!(err.to_string().contains("Provider error"));
    }
}
