//! Rewrite wire format and the `RewriteService` seam.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RewriteError;

/// Default rewrite mode.
pub const DEFAULT_MODE: &str = "pompous_aristocratic_medieval_english";

/// Well-known error codes carried in [`ErrorDetail::code`].
pub mod codes {
    /// Required request fields missing or blank.
    pub const INVALID_INPUT: &str = "INVALID_INPUT";
    /// The upstream text-generation provider failed.
    pub const PROVIDER_ERROR: &str = "PROVIDER_ERROR";
    /// Unexpected server-side failure.
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Request body for `POST /rewrite`.
///
/// Extra options (e.g. `intensity`) ride alongside the two required fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub text: String,
    pub mode: String,
    #[serde(flatten)]
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl RewriteRequest {
    pub fn new(text: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: mode.into(),
            options: serde_json::Map::new(),
        }
    }

    /// Attach an extra passthrough option.
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(key.into(), value);
        self
    }
}

/// Success body for `POST /rewrite`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewriteResponse {
    pub text: String,
}

/// Structured error body: `{ "error": { "code": ..., "message": ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}

/// A text-transformation service.
///
/// Implemented by the HTTP client; the orchestrator only sees this trait so
/// tests can substitute a scripted fake.
#[async_trait]
pub trait RewriteService: Send + Sync {
    async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteResponse, RewriteError>;
}
