//! HTTP route definitions and handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use flourish_protocols::error::RewriteError;
use flourish_protocols::rewrite::{ErrorBody, RewriteRequest, RewriteResponse, codes};

use crate::upstream::UpstreamClient;

/// Build the service router.
///
/// ```text
/// POST /rewrite - Rewrite a draft in the requested style
/// GET  /health  - Liveness check
/// ```
///
/// CORS is wide open: callers are injected page scripts with unpredictable
/// origins.
pub fn create_router(upstream: Arc<UpstreamClient>) -> Router {
    Router::new()
        .route("/rewrite", post(handle_rewrite))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(upstream)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

fn error_response(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(ErrorBody::new(code, message))).into_response()
}

async fn handle_rewrite(
    State(upstream): State<Arc<UpstreamClient>>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    // Blank fields count as missing, same as absent ones.
    let request: Option<RewriteRequest> = serde_json::from_value(body).ok();
    let request = match request {
        Some(r) if !r.text.is_empty() && !r.mode.is_empty() => r,
        _ => {
            warn!("rewrite request rejected: text or mode missing");
            return error_response(
                StatusCode::BAD_REQUEST,
                codes::INVALID_INPUT,
                "Text and mode are required.",
            );
        }
    };

    // Draft content never reaches the logs, only metadata.
    info!(len = request.text.len(), mode = %request.mode, "processing rewrite");

    match upstream.rewrite(&request).await {
        Ok(text) => {
            info!(len = text.len(), "rewrite successful");
            (StatusCode::OK, Json(RewriteResponse { text })).into_response()
        }
        Err(RewriteError::Provider(message)) => {
            warn!(%message, "provider failure");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::PROVIDER_ERROR,
                "AI provider failed.",
            )
        }
        Err(e) => {
            warn!(error = %e, "rewrite failed");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                codes::INTERNAL_ERROR,
                "Internal server error.",
            )
        }
    }
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
