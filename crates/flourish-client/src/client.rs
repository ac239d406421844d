//! Rewrite service HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use flourish_protocols::error::RewriteError;
use flourish_protocols::rewrite::{ErrorBody, RewriteRequest, RewriteResponse, RewriteService};

/// Per-request deadline in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Total attempts per rewrite, including the first.
pub const MAX_ATTEMPTS: u32 = 2;

/// Pause between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 500;

/// HTTP client for the rewrite service.
pub struct RewriteClient {
    endpoint: String,
    client: reqwest::Client,
}

impl RewriteClient {
    /// Create a client for a service rooted at `base_url`.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            endpoint: format!("{}/rewrite", base_url.as_ref().trim_end_matches('/')),
            client: reqwest::Client::new(),
        }
    }

    async fn send_request(&self, request: &RewriteRequest) -> Result<RewriteResponse, RewriteError> {
        let response = self
            .client
            .post(&self.endpoint)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RewriteError::Timeout(REQUEST_TIMEOUT_SECS)
                } else {
                    RewriteError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorBody>(&text).ok();
            if status.is_client_error() {
                return Err(match detail {
                    Some(body) => RewriteError::Invalid {
                        code: body.error.code,
                        message: body.error.message,
                    },
                    None => RewriteError::Invalid {
                        code: format!("HTTP_{}", status.as_u16()),
                        message: text,
                    },
                });
            }
            let message = detail.map(|body| body.error.message).unwrap_or(text);
            return Err(RewriteError::Service {
                status: status.as_u16(),
                message,
            });
        }

        let body: RewriteResponse = response
            .json()
            .await
            .map_err(|e| RewriteError::Network(e.to_string()))?;
        Ok(body)
    }
}

#[async_trait]
impl RewriteService for RewriteClient {
    async fn rewrite(&self, request: RewriteRequest) -> Result<RewriteResponse, RewriteError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(attempt, len = request.text.len(), "sending rewrite request");
            match self.send_request(&request).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if !e.is_retryable() || attempt >= MAX_ATTEMPTS {
                        return Err(e);
                    }
                    warn!(attempt, error = %e, "rewrite attempt failed; retrying");
                    tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_from_base_url() {
        let client = RewriteClient::new("http://localhost:3001");
        assert_eq!(client.endpoint, "http://localhost:3001/rewrite");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = RewriteClient::new("http://localhost:3001/");
        assert_eq!(client.endpoint, "http://localhost:3001/rewrite");
    }

    mod http_tests {
        use super::*;
        use flourish_protocols::rewrite::{DEFAULT_MODE, codes};
        use wiremock::{Mock, MockServer, ResponseTemplate, matchers};

        #[tokio::test]
        async fn test_rewrite_success() {
            let mock_server = MockServer::start().await;

            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .and(matchers::body_partial_json(serde_json::json!({
                    "text": "hello",
                    "mode": DEFAULT_MODE,
                })))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"text": "Hark! Greetings!"})),
                )
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            assert_eq!(result.unwrap().text, "Hark! Greetings!");
        }

        #[tokio::test]
        async fn test_extra_options_reach_the_wire() {
            let mock_server = MockServer::start().await;

            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .and(matchers::body_partial_json(serde_json::json!({
                    "intensity": 3,
                })))
                .respond_with(
                    ResponseTemplate::new(200).set_body_json(serde_json::json!({"text": "ok"})),
                )
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let request = RewriteRequest::new("hello", "formal")
                .with_option("intensity", serde_json::json!(3));
            assert!(client.rewrite(request).await.is_ok());
        }

        #[tokio::test]
        async fn test_server_error_retried_once_then_succeeds() {
            let mock_server = MockServer::start().await;

            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
                .up_to_n_times(1)
                .expect(1)
                .mount(&mock_server)
                .await;
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(serde_json::json!({"text": "second time lucky"})),
                )
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            assert_eq!(result.unwrap().text, "second time lucky");
        }

        #[tokio::test]
        async fn test_persistent_server_error_stops_after_two_attempts() {
            let mock_server = MockServer::start().await;

            let error_body = serde_json::json!({
                "error": {"code": codes::PROVIDER_ERROR, "message": "AI provider failed."}
            });
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(ResponseTemplate::new(500).set_body_json(&error_body))
                .expect(2)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            match result.unwrap_err() {
                RewriteError::Service { status, message } => {
                    assert_eq!(status, 500);
                    assert_eq!(message, "AI provider failed.");
                }
                other => panic!("expected Service error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_client_error_is_never_retried() {
            let mock_server = MockServer::start().await;

            let error_body = serde_json::json!({
                "error": {"code": codes::INVALID_INPUT, "message": "Text and mode are required."}
            });
            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client.rewrite(RewriteRequest::new("", DEFAULT_MODE)).await;
            match result.unwrap_err() {
                RewriteError::Invalid { code, message } => {
                    assert_eq!(code, codes::INVALID_INPUT);
                    assert!(message.contains("required"));
                }
                other => panic!("expected Invalid error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_client_error_without_body_still_final() {
            let mock_server = MockServer::start().await;

            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
                .expect(1)
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            match result.unwrap_err() {
                RewriteError::Invalid { code, .. } => assert_eq!(code, "HTTP_404"),
                other => panic!("expected Invalid error, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn test_connection_refused_maps_to_network_error() {
            // Bind-then-drop gives a port that nothing is listening on.
            // A non-pooled server is required: pooled servers from
            // MockServer::start() keep listening after drop.
            let mock_server = MockServer::builder().start().await;
            let uri = mock_server.uri();
            drop(mock_server);

            let client = RewriteClient::new(uri);
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            assert!(matches!(result.unwrap_err(), RewriteError::Network(_)));
        }

        #[tokio::test]
        async fn test_malformed_success_body_is_an_error() {
            let mock_server = MockServer::start().await;

            Mock::given(matchers::method("POST"))
                .and(matchers::path("/rewrite"))
                .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
                .mount(&mock_server)
                .await;

            let client = RewriteClient::new(mock_server.uri());
            let result = client
                .rewrite(RewriteRequest::new("hello", DEFAULT_MODE))
                .await;
            assert!(matches!(result.unwrap_err(), RewriteError::Network(_)));
        }
    }
}
