//! Bridge to an OpenAI-compatible chat-completions provider.

use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use flourish_protocols::error::RewriteError;
use flourish_protocols::rewrite::{DEFAULT_MODE, RewriteRequest};

const HTTP_REFERER: &str = "https://github.com/flourish-dev/flourish";
const X_TITLE: &str = "Flourish";

use crate::config::UpstreamConfig;

/// Wire format of a chat-completions call.
#[derive(Debug, Serialize)]
pub struct ApiRequest {
    pub model: String,
    pub messages: Vec<ApiMessage>,
    pub temperature: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: String,
}

/// Render the style instruction for a rewrite request.
///
/// The mode name doubles as the style description; extra request options
/// (currently `intensity`) tune the instruction.
pub fn system_prompt(request: &RewriteRequest) -> String {
    let style = request.mode.replace('_', " ");
    let mut prompt = format!(
        "Rewrite the user's message into {style}.\n\
         Preserve meaning, names, emojis, URLs, and structure.\n\
         Do not add facts.\n"
    );
    if request.mode == DEFAULT_MODE {
        prompt.push_str("Make it long winded and obnoxious and pompous.\n");
    }
    if let Some(intensity) = request.options.get("intensity").and_then(|v| v.as_u64()) {
        prompt.push_str(&format!(
            "Apply the style at intensity {intensity} on a scale of 1 to 5.\n"
        ));
    }
    prompt.push_str("Output only the rewritten message.");
    prompt
}

/// Client for the configured text-generation provider.
pub struct UpstreamClient {
    config: UpstreamConfig,
    client: reqwest::Client,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, request: &RewriteRequest) -> ApiRequest {
        ApiRequest {
            model: self.config.model.clone(),
            messages: vec![
                ApiMessage {
                    role: "system".to_string(),
                    content: system_prompt(request),
                },
                ApiMessage {
                    role: "user".to_string(),
                    content: request.text.clone(),
                },
            ],
            temperature: self.config.temperature,
        }
    }

    /// Run one rewrite through the provider. Returns the rewritten text.
    pub async fn rewrite(&self, request: &RewriteRequest) -> Result<String, RewriteError> {
        let api_request = self.build_request(request);
        debug!(model = %self.config.model, len = request.text.len(), "calling provider");

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", X_TITLE)
            .json(&api_request)
            .send()
            .await
            .map_err(|e| RewriteError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), body, "provider returned an error");
            return Err(RewriteError::Provider(format!(
                "provider returned {}",
                status.as_u16()
            )));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| RewriteError::Provider(e.to_string()))?;
        let text = body
            .choices
            .first()
            .map(|choice| choice.message.content.trim().to_string())
            .ok_or_else(|| RewriteError::Provider("empty completion".to_string()))?;
        debug!(len = text.len(), "provider rewrite complete");
        Ok(text)
    }
}
