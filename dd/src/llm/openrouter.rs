//! OpenRouter API client implementation
//!
//! Implements the LlmClient trait for OpenRouter's OpenAI-compatible
//! chat/completions endpoint. One attempt per call, no retry: the pipeline
//! stages degrade to their documented fallbacks on any failure, so retrying
//! here would only stretch the user-facing latency.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::{ChatMessage, CompletionRequest, CompletionResponse, LlmClient, LlmError};
use crate::config::LlmConfig;

/// OpenRouter chat completions client
pub struct OpenRouterClient {
    api_key: String,
    base_url: String,
    site_url: String,
    app_name: String,
    http: Client,
}

impl OpenRouterClient {
    /// Create a new client from configuration
    ///
    /// Reads the API key from the environment variable named in the config.
    /// The configured timeout bounds both completion calls of a turn so a
    /// stalled upstream model cannot hang a request indefinitely.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        debug!(base_url = %config.base_url, timeout_ms = config.timeout_ms, "from_config: called");
        let api_key = config
            .get_api_key()
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(LlmError::Network)?;

        Ok(Self {
            api_key,
            base_url: config.base_url.clone(),
            site_url: config.site_url.clone(),
            app_name: config.app_name.clone(),
            http,
        })
    }

    /// Build the request body for the chat/completions endpoint
    fn build_request_body(&self, request: &CompletionRequest) -> serde_json::Value {
        debug!(model = %request.model, json_object = request.json_object, "build_request_body: called");
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": self.convert_messages(&request.messages),
            "max_tokens": request.max_tokens,
        });

        if request.json_object {
            debug!("build_request_body: adding json_object response format");
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        body
    }

    /// Convert internal ChatMessage types to wire format
    fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<serde_json::Value> {
        debug!(message_count = messages.len(), "convert_messages: called");
        messages
            .iter()
            .map(|msg| {
                serde_json::json!({
                    "role": msg.role,
                    "content": msg.content,
                })
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        debug!(model = %request.model, "complete: called");
        let url = format!("{}/chat/completions", self.base_url);
        let body = self.build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", &self.site_url)
            .header("X-Title", &self.app_name)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            debug!(status, "complete: API error");
            let message = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, message });
        }

        debug!("complete: success");
        let api_response: ApiResponse = response.json().await.map_err(LlmError::Network)?;

        let content = api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))?;

        Ok(CompletionResponse { content })
    }
}

// OpenRouter API response types

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    content: String,
}
