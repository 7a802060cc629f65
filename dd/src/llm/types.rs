//! LLM request/response types for deard
//!
//! These model the OpenAI-compatible chat completions API that OpenRouter
//! serves, but stay provider-agnostic: nothing here knows about URLs or
//! headers.

use serde::{Deserialize, Serialize};

/// Message role on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// A message in the conversation sent to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier (the planner and generator may use different models)
    pub model: String,

    /// Ordered role/content message list
    pub messages: Vec<ChatMessage>,

    /// Max tokens for the response
    pub max_tokens: u32,

    /// Ask the provider for a structured single-field JSON object reply
    /// (used by the planner, not the generator)
    pub json_object: bool,
}

/// Response from a completion request
///
/// Only the first completion's text matters to the pipeline.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
}
