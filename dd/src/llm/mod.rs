//! LLM client module for deard
//!
//! Provides the completion capability both pipeline stages depend on.
//! The planner and generator never talk to the network directly; they hold an
//! `Arc<dyn LlmClient>` so tests can swap in a deterministic mock.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openrouter;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openrouter::OpenRouterClient;
pub use types::{ChatMessage, ChatRole, CompletionRequest, CompletionResponse};

use crate::config::LlmConfig;

/// Create the completion client from configuration
///
/// Reads the API key from the environment variable named in the config.
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(base_url = %config.base_url, "create_client: called");
    Ok(Arc::new(OpenRouterClient::from_config(config)?))
}
