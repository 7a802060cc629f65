//! deard - empathetic journaling companion backend
//!
//! The distinguishing subsystem is a two-stage conversational pipeline: a
//! planner that selects a communication technique from a closed vocabulary
//! given conversation state, and a generator that produces a short reply
//! constrained by that technique. Both stages delegate language understanding
//! to an external completion endpoint and degrade to documented fallbacks on
//! any failure, so the caller never sees an AI-stage error.
//!
//! # Turn protocol
//!
//! Persist the user turn -> load bounded history and the latest journal
//! excerpt -> plan -> generate -> persist the ai turn tagged with the chosen
//! technique, unconditionally.
//!
//! # Modules
//!
//! - [`technique`] - closed technique vocabulary and the state mapping
//! - [`planner`] - technique selection stage
//! - [`generator`] - reply generation stage
//! - [`chat`] - turn orchestration over the journalstore
//! - [`llm`] - completion client trait and OpenRouter implementation
//! - [`prompts`] - embedded handlebars prompt templates
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod chat;
pub mod cli;
pub mod config;
pub mod generator;
pub mod llm;
pub mod planner;
pub mod prompts;
pub mod technique;

// Re-export commonly used types
pub use chat::{ChatError, ChatService};
pub use config::{Config, HistoryConfig, LlmConfig, StorageConfig};
pub use generator::{FALLBACK_REPLY, Generator, instruction_for, instruction_for_name};
pub use llm::{ChatMessage, ChatRole, CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenRouterClient, create_client};
pub use planner::{ConversationPlan, Planner};
pub use technique::{ConversationState, Technique, technique_for_state};
