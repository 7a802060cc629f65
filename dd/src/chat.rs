//! ChatService - sequences the full turn protocol
//!
//! Per inbound message: persist the user turn first (no message is lost even
//! if the AI stages fail), load bounded history and the latest journal
//! excerpt, run planner then generator, and persist the ai turn tagged with
//! the plan's technique unconditionally. The two stage calls are already
//! degraded internally, so the only errors that escape are caller input
//! errors and persistence failures.

use std::sync::Arc;

use journalstore::{ConversationTurn, NewTurn, Sender, Store, StoreError};
use thiserror::Error;
use tracing::{debug, info};

use crate::generator::Generator;
use crate::llm::ChatMessage;
use crate::planner::Planner;
use crate::technique::Technique;

/// Errors surfaced to the caller of the chat operations
#[derive(Debug, Error)]
pub enum ChatError {
    /// The inbound message was empty or whitespace-only
    #[error("Message must not be empty")]
    EmptyMessage,

    /// The turn does not exist or is not owned by the caller
    #[error("Not found")]
    NotFound,

    /// Persistence failure - fatal to the request, the turn protocol's
    /// invariants cannot be upheld without the store
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for ChatError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ChatError::NotFound,
            other => ChatError::Store(other),
        }
    }
}

/// Orchestrates planner, generator, and persistence for one conversation turn
pub struct ChatService {
    store: Arc<Store>,
    planner: Planner,
    generator: Generator,
    window: usize,
}

impl ChatService {
    /// Create a chat service
    pub fn new(store: Arc<Store>, planner: Planner, generator: Generator, window: usize) -> Self {
        debug!(window, "ChatService::new: called");
        Self {
            store,
            planner,
            generator,
            window,
        }
    }

    /// Handle one inbound user message and return the persisted ai turn
    pub async fn handle_message(
        &self,
        user_id: &str,
        message: &str,
        affect: Option<&str>,
    ) -> Result<ConversationTurn, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            debug!("handle_message: empty message rejected");
            return Err(ChatError::EmptyMessage);
        }

        info!(%user_id, message_len = message.len(), "handle_message: called");

        // 1. Persist the user turn immediately
        let mut user_turn = NewTurn::user(user_id, message);
        if let Some(affect) = affect {
            user_turn = user_turn.with_affect(affect);
        }
        self.store.append_turn(user_turn)?;

        // 2. Bounded recent history (newest-first) and latest journal excerpt
        let recent = self.store.recent_turns(user_id, self.window)?;
        let previous = recent
            .iter()
            .find(|t| t.sender == Sender::Ai)
            .and_then(|t| t.technique.as_deref())
            .map(Technique::parse);
        let journal = self
            .store
            .latest_entry(user_id)?
            .map(|entry| entry.content)
            .unwrap_or_default();

        // Chronological presentation; the just-persisted user message is the
        // final entry
        let history = to_messages(&recent);
        let prior = match history.split_last() {
            Some((_, prior)) => prior,
            None => &[],
        };

        // 3. Plan - already degrades to unknown internally
        let plan = self.planner.plan(message, prior, &journal, affect, previous).await;

        // 4. Generate - already degrades to the fallback reply internally
        let reply = self.generator.generate(&plan, &history, affect).await;

        // 5. Persist the ai turn unconditionally, tagged with the technique
        let ai_turn = self
            .store
            .append_turn(NewTurn::ai(user_id, reply, plan.technique.as_str()))?;

        debug!(turn_id = ai_turn.id, technique = %plan.technique, "handle_message: complete");
        Ok(ai_turn)
    }

    /// Recent turns for display, newest first
    pub fn history(&self, user_id: &str, limit: usize) -> Result<Vec<ConversationTurn>, ChatError> {
        debug!(%user_id, limit, "history: called");
        Ok(self.store.recent_turns(user_id, limit)?)
    }

    /// Toggle the moderation flag on a turn
    pub fn flag_turn(&self, user_id: &str, id: i64, flag: bool) -> Result<ConversationTurn, ChatError> {
        debug!(%user_id, id, flag, "flag_turn: called");
        Ok(self.store.set_flag(user_id, id, flag)?)
    }

    /// Delete a turn
    pub fn delete_turn(&self, user_id: &str, id: i64) -> Result<(), ChatError> {
        debug!(%user_id, id, "delete_turn: called");
        Ok(self.store.delete_turn(user_id, id)?)
    }
}

/// Map turns (newest-first from storage) to chronological wire messages
fn to_messages(recent: &[ConversationTurn]) -> Vec<ChatMessage> {
    recent
        .iter()
        .rev()
        .map(|turn| match turn.sender {
            Sender::User => ChatMessage::user(turn.content.clone()),
            Sender::Ai => ChatMessage::assistant(turn.content.clone()),
        })
        .collect()
}
