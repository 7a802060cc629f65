//! Planner - chooses the next communication technique
//!
//! Classifies the conversational state of the latest user message and emits
//! exactly one technique from the vocabulary. The classification itself is
//! delegated to a single completion call; the deterministic state mapping in
//! [`crate::technique`] is rendered into the prompt as selection rules.
//!
//! Hard invariant: `plan` never raises past its own boundary. Every failure
//! mode (network error, malformed response, non-member technique) degrades to
//! `Technique::Unknown`.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::llm::{ChatMessage, ChatRole, CompletionRequest, LlmClient};
use crate::prompts::{PlannerContext, PromptLoader};
use crate::technique::{ConversationState, Technique, technique_for_state};

/// The single-field decision object carrying the chosen technique for one turn
///
/// Transient: produced by the planner, consumed immediately by the generator.
/// Only the resulting turn's technique field is ever persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationPlan {
    pub technique: Technique,
}

/// Expected structured reply from the planner model
#[derive(Debug, Deserialize)]
struct PlanResponse {
    technique: Technique,
}

/// Planner stage of the chat pipeline
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    prompts: PromptLoader,
}

impl Planner {
    /// Create a planner using the configured planner model
    pub fn new(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        debug!(model = %config.planner_model, "Planner::new: called");
        Self {
            llm,
            model: config.planner_model.clone(),
            max_tokens: config.max_tokens,
            prompts: PromptLoader::new(),
        }
    }

    /// Choose the technique for the next reply
    ///
    /// * `message` - the latest user message (non-empty)
    /// * `history` - prior turns oldest-to-newest, not including `message`
    /// * `journal` - latest journal excerpt, empty string meaning none
    /// * `affect` - optional affect label for the latest message
    /// * `previous` - technique of the immediately preceding ai turn, if any
    pub async fn plan(
        &self,
        message: &str,
        history: &[ChatMessage],
        journal: &str,
        affect: Option<&str>,
        previous: Option<Technique>,
    ) -> ConversationPlan {
        info!(message_len = message.len(), history_len = history.len(), "plan: called");

        let prompt = match self.build_prompt(message, history, journal, affect, previous) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "plan: prompt rendering failed, falling back to unknown");
                return ConversationPlan {
                    technique: Technique::Unknown,
                };
            }
        };

        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::system(prompt)],
            max_tokens: self.max_tokens,
            json_object: true,
        };

        let technique = match self.llm.complete(request).await {
            Ok(response) => parse_plan(&response.content),
            Err(e) => {
                warn!(error = %e, "plan: completion call failed, falling back to unknown");
                Technique::Unknown
            }
        };

        debug!(%technique, "plan: chosen");
        ConversationPlan { technique }
    }

    /// Render the planner system instruction
    fn build_prompt(
        &self,
        message: &str,
        history: &[ChatMessage],
        journal: &str,
        affect: Option<&str>,
        previous: Option<Technique>,
    ) -> eyre::Result<String> {
        debug!(?previous, "build_prompt: called");
        let techniques = Technique::all()
            .iter()
            .map(|t| format!("'{}'", t))
            .collect::<Vec<_>>()
            .join(", ");

        let rules = ConversationState::all()
            .iter()
            .map(|state| {
                format!(
                    "{}: choose '{}'",
                    state.description(),
                    technique_for_state(*state, previous)
                )
            })
            .collect();

        let context = PlannerContext {
            techniques,
            rules,
            previous_technique: previous.map(|t| t.to_string()),
            journal: if journal.is_empty() {
                "None".to_string()
            } else {
                journal.to_string()
            },
            affect: affect.map(|a| a.to_string()),
            history: history_lines(history),
            message: message.to_string(),
        };

        self.prompts.render("planner", &context)
    }
}

/// Parse the structured planner reply, degrading to Unknown on any mismatch
fn parse_plan(content: &str) -> Technique {
    debug!(content_len = content.len(), "parse_plan: called");
    match serde_json::from_str::<PlanResponse>(content) {
        Ok(plan) => plan.technique,
        Err(e) => {
            warn!(error = %e, "parse_plan: malformed plan response, falling back to unknown");
            Technique::Unknown
        }
    }
}

/// Render history as "role: content" lines for the planner prompt
fn history_lines(history: &[ChatMessage]) -> String {
    history
        .iter()
        .map(|msg| {
            let role = match msg.role {
                ChatRole::Assistant => "ai",
                ChatRole::User => "user",
                ChatRole::System => "system",
            };
            format!("{}: {}", role, msg.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    fn planner_with(client: MockLlmClient) -> (Planner, Arc<MockLlmClient>) {
        let client = Arc::new(client);
        let planner = Planner::new(client.clone(), &LlmConfig::default());
        (planner, client)
    }

    #[tokio::test]
    async fn test_plan_returns_chosen_technique() {
        let (planner, client) = planner_with(MockLlmClient::replying(&[r#"{"technique": "probing"}"#]));

        let plan = planner.plan("I had a strange day", &[], "", None, None).await;

        assert_eq!(plan.technique, Technique::Probing);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_plan_request_shape() {
        let (planner, client) = planner_with(MockLlmClient::replying(&[r#"{"technique": "reflection"}"#]));

        planner
            .plan(
                "hi",
                &[ChatMessage::user("earlier"), ChatMessage::assistant("mm")],
                "Slept badly.",
                Some("tired"),
                Some(Technique::Reflection),
            )
            .await;

        let request = client.last_request().unwrap();
        assert!(request.json_object);
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ChatRole::System);

        let prompt = &request.messages[0].content;
        assert!(prompt.contains("'probing'"));
        assert!(prompt.contains("user: earlier"));
        assert!(prompt.contains("ai: mm"));
        assert!(prompt.contains("Slept badly."));
        assert!(prompt.contains("tired"));
        assert!(prompt.contains("The previous reply used 'reflection'"));
        assert!(prompt.contains("User message: hi"));
    }

    #[tokio::test]
    async fn test_plan_empty_journal_renders_none() {
        let (planner, client) = planner_with(MockLlmClient::replying(&[r#"{"technique": "clarifying"}"#]));

        planner.plan("hello", &[], "", None, None).await;

        let prompt = client.last_request().unwrap().messages[0].content.clone();
        assert!(prompt.contains("Latest journal entry: None"));
    }

    #[tokio::test]
    async fn test_plan_completion_failure_degrades_to_unknown() {
        let (planner, _) = planner_with(MockLlmClient::failing());

        let plan = planner.plan("anything", &[], "", None, None).await;
        assert_eq!(plan.technique, Technique::Unknown);
    }

    #[tokio::test]
    async fn test_plan_malformed_json_degrades_to_unknown() {
        let (planner, _) = planner_with(MockLlmClient::replying(&["certainly! here is some prose"]));

        let plan = planner.plan("anything", &[], "", None, None).await;
        assert_eq!(plan.technique, Technique::Unknown);
    }

    #[tokio::test]
    async fn test_plan_missing_field_degrades_to_unknown() {
        let (planner, _) = planner_with(MockLlmClient::replying(&[r#"{"strategy": "probing"}"#]));

        let plan = planner.plan("anything", &[], "", None, None).await;
        assert_eq!(plan.technique, Technique::Unknown);
    }

    #[tokio::test]
    async fn test_plan_non_member_technique_degrades_to_unknown() {
        let (planner, _) = planner_with(MockLlmClient::replying(&[r#"{"technique": "gaslighting"}"#]));

        let plan = planner.plan("anything", &[], "", None, None).await;
        assert_eq!(plan.technique, Technique::Unknown);
    }

    #[tokio::test]
    async fn test_plan_greeting_scenario_empty_context() {
        // "hi" with empty history and journal must plan without error
        let (planner, _) = planner_with(MockLlmClient::replying(&[r#"{"technique": "social_greeting"}"#]));

        let plan = planner.plan("hi", &[], "", None, None).await;
        assert_eq!(plan.technique, Technique::SocialGreeting);
    }

    #[test]
    fn test_parse_plan_variants() {
        assert_eq!(parse_plan(r#"{"technique": "summarizing"}"#), Technique::Summarizing);
        assert_eq!(parse_plan(r#"{"technique": "unknown"}"#), Technique::Unknown);
        assert_eq!(parse_plan("not json"), Technique::Unknown);
        assert_eq!(parse_plan(""), Technique::Unknown);
    }

    #[test]
    fn test_history_lines_role_mapping() {
        let lines = history_lines(&[ChatMessage::user("one"), ChatMessage::assistant("two")]);
        assert_eq!(lines, "user: one\nai: two");
    }
}
