//! Generator - produces the reply applying the chosen technique
//!
//! Looks up the fixed instruction for the planned technique, composes one
//! system prompt (persona, prohibitions, length constraint, technique
//! instruction), appends the conversation history, and issues one completion
//! call.
//!
//! Hard invariant: `generate` never raises. Any completion failure or an
//! empty reply degrades to the fixed empathetic fallback, so the user-facing
//! turn is always completable.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::LlmConfig;
use crate::llm::{ChatMessage, CompletionRequest, LlmClient};
use crate::planner::ConversationPlan;
use crate::prompts::{GeneratorContext, PromptLoader};
use crate::technique::Technique;

/// Technique-agnostic reply used when the completion call fails
pub const FALLBACK_REPLY: &str = "I'm here to listen. Could you tell me a little more about that?";

/// Fixed application instruction for a technique
///
/// Total over the vocabulary: every member including `Unknown` has a
/// non-empty instruction, so lookup can never fail.
pub fn instruction_for(technique: Technique) -> &'static str {
    match technique {
        Technique::Probing => "ask a short, gentle clarifying question to explore a specific part of the user's message.",
        Technique::Validation => {
            "acknowledge the user's feelings as understandable and legitimate, without agreeing or disagreeing with any judgment."
        }
        Technique::Reflection => "briefly mirror the primary emotion you detect in the user's message.",
        Technique::Summarizing => "provide a brief, neutral summary of the key points the user has made.",
        Technique::Clarifying => "confirm your understanding of the user's message to ensure you are on the same page.",
        Technique::Information => {
            "answer the user's direct question briefly and factually, without adding advice or opinions."
        }
        Technique::SocialGreeting => "return the greeting warmly and invite the user to share how they are doing.",
        Technique::Unknown => "ask a simple, open-ended question like 'How are you feeling about that?' or 'Can you tell me more?'",
    }
}

/// String-keyed instruction lookup with the `unknown` fallback
///
/// A second, independent safety net beyond the vocabulary boundary: even a
/// raw technique name that never passed membership validation resolves to an
/// instruction instead of an error.
pub fn instruction_for_name(name: &str) -> &'static str {
    instruction_for(Technique::parse(name))
}

/// Generator stage of the chat pipeline
pub struct Generator {
    llm: Arc<dyn LlmClient>,
    model: String,
    max_tokens: u32,
    prompts: PromptLoader,
}

impl Generator {
    /// Create a generator using the configured generator model
    pub fn new(llm: Arc<dyn LlmClient>, config: &LlmConfig) -> Self {
        debug!(model = %config.generator_model, "Generator::new: called");
        Self {
            llm,
            model: config.generator_model.clone(),
            max_tokens: config.max_tokens,
            prompts: PromptLoader::new(),
        }
    }

    /// Produce the reply text for the planned technique
    ///
    /// * `plan` - the planner's decision (already vocabulary-validated)
    /// * `history` - turns oldest-to-newest, the latest user message included
    ///   as the final entry
    /// * `affect` - optional affect label for the latest message
    pub async fn generate(&self, plan: &ConversationPlan, history: &[ChatMessage], affect: Option<&str>) -> String {
        info!(technique = %plan.technique, history_len = history.len(), "generate: called");

        let context = GeneratorContext {
            technique: plan.technique.to_string(),
            instruction: instruction_for(plan.technique).to_string(),
            affect: affect.map(|a| a.to_string()),
        };

        let prompt = match self.prompts.render("generator", &context) {
            Ok(prompt) => prompt,
            Err(e) => {
                warn!(error = %e, "generate: prompt rendering failed, using fallback reply");
                return FALLBACK_REPLY.to_string();
            }
        };

        let mut messages = vec![ChatMessage::system(prompt)];
        messages.extend(history.iter().cloned());

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            max_tokens: self.max_tokens,
            json_object: false,
        };

        match self.llm.complete(request).await {
            Ok(response) => {
                let reply = response.content.trim().to_string();
                if reply.is_empty() {
                    debug!("generate: empty completion, using fallback reply");
                    FALLBACK_REPLY.to_string()
                } else {
                    debug!(reply_len = reply.len(), "generate: success");
                    reply
                }
            }
            Err(e) => {
                warn!(error = %e, "generate: completion call failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRole;
    use crate::llm::client::mock::MockLlmClient;
    use proptest::prelude::*;

    fn generator_with(client: MockLlmClient) -> (Generator, Arc<MockLlmClient>) {
        let client = Arc::new(client);
        let generator = Generator::new(client.clone(), &LlmConfig::default());
        (generator, client)
    }

    fn plan(technique: Technique) -> ConversationPlan {
        ConversationPlan { technique }
    }

    #[test]
    fn test_instruction_for_is_total() {
        for technique in Technique::all() {
            assert!(!instruction_for(technique).is_empty());
        }
        assert!(!instruction_for(Technique::Unknown).is_empty());
    }

    #[test]
    fn test_instruction_for_name_members() {
        assert_eq!(instruction_for_name("probing"), instruction_for(Technique::Probing));
        assert_eq!(
            instruction_for_name("social_greeting"),
            instruction_for(Technique::SocialGreeting)
        );
    }

    #[test]
    fn test_instruction_for_name_foreign_string() {
        assert_eq!(instruction_for_name("mind_reading"), instruction_for(Technique::Unknown));
        assert_eq!(instruction_for_name(""), instruction_for(Technique::Unknown));
    }

    proptest! {
        #[test]
        fn test_instruction_lookup_never_fails(name in ".*") {
            let instruction = instruction_for_name(&name);
            prop_assert!(!instruction.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generate_returns_trimmed_reply() {
        let (generator, _) = generator_with(MockLlmClient::replying(&["  That sounds heavy. What happened next?  "]));

        let reply = generator
            .generate(&plan(Technique::Probing), &[ChatMessage::user("rough day")], None)
            .await;

        assert_eq!(reply, "That sounds heavy. What happened next?");
    }

    #[tokio::test]
    async fn test_generate_request_shape() {
        let (generator, client) = generator_with(MockLlmClient::replying(&["ok"]));

        let history = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("I feel stuck"),
        ];
        generator
            .generate(&plan(Technique::Validation), &history, Some("frustrated"))
            .await;

        let request = client.last_request().unwrap();
        assert!(!request.json_object);
        // System prompt followed by the full history, latest user message last
        assert_eq!(request.messages.len(), 4);
        assert_eq!(request.messages[0].role, ChatRole::System);
        assert_eq!(request.messages[3].content, "I feel stuck");

        let prompt = &request.messages[0].content;
        assert!(prompt.contains("Assigned technique: validation"));
        assert!(prompt.contains(instruction_for(Technique::Validation)));
        assert!(prompt.contains("'frustrated' tone"));
        assert!(prompt.contains("DO NOT give advice"));
    }

    #[tokio::test]
    async fn test_generate_failure_returns_fallback() {
        let (generator, _) = generator_with(MockLlmClient::failing());

        let reply = generator
            .generate(&plan(Technique::Reflection), &[ChatMessage::user("hey")], None)
            .await;

        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_generate_empty_completion_returns_fallback() {
        let (generator, _) = generator_with(MockLlmClient::replying(&["   \n  "]));

        let reply = generator
            .generate(&plan(Technique::Clarifying), &[ChatMessage::user("hm")], None)
            .await;

        assert_eq!(reply, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_generate_social_greeting_non_empty() {
        let (generator, _) = generator_with(MockLlmClient::replying(&["Hi there! How are you feeling today?"]));

        let reply = generator
            .generate(&plan(Technique::SocialGreeting), &[ChatMessage::user("hi")], None)
            .await;

        assert!(!reply.is_empty());
    }

    #[tokio::test]
    async fn test_generate_unknown_technique_uses_unknown_instruction() {
        let (generator, client) = generator_with(MockLlmClient::replying(&["Can you tell me more?"]));

        generator
            .generate(&plan(Technique::Unknown), &[ChatMessage::user("...")], None)
            .await;

        let prompt = client.last_request().unwrap().messages[0].content.clone();
        assert!(prompt.contains(instruction_for(Technique::Unknown)));
    }
}
