//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless completion capability - each call is independent
///
/// This is the single seam between the pipeline and the outside world. The
/// planner and generator each issue exactly one completion call per turn and
/// handle every error locally, so implementations should fail fast rather
/// than retry.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request and return the first completion's text
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
pub mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use tracing::debug;

    use super::*;

    /// Mock LLM client for unit tests
    ///
    /// Returns scripted results in order and records every request it sees.
    /// An exhausted (or empty) script yields an `InvalidResponse` error, which
    /// doubles as the always-failing client.
    pub struct MockLlmClient {
        responses: Mutex<VecDeque<Result<CompletionResponse, LlmError>>>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockLlmClient {
        pub fn new(responses: Vec<Result<CompletionResponse, LlmError>>) -> Self {
            debug!(response_count = responses.len(), "MockLlmClient::new: called");
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        /// A client that replies with the given texts in order
        pub fn replying(texts: &[&str]) -> Self {
            Self::new(
                texts
                    .iter()
                    .map(|t| {
                        Ok(CompletionResponse {
                            content: (*t).to_string(),
                        })
                    })
                    .collect(),
            )
        }

        /// A client whose every call fails
        pub fn failing() -> Self {
            Self::new(vec![])
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// The last request the client received
        pub fn last_request(&self) -> Option<CompletionRequest> {
            self.requests.lock().unwrap().last().cloned()
        }
    }

    #[async_trait]
    impl LlmClient for MockLlmClient {
        async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            debug!("MockLlmClient::complete: called");
            self.requests.lock().unwrap().push(request);
            self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
                debug!("MockLlmClient::complete: no more scripted responses");
                Err(LlmError::InvalidResponse("No more mock responses".to_string()))
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::llm::ChatMessage;

        fn request(text: &str) -> CompletionRequest {
            CompletionRequest {
                model: "test-model".to_string(),
                messages: vec![ChatMessage::user(text)],
                max_tokens: 100,
                json_object: false,
            }
        }

        #[tokio::test]
        async fn test_mock_client_returns_responses_in_order() {
            let client = MockLlmClient::replying(&["first", "second"]);

            let resp = client.complete(request("a")).await.unwrap();
            assert_eq!(resp.content, "first");

            let resp = client.complete(request("b")).await.unwrap();
            assert_eq!(resp.content, "second");

            assert_eq!(client.call_count(), 2);
        }

        #[tokio::test]
        async fn test_mock_client_errors_when_exhausted() {
            let client = MockLlmClient::failing();
            assert!(client.complete(request("a")).await.is_err());
        }

        #[tokio::test]
        async fn test_mock_client_records_requests() {
            let client = MockLlmClient::replying(&["ok"]);
            client.complete(request("remembered")).await.unwrap();

            let last = client.last_request().unwrap();
            assert_eq!(last.messages[0].content, "remembered");
        }
    }
}
