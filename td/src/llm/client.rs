//! The [`LlmProvider`] trait (spec.md §4.9, §1 non-goal: no concrete
//! Anthropic/OpenAI client is implemented here, only the seam the LLM
//! pipeline stage calls through).

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::LlmError;
use super::types::{CompletionRequest, CompletionResponse, StreamChunk};

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Name used by [`crate::providers::is_model_compatible_with_provider`].
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Default streaming implementation: issue a single non-streaming call
    /// and replay it as one chunk. Providers capable of real streaming
    /// override this.
    async fn stream(
        &self,
        request: CompletionRequest,
        chunk_tx: mpsc::Sender<StreamChunk>,
    ) -> Result<CompletionResponse, LlmError> {
        let response = self.complete(request).await?;
        let _ = chunk_tx
            .send(StreamChunk::MessageStop {
                usage: response.usage.clone(),
            })
            .await;
        Ok(response)
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use crate::llm::types::{StopReason, TokenUsage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Test double returning a fixed queue of responses in order, looping
    /// the last one once exhausted.
    pub struct MockLlmProvider {
        responses: Mutex<Vec<CompletionResponse>>,
        call_count: AtomicUsize,
    }

    impl MockLlmProvider {
        pub fn new(responses: Vec<CompletionResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                call_count: AtomicUsize::new(0),
            }
        }

        pub fn single(content: impl Into<String>) -> Self {
            Self::new(vec![CompletionResponse {
                content: Some(content.into()),
                tool_calls: Vec::new(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
                provider: "mock".to_string(),
                model: "mock-model".to_string(),
            }])
        }

        pub fn call_count(&self) -> usize {
            self.call_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            let idx = self.call_count.fetch_add(1, Ordering::SeqCst);
            let responses = self.responses.lock().unwrap();
            let response = responses
                .get(idx)
                .or_else(|| responses.last())
                .cloned()
                .ok_or_else(|| LlmError::Provider {
                    provider: "mock".to_string(),
                    message: "no responses configured".to_string(),
                })?;
            Ok(response)
        }
    }

    #[tokio::test]
    async fn mock_returns_configured_responses_in_order() {
        let provider = MockLlmProvider::new(vec![
            CompletionResponse {
                content: Some("first".to_string()),
                tool_calls: Vec::new(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
                provider: "mock".to_string(),
                model: "mock-model".to_string(),
            },
            CompletionResponse {
                content: Some("second".to_string()),
                tool_calls: Vec::new(),
                stop_reason: StopReason::EndTurn,
                usage: TokenUsage::default(),
                provider: "mock".to_string(),
                model: "mock-model".to_string(),
            },
        ]);

        let request = CompletionRequest {
            system_prompt: String::new(),
            messages: Vec::new(),
            tools: Vec::new(),
            max_tokens: 100,
        };

        let first = provider.complete(request.clone()).await.unwrap();
        assert_eq!(first.content.as_deref(), Some("first"));
        let second = provider.complete(request).await.unwrap();
        assert_eq!(second.content.as_deref(), Some("second"));
        assert_eq!(provider.call_count(), 2);
    }
}
