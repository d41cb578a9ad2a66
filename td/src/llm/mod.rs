//! The LLM seam: request/response types and the [`LlmProvider`] trait that
//! the cognitive pipeline's triage stage calls through (spec.md §4.9).
//!
//! No concrete provider client lives here; wiring a real Anthropic/OpenAI/
//! local-model backend is left to the embedding application (spec.md §1).

mod client;
mod error;
mod types;

pub use client::LlmProvider;
pub use error::LlmError;
pub use types::{
    CompletionRequest, CompletionResponse, ContentBlock, Message, MessageContent, Role, StopReason, StreamChunk,
    TokenUsage, ToolCall, ToolDefinition,
};

#[cfg(test)]
pub use client::mock::MockLlmProvider;
