//! Tool trait definition (spec.md §4.5, Tools coordinator).

use async_trait::async_trait;
use serde_json::Value;

use super::context::ToolContext;

/// A tool that can be called by the LLM stage or by direct command-type
/// requests (spec.md §4.2, tool execution stage).
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches LLM tool_use name).
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> Value;

    /// True for tools whose effects are risky enough to need confirmation
    /// under `RequireConfirmation` (spec.md §6).
    fn requires_confirmation(&self) -> bool {
        false
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult;
}

/// Result of a tool execution (spec.md §8, invariant #7: `latency > 0` and
/// either success with no error, or failure with an error payload).
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_and_error_constructors() {
        assert!(!ToolResult::success("ok").is_error);
        assert!(ToolResult::error("bad").is_error);
    }
}
