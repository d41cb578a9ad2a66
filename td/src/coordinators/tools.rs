//! Tools coordinator (spec.md §4.5): thin facade over [`crate::tools::ToolExecutor`].

use async_trait::async_trait;

use super::CoordinatorError;
use crate::llm::{ToolCall, ToolDefinition};
use crate::tools::{SecurityPolicy, Tool, ToolContext, ToolExecutor, ToolResult, ToolStats};

#[async_trait]
pub trait ToolsCoordinator: Send + Sync {
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult;

    fn register(&self, tool: Box<dyn Tool>);

    fn list_tools(&self) -> Vec<ToolDefinition>;

    fn validate_args(&self, tool_name: &str, args: &serde_json::Value) -> Result<(), CoordinatorError>;

    fn stats(&self) -> ToolStats;

    fn set_security_policy(&self, policy: SecurityPolicy);

    fn get_security_policy(&self) -> SecurityPolicy;
}

/// Default implementation backed by a real [`ToolExecutor`]. Unlike the
/// other coordinators, tools have no meaningful noop variant: an executor
/// with an empty tool table already behaves as "not configured" (every
/// call returns `Unknown tool`), so a single implementation covers both
/// cases (spec.md §4.5).
pub struct DefaultToolsCoordinator {
    executor: std::sync::RwLock<ToolExecutor>,
}

impl DefaultToolsCoordinator {
    pub fn new(executor: ToolExecutor) -> Self {
        Self {
            executor: std::sync::RwLock::new(executor),
        }
    }

    pub fn standard() -> Self {
        Self::new(ToolExecutor::standard())
    }

    pub fn empty() -> Self {
        Self::new(ToolExecutor::empty())
    }
}

#[async_trait]
impl ToolsCoordinator for DefaultToolsCoordinator {
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        self.executor.read().unwrap().execute(call, ctx).await
    }

    fn register(&self, tool: Box<dyn Tool>) {
        self.executor.write().unwrap().register(tool);
    }

    fn list_tools(&self) -> Vec<ToolDefinition> {
        self.executor.read().unwrap().list_tools()
    }

    fn validate_args(&self, tool_name: &str, args: &serde_json::Value) -> Result<(), CoordinatorError> {
        self.executor
            .read()
            .unwrap()
            .validate_args(tool_name, args)
            .map_err(|e| CoordinatorError::Other(e.to_string()))
    }

    fn stats(&self) -> ToolStats {
        self.executor.read().unwrap().stats()
    }

    fn set_security_policy(&self, policy: SecurityPolicy) {
        self.executor.read().unwrap().set_security_policy(policy);
    }

    fn get_security_policy(&self) -> SecurityPolicy {
        self.executor.read().unwrap().security_policy()
    }
}

/// Explicit disabled variant for when tool execution itself should be
/// entirely suppressed (distinct from "no tools registered"): every call
/// fails closed with `NotConfigured` rather than "unknown tool".
#[derive(Default)]
pub struct NoopToolsCoordinator;

#[async_trait]
impl ToolsCoordinator for NoopToolsCoordinator {
    async fn execute(&self, _call: &ToolCall, _ctx: &ToolContext) -> ToolResult {
        ToolResult::error("tool execution is disabled")
    }

    fn register(&self, _tool: Box<dyn Tool>) {}

    fn list_tools(&self) -> Vec<ToolDefinition> {
        Vec::new()
    }

    fn validate_args(&self, _tool_name: &str, _args: &serde_json::Value) -> Result<(), CoordinatorError> {
        Err(CoordinatorError::NotConfigured { capability: "tools" })
    }

    fn stats(&self) -> ToolStats {
        ToolStats::default()
    }

    fn set_security_policy(&self, _policy: SecurityPolicy) {}

    fn get_security_policy(&self) -> SecurityPolicy {
        SecurityPolicy::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn default_coordinator_executes_registered_bash_tool() {
        let coordinator = DefaultToolsCoordinator::standard();
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "req-1".to_string()).with_unrestricted(true);
        let call = ToolCall {
            id: "1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "echo hi"}),
        };
        let result = coordinator.execute(&call, &ctx).await;
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn noop_coordinator_always_fails_closed() {
        let coordinator = NoopToolsCoordinator;
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "req-1".to_string());
        let call = ToolCall {
            id: "1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "echo hi"}),
        };
        let result = coordinator.execute(&call, &ctx).await;
        assert!(result.is_error);
    }
}
