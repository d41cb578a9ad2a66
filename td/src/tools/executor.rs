//! ToolExecutor - the Tools coordinator (spec.md §4.5): Execute, Register,
//! GetTool, ListTools, ValidateArgs, Stats, Set/GetSecurityPolicy.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;
use tracing::debug;

use crate::llm::{ToolCall, ToolDefinition};

use super::builtin::{CdTool, RunCommandTool};
use super::{Tool, ToolContext, ToolResult};

/// Which tools need explicit confirmation before running, independent of
/// each tool's own `requires_confirmation()` default (spec.md §6,
/// `RequireConfirmation`).
#[derive(Debug, Clone, Default)]
pub struct SecurityPolicy {
    pub require_confirmation: HashSet<String>,
}

impl SecurityPolicy {
    pub fn permissive() -> Self {
        Self::default()
    }

    pub fn requires_confirmation(&self, tool_name: &str, tool_default: bool) -> bool {
        tool_default || self.require_confirmation.contains(tool_name)
    }
}

/// Running counters for the tools coordinator (spec.md §4.1, `Stats()`).
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolStats {
    pub total_calls: u64,
    pub successes: u64,
    pub failures: u64,
}

struct Inner {
    security_policy: SecurityPolicy,
    stats: ToolStats,
}

/// Thin facade over the registered tool table; satisfies the Tools
/// coordinator contract (spec.md §4.5).
pub struct ToolExecutor {
    tools: HashMap<String, Box<dyn Tool>>,
    inner: RwLock<Inner>,
}

impl ToolExecutor {
    /// Register the tools the core itself depends on directly: `bash` for
    /// command-type requests, `cd` for the special-cased working-directory
    /// change (spec.md §4.2).
    pub fn standard() -> Self {
        let mut executor = Self::empty();
        executor.register(Box::new(RunCommandTool));
        executor.register(Box::new(CdTool));
        executor
    }

    pub fn empty() -> Self {
        debug!("ToolExecutor::empty: called");
        Self {
            tools: HashMap::new(),
            inner: RwLock::new(Inner {
                security_policy: SecurityPolicy::permissive(),
                stats: ToolStats::default(),
            }),
        }
    }

    /// Register a tool, replacing any existing tool of the same name
    /// (spec.md §4.5, `Register`).
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        debug!(tool_name = %tool.name(), "ToolExecutor::register: called");
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get_tool(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        self.tools
            .values()
            .map(|t| ToolDefinition::new(t.name(), t.description(), t.input_schema()))
            .collect()
    }

    /// Structural validation only: required top-level keys present and of
    /// the right JSON type, per the tool's own schema (spec.md §7,
    /// validation errors "surfaced as typed errors").
    pub fn validate_args(&self, tool_name: &str, args: &Value) -> Result<(), super::ToolError> {
        let tool = self.tools.get(tool_name).ok_or_else(|| super::ToolError::UnknownTool {
            name: tool_name.to_string(),
        })?;
        let schema = tool.input_schema();
        let Some(required) = schema.get("required").and_then(|r| r.as_array()) else {
            return Ok(());
        };
        for field in required {
            let Some(field_name) = field.as_str() else { continue };
            if args.get(field_name).is_none() {
                return Err(super::ToolError::InvalidArgument(format!("missing required field `{field_name}`")));
            }
        }
        Ok(())
    }

    pub fn set_security_policy(&self, policy: SecurityPolicy) {
        self.inner.write().unwrap().security_policy = policy;
    }

    pub fn security_policy(&self) -> SecurityPolicy {
        self.inner.read().unwrap().security_policy.clone()
    }

    pub fn stats(&self) -> ToolStats {
        self.inner.read().unwrap().stats
    }

    /// Execute a single tool call (spec.md §4.5, `Execute`).
    pub async fn execute(&self, tool_call: &ToolCall, ctx: &ToolContext) -> ToolResult {
        debug!(tool_name = %tool_call.name, tool_id = %tool_call.id, "ToolExecutor::execute: called");
        let result = match self.tools.get(&tool_call.name) {
            Some(tool) => {
                let policy = self.security_policy();
                if !ctx.unrestricted && policy.requires_confirmation(&tool_call.name, tool.requires_confirmation()) {
                    ToolResult::error(format!("{} requires confirmation", tool_call.name))
                } else {
                    tool.execute(tool_call.input.clone(), ctx).await
                }
            }
            None => ToolResult::error(format!("Unknown tool: {}", tool_call.name)),
        };

        let mut inner = self.inner.write().unwrap();
        inner.stats.total_calls += 1;
        if result.is_error {
            inner.stats.failures += 1;
        } else {
            inner.stats.successes += 1;
        }
        result
    }

    pub async fn execute_all(&self, tool_calls: &[ToolCall], ctx: &ToolContext) -> Vec<(String, ToolResult)> {
        let mut results = Vec::with_capacity(tool_calls.len());
        for call in tool_calls {
            let result = self.execute(call, ctx).await;
            results.push((call.id.clone(), result));
        }
        results
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }
}

impl Default for ToolExecutor {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn standard_executor_has_core_tools() {
        let executor = ToolExecutor::standard();
        assert!(executor.has_tool("bash"));
        assert!(executor.has_tool("cd"));
    }

    #[tokio::test]
    async fn execute_unknown_tool_is_recorded_as_failure() {
        let executor = ToolExecutor::standard();
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "unknown_tool".to_string(),
            input: serde_json::json!({}),
        };

        let result = executor.execute(&call, &ctx).await;
        assert!(result.is_error);
        assert!(result.content.contains("Unknown tool"));
        assert_eq!(executor.stats().failures, 1);
    }

    #[tokio::test]
    async fn confirmation_gate_blocks_unrestricted_false() {
        let executor = ToolExecutor::standard();
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string());

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "echo hi"}),
        };
        let result = executor.execute(&call, &ctx).await;
        assert!(result.is_error);
        assert!(result.content.contains("requires confirmation"));
    }

    #[tokio::test]
    async fn unrestricted_context_bypasses_confirmation_gate() {
        let executor = ToolExecutor::standard();
        let temp = tempdir().unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "test".to_string()).with_unrestricted(true);

        let call = ToolCall {
            id: "call_1".to_string(),
            name: "bash".to_string(),
            input: serde_json::json!({"command": "echo hi"}),
        };
        let result = executor.execute(&call, &ctx).await;
        assert!(!result.is_error);
    }

    #[test]
    fn validate_args_rejects_missing_required_field() {
        let executor = ToolExecutor::standard();
        let err = executor.validate_args("bash", &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, super::super::ToolError::InvalidArgument(_)));
    }

    #[test]
    fn list_tools_includes_registered_definitions() {
        let executor = ToolExecutor::standard();
        let defs = executor.list_tools();
        assert!(defs.iter().any(|d| d.name == "bash"));
        assert!(defs.iter().any(|d| d.name == "cd"));
    }
}
