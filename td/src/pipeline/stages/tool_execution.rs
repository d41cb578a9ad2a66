//! tool execution stage (spec.md §4.2): "for command-type requests OR when
//! the input is recognized as a shell command, execute through the tool
//! coordinator. Handle `cd` specially ... Publishes ToolExecuted with
//! latency."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::{PipelineState, RequestType};
use crate::heuristics::looks_like_command;
use crate::llm::ToolCall;
use crate::pipeline::{Stage, StageContext};
use crate::tools::{ToolContext, ToolResult};

pub struct ToolExecutionStage;

#[async_trait]
impl Stage for ToolExecutionStage {
    fn name(&self) -> &'static str {
        "tool_execution"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        let should_run = state.request.request_type == RequestType::Command || looks_like_command(&state.request.input);

        if should_run {
            let tool_ctx = ToolContext::new(
                state
                    .request
                    .context
                    .working_dir
                    .as_deref()
                    .map(std::path::PathBuf::from)
                    .unwrap_or_else(|| std::env::current_dir().unwrap_or_default()),
                state.request.id.clone(),
            )
            .with_unrestricted(state.request.context.unrestricted);

            let call = build_tool_call(&state.request.input);
            let call_started = Instant::now();
            let result = ctx.tools.execute(&call, &tool_ctx).await;
            let latency = call_started.elapsed();

            if call.name == "cd" && !result.is_error {
                state
                    .metadata
                    .insert("new_working_dir".to_string(), serde_json::Value::String(result.content.clone()));
            }

            state.emitter.tool_executed(
                &call.name,
                &call.input,
                latency.as_millis() as u64,
                !result.is_error,
                if result.is_error { Some(result.content.as_str()) } else { None },
            );

            record_result(state, call.name.clone(), result);
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}

fn build_tool_call(input: &str) -> ToolCall {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");

    if first.eq_ignore_ascii_case("cd") {
        let path = parts.next().unwrap_or("~").trim();
        return ToolCall {
            id: "tool_execution_stage".to_string(),
            name: "cd".to_string(),
            input: serde_json::json!({ "path": path }),
        };
    }

    ToolCall {
        id: "tool_execution_stage".to_string(),
        name: "bash".to_string(),
        input: serde_json::json!({ "command": trimmed }),
    }
}

fn record_result(state: &mut PipelineState, tool_name: String, result: ToolResult) {
    if result.is_error {
        state.record_error("tool_execution", format!("{tool_name}: {}", result.content));
    }
    state.tool_results.push((tool_name, result));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::{DefaultToolsCoordinator, NoopCognitiveCoordinator, NoopMemoryCoordinator, NoopPersonaCoordinator};
    use crate::domain::{ProjectContextCache, Request};
    use crate::events::create_event_bus;
    use std::sync::Arc;

    fn test_ctx() -> StageContext {
        StageContext {
            cognitive: Arc::new(NoopCognitiveCoordinator::default()),
            memory: Arc::new(NoopMemoryCoordinator),
            persona: Arc::new(NoopPersonaCoordinator::default()),
            tools: Arc::new(DefaultToolsCoordinator::standard()),
            llm: None,
            project_cache: Arc::new(ProjectContextCache::new(std::time::Duration::from_secs(60))),
            config: Arc::new(crate::config::OrchestratorConfig::default()),
        }
    }

    #[tokio::test]
    async fn ls_command_executes_bash_tool() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut request = Request::command("ls -la");
        request.context.unrestricted = true;
        let mut state = PipelineState::new(request, bus.emitter_for("req-1"));

        ToolExecutionStage.execute(&ctx, &mut state).await;
        assert_eq!(state.tool_results.len(), 1);
        assert_eq!(state.tool_results[0].0, "bash");
    }

    #[tokio::test]
    async fn cd_to_nonexistent_directory_reports_failure() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut request = Request::command("cd /nonexistent-xyz");
        request.context.unrestricted = true;
        let mut state = PipelineState::new(request, bus.emitter_for("req-1"));

        ToolExecutionStage.execute(&ctx, &mut state).await;
        assert_eq!(state.tool_results.len(), 1);
        assert!(state.tool_results[0].1.is_error);
        assert!(state.tool_results[0].1.content.contains("no such file or directory"));
        assert!(!state.metadata.contains_key("new_working_dir"));
    }

    #[tokio::test]
    async fn non_command_chat_request_does_not_execute_tools() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let request = Request::chat("how are you?");
        let mut state = PipelineState::new(request, bus.emitter_for("req-1"));

        ToolExecutionStage.execute(&ctx, &mut state).await;
        assert!(state.tool_results.is_empty());
    }
}
