//! LLM stage (spec.md §4.2): "triage the input into {simple chat, directly
//! answerable, personal memory question, agentic task}, build a system
//! prompt ..., and invoke either a plain LLM call or an agentic runner.
//! Provider/model may escalate if the configured local model is deemed too
//! small for agentic tool use; when escalation occurs, record both the
//! originally-logged and final provider/model."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::PipelineState;
use crate::heuristics::{can_answer_directly, is_personal_question, is_simple_conversation};
use crate::llm::{CompletionRequest, Message};
use crate::pipeline::{Stage, StageContext};
use crate::providers::is_local_model;

/// A local model is assumed unable to carry an agentic tool loop once tools
/// have actually been invoked for this request (spec.md §4.2, escalation
/// policy).
const FRONTIER_FALLBACK_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Triage {
    SimpleChat,
    DirectlyAnswerable,
    PersonalMemory,
    Agentic,
}

fn triage(input: &str, has_tool_results: bool) -> Triage {
    if is_personal_question(input) {
        Triage::PersonalMemory
    } else if has_tool_results {
        Triage::Agentic
    } else if is_simple_conversation(input) {
        Triage::SimpleChat
    } else if can_answer_directly(input) {
        Triage::DirectlyAnswerable
    } else {
        Triage::Agentic
    }
}

pub struct LlmStage;

#[async_trait]
impl Stage for LlmStage {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        if state.response_content.is_none() {
            let triage_kind = triage(&state.request.input, !state.tool_results.is_empty());
            let system_prompt = build_system_prompt(ctx, state, triage_kind).await;

            match &ctx.llm {
                Some(provider) => {
                    let (logged_model, final_model) = resolve_model(state, triage_kind);
                    if logged_model != final_model {
                        state.llm_model_logged = Some(logged_model);
                    }
                    state.llm_model_used = Some(final_model.clone());
                    state.llm_provider_used = Some(provider.name().to_string());

                    let request = CompletionRequest {
                        system_prompt,
                        messages: vec![Message::user(state.request.input.clone())],
                        tools: Vec::new(),
                        max_tokens: 4096,
                    };

                    match provider.complete(request).await {
                        Ok(response) => {
                            state.response_content = response.content.clone().or(state.response_content.take());
                            state.token_usage_local += if is_local_model(&final_model) {
                                response.usage.total()
                            } else {
                                0
                            };
                            state.token_usage_external += if !is_local_model(&final_model) {
                                response.usage.total()
                            } else {
                                0
                            };
                        }
                        Err(e) => {
                            state.record_error(self.name(), e.to_string());
                            state.response_content = Some(fallback_response(state));
                        }
                    }
                }
                None => {
                    state.response_content = Some(fallback_response(state));
                }
            }
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}

async fn build_system_prompt(ctx: &StageContext, state: &PipelineState, triage_kind: Triage) -> String {
    let mut sections = Vec::new();

    if let Ok(prompt) = ctx.persona.build_system_prompt().await {
        sections.push(prompt);
    }

    if matches!(triage_kind, Triage::PersonalMemory) {
        if let Ok(user_memory) = ctx.memory.get_user_memory().await {
            if let Some(name) = user_memory.name {
                sections.push(format!("The user's name is {name}."));
            }
        }
    }

    if !state.strategic_principles.is_empty() {
        sections.push(format!("Strategic principles: {}", state.strategic_principles.join("; ")));
    }

    if let Some(routing) = &state.routing {
        sections.push(format!("Routing hint: task_type={:?}, confidence={:.2}", routing.task_type, routing.confidence));
    }

    if state.request.context.voice_mode {
        sections.push("Respond concisely; this reply will be read aloud.".to_string());
    }

    sections.join("\n\n")
}

/// Escalate off a local model once the request has gone agentic
/// (spec.md §4.2, §4.9, §9: "treat the (provider, model) pair as an owned
/// capability ... record both logged and final pair").
fn resolve_model(state: &PipelineState, triage_kind: Triage) -> (String, String) {
    let configured = state.request.context.model_override.clone().unwrap_or_else(|| FRONTIER_FALLBACK_MODEL.to_string());

    if triage_kind == Triage::Agentic && is_local_model(&configured) {
        (configured, FRONTIER_FALLBACK_MODEL.to_string())
    } else {
        (configured.clone(), configured)
    }
}

fn fallback_response(state: &PipelineState) -> String {
    if let Some((_, result)) = state.tool_results.last() {
        if !result.is_error {
            return result.content.clone();
        }
    }
    if let Some((_, result)) = state.tool_results.iter().find(|(_, r)| r.is_error) {
        return format!("I ran into an issue: {}", result.content);
    }
    "I wasn't able to generate a response for this request.".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinators::{DefaultToolsCoordinator, NoopCognitiveCoordinator, NoopMemoryCoordinator, NoopPersonaCoordinator};
    use crate::domain::{ProjectContextCache, Request};
    use crate::events::create_event_bus;
    use crate::tools::ToolResult;
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
    async fn no_llm_configured_falls_back_to_tool_result() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::command("echo hello"), bus.emitter_for("req-1"));
        state.tool_results.push(("bash".to_string(), ToolResult::success("hello")));

        LlmStage.execute(&ctx, &mut state).await;
        assert_eq!(state.response_content.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn no_llm_and_no_tool_results_produces_diagnostic() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("Fix the bug in login"), bus.emitter_for("req-1"));

        LlmStage.execute(&ctx, &mut state).await;
        assert!(state.response_content.is_some());
    }

    #[tokio::test]
    async fn existing_response_content_short_circuits_llm_call() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("hi"), bus.emitter_for("req-1"));
        state.response_content = Some("template answer".to_string());

        LlmStage.execute(&ctx, &mut state).await;
        assert_eq!(state.response_content.as_deref(), Some("template answer"));
    }

    #[tokio::test]
    async fn llm_provider_is_invoked_when_configured() {
        let mut ctx = test_ctx();
        ctx.llm = Some(Arc::new(crate::llm::MockLlmProvider::single("mock response")));
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("what is recursion?"), bus.emitter_for("req-1"));

        LlmStage.execute(&ctx, &mut state).await;
        assert_eq!(state.response_content.as_deref(), Some("mock response"));
        assert_eq!(state.llm_provider_used.as_deref(), Some("mock"));
    }
}
