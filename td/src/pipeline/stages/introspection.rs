//! introspection stage (spec.md §4.2): "classify whether the query is
//! metacognitive ... If so, consult the introspection coordinator; if it
//! produces a response, set it on state and mark as handled (triggering
//! early exit). Non-introspective queries pass through untouched."
//!
//! There is no dedicated introspection coordinator in the facade layer
//! (spec.md §4.5 enumerates Cognitive/Memory/Persona/Tools only); this
//! stage answers self-knowledge queries directly from the persona and
//! memory coordinators already available to every stage.

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::PipelineState;
use crate::pipeline::{Stage, StageContext};

const INTROSPECTIVE_PATTERNS: &[&str] = &[
    "do you know",
    "what do you know",
    "what have you learned",
    "what do you remember",
    "what do you know about me",
];

pub struct IntrospectionStage;

#[async_trait]
impl Stage for IntrospectionStage {
    fn name(&self) -> &'static str {
        "introspection"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        if is_introspective_query(&state.request.input) {
            if let Ok(response) = build_introspective_response(ctx).await {
                state.response_content = Some(response);
                state.handled_early = true;
            }
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}

fn is_introspective_query(input: &str) -> bool {
    let lower = input.trim().to_lowercase();
    INTROSPECTIVE_PATTERNS.iter().any(|p| lower.contains(p))
}

async fn build_introspective_response(ctx: &StageContext) -> Result<String, crate::coordinators::CoordinatorError> {
    let user_memory = ctx.memory.get_user_memory().await.unwrap_or_default();
    let mut parts = Vec::new();
    if let Some(name) = user_memory.name {
        parts.push(format!("your name is {name}"));
    }
    if let Some(role) = user_memory.role {
        parts.push(format!("you work as {role}"));
    }
    if parts.is_empty() {
        Ok("I don't have any stored memory about you yet.".to_string())
    } else {
        Ok(format!("Here's what I know: {}.", parts.join(", ")))
    }
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
    async fn introspective_query_sets_response_and_handled_early() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("what do you know about me?"), bus.emitter_for("req-1"));

        IntrospectionStage.execute(&ctx, &mut state).await;
        assert!(state.handled_early);
        assert!(state.response_content.is_some());
    }

    #[tokio::test]
    async fn non_introspective_query_passes_through() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("ls -la"), bus.emitter_for("req-1"));

        IntrospectionStage.execute(&ctx, &mut state).await;
        assert!(!state.handled_early);
        assert!(state.response_content.is_none());
    }
}
