//! cognitive stage (spec.md §4.2): "if a cognitive coordinator is configured
//! and enabled, attempt template match via semantic routing. On medium/high
//! similarity, render the template and set it as `LLMResponse` (skipping the
//! LLM stage). Also compute a complexity score and a recommended model
//! tier. On no match, flag as a frontier-tier candidate."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::{PipelineState, RoutingDecision, TaskType};
use crate::pipeline::{Stage, StageContext};

pub struct CognitiveStage;

#[async_trait]
impl Stage for CognitiveStage {
    fn name(&self) -> &'static str {
        "cognitive"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        if ctx.cognitive.enabled() {
            let routing = state
                .routing
                .clone()
                .unwrap_or_else(|| RoutingDecision::new(TaskType::General, 0.5, "no routing decision yet"));

            match ctx.cognitive.evaluate(&state.request.input, &routing).await {
                Ok(result) => {
                    if result.template_used {
                        if let Some(rendered) = &result.rendered_output {
                            state.response_content = Some(rendered.clone());
                            if let Some(template) = &result.template {
                                state.emitter.template_used(template, result.template_match.unwrap_or(0.0));
                            }
                        }
                    }
                    state.cognitive = Some(result);
                }
                Err(e) => state.record_error(self.name(), e.to_string()),
            }
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
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
    async fn disabled_coordinator_produces_no_cognitive_metrics() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("hello"), bus.emitter_for("req-1"));

        CognitiveStage.execute(&ctx, &mut state).await;
        assert!(state.cognitive.is_none());
        assert!(state.stage_durations.contains_key("cognitive"));
    }
}
