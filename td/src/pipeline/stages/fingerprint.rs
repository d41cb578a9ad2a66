//! fingerprint stage (spec.md §4.2): "if context lacks a fingerprint and
//! fingerprinting is enabled, detect platform/project info; attach. Errors
//! are non-fatal."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::PipelineState;
use crate::pipeline::{Stage, StageContext};

pub struct FingerprintStage;

#[async_trait]
impl Stage for FingerprintStage {
    fn name(&self) -> &'static str {
        "fingerprint"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        if ctx.config.enable_fingerprint && state.request.context.fingerprint.is_none() {
            let working_dir = state.request.context.working_dir.clone();
            let fingerprint = match working_dir.as_deref() {
                Some(dir) => ctx.project_cache.get_or_detect(dir),
                None => crate::domain::Fingerprint::detect(None),
            };
            state.request.context.fingerprint = Some(fingerprint);
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
    async fn attaches_fingerprint_when_missing() {
        let ctx = test_ctx();
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("ls"), bus.emitter_for("req-1"));

        FingerprintStage.execute(&ctx, &mut state).await;
        assert!(state.request.context.fingerprint.is_some());
        assert!(state.stage_durations.contains_key("fingerprint"));
    }

    #[tokio::test]
    async fn disabled_fingerprinting_leaves_context_untouched() {
        let mut ctx = test_ctx();
        ctx.config = Arc::new(crate::config::OrchestratorConfig {
            enable_fingerprint: false,
            ..crate::config::OrchestratorConfig::default()
        });
        let bus = create_event_bus();
        let mut state = PipelineState::new(Request::chat("ls"), bus.emitter_for("req-1"));

        FingerprintStage.execute(&ctx, &mut state).await;
        assert!(state.request.context.fingerprint.is_none());
    }
}
