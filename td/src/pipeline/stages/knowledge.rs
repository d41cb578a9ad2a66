//! knowledge stage (spec.md §4.2): "retrieve relevant strategic principles
//! (always, if configured) and — when a knowledge fabric is configured —
//! perform a tag-filtered semantic search bounded by a small k (e.g., 5).
//! Errors are non-fatal."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::PipelineState;
use crate::pipeline::{Stage, StageContext};

const SEMANTIC_SEARCH_K: usize = 5;

pub struct KnowledgeStage;

#[async_trait]
impl Stage for KnowledgeStage {
    fn name(&self) -> &'static str {
        "knowledge"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        if ctx.memory.enabled() {
            match ctx.memory.get_project_memory().await {
                Ok(project) => state.strategic_principles = project.conventions,
                Err(e) => state.record_error(self.name(), e.to_string()),
            }

            if ctx.config.enable_knowledge {
                match ctx
                    .memory
                    .search_archival(&state.request.input, &state.request.context.tags, SEMANTIC_SEARCH_K)
                    .await
                {
                    Ok(hits) => state.knowledge_hits = hits,
                    Err(e) => state.record_error(self.name(), e.to_string()),
                }
            }
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}
