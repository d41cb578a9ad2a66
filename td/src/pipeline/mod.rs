//! The staged pipeline (spec.md §2, §4.2): ordered units, each with a
//! single well-defined effect on [`PipelineState`], that the orchestrator
//! strings together per request.

pub mod stages;

use std::sync::Arc;

use async_trait::async_trait;

use crate::coordinators::{CognitiveCoordinator, MemoryCoordinator, PersonaCoordinator, ToolsCoordinator};
use crate::domain::{Fingerprint, ProjectContextCache};
use crate::llm::LlmProvider;
use crate::domain::PipelineState;

/// Shared, read-mostly collaborators every stage may consult (spec.md §5:
/// "Specialists table, coordinators, event bus ... read-mostly, set at
/// construction"). Built once by the orchestrator and handed to each stage.
pub struct StageContext {
    pub cognitive: Arc<dyn CognitiveCoordinator>,
    pub memory: Arc<dyn MemoryCoordinator>,
    pub persona: Arc<dyn PersonaCoordinator>,
    pub tools: Arc<dyn ToolsCoordinator>,
    pub llm: Option<Arc<dyn LlmProvider>>,
    pub project_cache: Arc<ProjectContextCache>,
    pub config: Arc<crate::config::OrchestratorConfig>,
}

/// One stage in the pipeline (spec.md §4.2: "a single `Execute(ctx, state)
/// → error` method. Stages are side-effecting on `state` only").
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState);
}

/// Build the stage list for one request (spec.md §4.1, fast-path decision).
///
/// Fast path: `{fingerprint, routing, introspection, knowledge, tool
/// execution, LLM}` — RAPID gate and cognitive are skipped. The fast path
/// still runs introspection; this is intentional (spec.md §9, Open
/// Question: "self-knowledge queries should not be misrouted as shell
/// commands").
pub fn build_stage_list(raw_input: &str, config: &crate::config::OrchestratorConfig) -> Vec<Arc<dyn Stage>> {
    let fast_path = config.skip_routing_for_simple_commands && crate::heuristics::is_simple_shell_command(raw_input);

    let mut list: Vec<Arc<dyn Stage>> = vec![
        Arc::new(stages::fingerprint::FingerprintStage),
        Arc::new(stages::routing::RoutingStage),
    ];

    if !fast_path {
        list.push(Arc::new(stages::rapid::RapidGateStage));
    }

    list.push(Arc::new(stages::introspection::IntrospectionStage));

    if !fast_path {
        list.push(Arc::new(stages::cognitive::CognitiveStage));
    }

    list.push(Arc::new(stages::knowledge::KnowledgeStage));
    list.push(Arc::new(stages::tool_execution::ToolExecutionStage));
    list.push(Arc::new(stages::llm::LlmStage));

    list
}

pub use crate::domain::PipelineState as State;

/// Record the fingerprint on the request context when detection is enabled
/// and not already present (shared helper used by the fingerprint stage and
/// tested independently of the async stage machinery).
pub fn detect_fingerprint_if_missing(existing: Option<&Fingerprint>, working_dir: Option<&str>) -> Option<Fingerprint> {
    if existing.is_some() {
        return None;
    }
    Some(Fingerprint::detect(working_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_excludes_rapid_and_cognitive_stages() {
        let config = crate::config::OrchestratorConfig::default();
        let stages = build_stage_list("ls -la", &config);
        let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
        assert!(!names.contains(&"rapid_gate"));
        assert!(!names.contains(&"cognitive"));
        assert!(names.contains(&"introspection"));
    }

    #[test]
    fn full_path_includes_all_stages() {
        let config = crate::config::OrchestratorConfig::default();
        let stages = build_stage_list("Fix the bug in login", &config);
        let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
        assert!(names.contains(&"rapid_gate"));
        assert!(names.contains(&"cognitive"));
    }

    #[test]
    fn personal_question_does_not_take_fast_path() {
        let config = crate::config::OrchestratorConfig::default();
        let stages = build_stage_list("who am I?", &config);
        let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
        assert!(names.contains(&"rapid_gate"));
    }
}
