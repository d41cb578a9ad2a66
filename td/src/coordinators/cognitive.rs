//! Cognitive coordinator (spec.md §4.5): Route, RenderTemplate,
//! RenderTemplateSimple, Distill, RecordFeedback, Analyze, Decompose,
//! Enabled, Stats, Initialize/Shutdown.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::CoordinatorError;
use crate::domain::{CognitiveResult, RoutingDecision};

#[derive(Debug, Clone, Copy, Default)]
pub struct CognitiveStats {
    pub templates_rendered: u64,
    pub distillations: u64,
}

#[async_trait]
pub trait CognitiveCoordinator: Send + Sync {
    fn enabled(&self) -> bool;

    async fn initialize(&self) -> Result<(), CoordinatorError>;
    async fn shutdown(&self) -> Result<(), CoordinatorError>;

    /// Semantic routing over a library of templates; returns the best match
    /// and its similarity, if any clears the coordinator's own threshold.
    async fn route(&self, input: &str) -> Result<Option<(String, f32)>, CoordinatorError>;

    async fn render_template(
        &self,
        template: &str,
        variables: &HashMap<String, String>,
    ) -> Result<String, CoordinatorError>;

    async fn render_template_simple(&self, template: &str) -> Result<String, CoordinatorError> {
        self.render_template(template, &HashMap::new()).await
    }

    async fn distill(&self, input: &str) -> Result<String, CoordinatorError>;

    async fn record_feedback(&self, template: &str, helpful: bool) -> Result<(), CoordinatorError>;

    /// Complexity score in `[0,1]` plus whether the request should be
    /// decomposed into sub-tasks (spec.md §3, Cognitive Result).
    async fn analyze(&self, input: &str) -> Result<(f32, bool), CoordinatorError>;

    async fn decompose(&self, input: &str) -> Result<Vec<String>, CoordinatorError>;

    fn stats(&self) -> CognitiveStats;

    /// Run the full cognitive stage contract and build a [`CognitiveResult`]
    /// (spec.md §4.2, cognitive stage).
    async fn evaluate(&self, input: &str, _routing: &RoutingDecision) -> Result<CognitiveResult, CoordinatorError> {
        if let Some((template, similarity)) = self.route(input).await? {
            if similarity >= 0.55 {
                let rendered = self.render_template_simple(&template).await?;
                return Ok(CognitiveResult::template_hit(template, similarity, rendered));
            }
        }
        let (complexity, needs_decomposition) = self.analyze(input).await?;
        Ok(CognitiveResult::no_match(complexity, needs_decomposition))
    }
}

/// Disabled variant used when no cognitive coordinator is configured.
#[derive(Default)]
pub struct NoopCognitiveCoordinator {
    calls: AtomicU64,
}

#[async_trait]
impl CognitiveCoordinator for NoopCognitiveCoordinator {
    fn enabled(&self) -> bool {
        false
    }

    async fn initialize(&self) -> Result<(), CoordinatorError> {
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), CoordinatorError> {
        Ok(())
    }

    async fn route(&self, _input: &str) -> Result<Option<(String, f32)>, CoordinatorError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(None)
    }

    async fn render_template(
        &self,
        _template: &str,
        _variables: &HashMap<String, String>,
    ) -> Result<String, CoordinatorError> {
        Err(CoordinatorError::NotConfigured { capability: "cognitive" })
    }

    async fn distill(&self, _input: &str) -> Result<String, CoordinatorError> {
        Err(CoordinatorError::NotConfigured { capability: "cognitive" })
    }

    async fn record_feedback(&self, _template: &str, _helpful: bool) -> Result<(), CoordinatorError> {
        Ok(())
    }

    async fn analyze(&self, _input: &str) -> Result<(f32, bool), CoordinatorError> {
        Ok((0.0, false))
    }

    async fn decompose(&self, _input: &str) -> Result<Vec<String>, CoordinatorError> {
        Ok(Vec::new())
    }

    fn stats(&self) -> CognitiveStats {
        CognitiveStats::default()
    }

    async fn evaluate(&self, _input: &str, _routing: &RoutingDecision) -> Result<CognitiveResult, CoordinatorError> {
        Ok(CognitiveResult::no_match(0.0, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskType;

    #[tokio::test]
    async fn noop_coordinator_is_disabled_and_produces_no_template_match() {
        let coordinator = NoopCognitiveCoordinator::default();
        assert!(!coordinator.enabled());
        let routing = RoutingDecision::new(TaskType::General, 0.5, "test");
        let result = coordinator.evaluate("hello", &routing).await.unwrap();
        assert!(!result.template_used);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let coordinator = NoopCognitiveCoordinator::default();
        coordinator.initialize().await.unwrap();
        coordinator.initialize().await.unwrap();
    }
}
