//! Cognitive result, per spec.md §3.

use std::collections::HashMap;

/// Recommended model tier for handling a request, produced alongside the
/// complexity score (spec.md §3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// Cheap/local model is sufficient.
    Local,
    /// Mid-sized cloud model.
    Standard,
    /// Largest available ("frontier") model, used when no template matched
    /// or complexity is high.
    Frontier,
}

/// Output of the cognitive stage when a cognitive coordinator is configured
/// (spec.md §3, §4.2).
#[derive(Debug, Clone, Default)]
pub struct CognitiveResult {
    pub template_used: bool,
    pub template: Option<String>,
    pub template_match: Option<f32>,
    pub rendered_output: Option<String>,
    pub extracted_variables: HashMap<String, String>,
    pub distillation_triggered: bool,
    pub distillation_result: Option<String>,
    pub complexity_score: f32,
    pub needs_decomposition: bool,
    pub model_tier: Option<ModelTier>,
}

impl CognitiveResult {
    pub fn no_match(complexity_score: f32, needs_decomposition: bool) -> Self {
        Self {
            complexity_score,
            needs_decomposition,
            model_tier: Some(ModelTier::Frontier),
            ..Default::default()
        }
    }

    pub fn template_hit(template: impl Into<String>, similarity: f32, rendered: impl Into<String>) -> Self {
        Self {
            template_used: true,
            template: Some(template.into()),
            template_match: Some(similarity),
            rendered_output: Some(rendered.into()),
            model_tier: Some(ModelTier::Local),
            ..Default::default()
        }
    }
}
