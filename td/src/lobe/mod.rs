//! The lobe contract (spec.md §3, §4.3): a uniform capability implemented
//! by every specialized cognitive module that the lobe executive fans work
//! out to.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::blackboard::Blackboard;

/// The fixed, additive universe of lobe kinds (spec.md §3: "Every lobe is
/// identified by an id from a fixed set; new kinds are additive").
///
/// `Safety` and `Inhibition` are veto-gate classes: the executive always
/// runs them regardless of the selection threshold (spec.md §4.3 step 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LobeId {
    Reasoning,
    Memory,
    Planning,
    Creativity,
    Safety,
    Inhibition,
    Social,
    Technical,
}

impl LobeId {
    /// Safety-class lobes always run and act as veto gates (spec.md §4.3).
    pub fn is_veto_gate(&self) -> bool {
        matches!(self, LobeId::Safety | LobeId::Inhibition)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LobeId::Reasoning => "reasoning",
            LobeId::Memory => "memory",
            LobeId::Planning => "planning",
            LobeId::Creativity => "creativity",
            LobeId::Safety => "safety",
            LobeId::Inhibition => "inhibition",
            LobeId::Social => "social",
            LobeId::Technical => "technical",
        }
    }
}

impl std::fmt::Display for LobeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a lobe is given to work with (spec.md §3, "Lobe Input").
#[derive(Clone)]
pub struct LobeInput<'a> {
    pub raw_input: &'a str,
    pub blackboard: &'a Arc<Blackboard>,
}

/// A lobe's estimate of what it will cost to run, used by the executive
/// for resource-budget-constrained selection (spec.md §3, §4.3 step 1).
#[derive(Debug, Clone, Copy)]
pub struct ResourceEstimate {
    pub tokens: u64,
    pub time: Duration,
    pub requires_gpu: bool,
}

impl ResourceEstimate {
    pub fn new(tokens: u64, time: Duration, requires_gpu: bool) -> Self {
        Self {
            tokens,
            time,
            requires_gpu,
        }
    }
}

/// Output of a single lobe's `process` call (spec.md §3, "Lobe Result").
#[derive(Debug, Clone)]
pub struct LobeResult {
    pub lobe_id: LobeId,
    pub content: String,
    pub confidence: f32,
    pub duration: Duration,
    pub tokens_used: u64,
    pub model_used: Option<String>,
    pub cache_hit: bool,
    pub request_replan: bool,
    pub replan_reason: Option<String>,
    pub suggest_lobes: Vec<LobeId>,
    pub caveats: Vec<String>,
}

impl LobeResult {
    pub fn new(lobe_id: LobeId, content: impl Into<String>, confidence: f32, duration: Duration) -> Self {
        Self {
            lobe_id,
            content: content.into(),
            confidence: confidence.clamp(0.0, 1.0),
            duration,
            tokens_used: 0,
            model_used: None,
            cache_hit: false,
            request_replan: false,
            replan_reason: None,
            suggest_lobes: Vec::new(),
            caveats: Vec::new(),
        }
    }

    /// Mark this result as requesting a replan, with the lobes the
    /// executive should add to the next iteration's selection set
    /// (spec.md §4.3 step 3).
    pub fn with_replan(mut self, reason: impl Into<String>, suggest_lobes: Vec<LobeId>) -> Self {
        self.request_replan = true;
        self.replan_reason = Some(reason.into());
        self.suggest_lobes = suggest_lobes;
        self
    }
}

/// A pluggable cognitive module with a uniform contract (spec.md §4.3).
///
/// Implementations run concurrently against a shared [`Blackboard`]; they
/// must not assume ordering relative to other lobes within one request.
#[async_trait]
pub trait Lobe: Send + Sync {
    fn id(&self) -> LobeId;

    /// Pure, cheap self-scoring used for selection; must not perform I/O.
    fn can_handle(&self, input: &LobeInput<'_>) -> f32;

    fn resource_estimate(&self, input: &LobeInput<'_>) -> ResourceEstimate;

    async fn process(&self, input: LobeInput<'_>) -> Result<LobeResult, LobeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum LobeError {
    #[error("lobe {0} timed out")]
    Timeout(LobeId),
    #[error("lobe {0} exceeded its resource budget")]
    BudgetExceeded(LobeId),
    #[error("lobe {0} failed: {1}")]
    Failed(LobeId, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn veto_gate_classes_are_safety_and_inhibition() {
        assert!(LobeId::Safety.is_veto_gate());
        assert!(LobeId::Inhibition.is_veto_gate());
        assert!(!LobeId::Reasoning.is_veto_gate());
    }

    #[test]
    fn lobe_result_confidence_is_clamped() {
        let r = LobeResult::new(LobeId::Reasoning, "x", 1.4, Duration::from_millis(10));
        assert_eq!(r.confidence, 1.0);
    }

    #[test]
    fn with_replan_sets_fields() {
        let r = LobeResult::new(LobeId::Planning, "x", 0.5, Duration::from_millis(1))
            .with_replan("ambiguous", vec![LobeId::Memory]);
        assert!(r.request_replan);
        assert_eq!(r.replan_reason.as_deref(), Some("ambiguous"));
        assert_eq!(r.suggest_lobes, vec![LobeId::Memory]);
    }
}
