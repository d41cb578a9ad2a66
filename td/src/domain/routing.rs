//! Routing decision, per spec.md §3.

use serde::{Deserialize, Serialize};

/// The kind of work a request represents, used to steer prompt construction
/// and model tier selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    General,
    CodeGen,
    Debug,
    Review,
    Planning,
    Infrastructure,
    Explain,
    Refactor,
}

/// Output of the routing stage (spec.md §3: "Produced by the routing stage
/// from the input plus platform hints").
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub task_type: TaskType,
    pub confidence: f32,
    pub rationale: String,
}

impl RoutingDecision {
    pub fn new(task_type: TaskType, confidence: f32, rationale: impl Into<String>) -> Self {
        debug_assert!((0.0..=1.0).contains(&confidence));
        Self {
            task_type,
            confidence: confidence.clamp(0.0, 1.0),
            rationale: rationale.into(),
        }
    }
}
