//! routing stage (spec.md §4.2): "build a routing hint from fingerprint (if
//! any) and produce a routing decision."

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::{PipelineState, RoutingDecision, TaskType};
use crate::pipeline::{Stage, StageContext};

pub struct RoutingStage;

#[async_trait]
impl Stage for RoutingStage {
    fn name(&self) -> &'static str {
        "routing"
    }

    async fn execute(&self, _ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();
        state.routing = Some(classify(&state.request.input));
        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}

/// Ordered keyword classification: later classes are checked first so
/// domain-specific phrasing (e.g. "fix the bug") outranks generic verbs
/// (e.g. "explain").
pub(crate) fn classify(input: &str) -> RoutingDecision {
    let lower = input.to_lowercase();

    const DEBUG: &[&str] = &["fix the bug", "bug in", "debug", "crash", "stack trace", "failing test", "error:"];
    const REVIEW: &[&str] = &["review this", "code review", "review the", "pr feedback"];
    const PLANNING: &[&str] = &["plan for", "roadmap", "design doc", "how should we approach", "break down this"];
    const INFRASTRUCTURE: &[&str] = &["deploy", "ci pipeline", "kubernetes", "docker", "infrastructure", "terraform"];
    const REFACTOR: &[&str] = &["refactor", "clean up", "rename", "extract"];
    const EXPLAIN: &[&str] = &["explain", "what does", "how does", "walk me through"];
    const CODE_GEN: &[&str] = &["implement", "write a function", "add a", "create a", "generate"];

    let classes: &[(&[&str], TaskType)] = &[
        (DEBUG, TaskType::Debug),
        (REVIEW, TaskType::Review),
        (PLANNING, TaskType::Planning),
        (INFRASTRUCTURE, TaskType::Infrastructure),
        (REFACTOR, TaskType::Refactor),
        (EXPLAIN, TaskType::Explain),
        (CODE_GEN, TaskType::CodeGen),
    ];

    for (patterns, task_type) in classes {
        if patterns.iter().any(|p| lower.contains(p)) {
            let rationale = format!("matched {} pattern", task_type_name(*task_type));
            return RoutingDecision::new(*task_type, 0.75, rationale);
        }
    }

    RoutingDecision::new(TaskType::General, 0.5, "no specific pattern matched")
}

fn task_type_name(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::General => "general",
        TaskType::CodeGen => "code_gen",
        TaskType::Debug => "debug",
        TaskType::Review => "review",
        TaskType::Planning => "planning",
        TaskType::Infrastructure => "infrastructure",
        TaskType::Explain => "explain",
        TaskType::Refactor => "refactor",
    }
}
