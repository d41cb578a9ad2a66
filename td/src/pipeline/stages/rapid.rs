//! RAPID gate stage (spec.md §3, §4.2): a confidence check between routing
//! and the main pipeline body that may return a clarifying question instead
//! of proceeding.

use async_trait::async_trait;
use std::time::Instant;

use crate::domain::{PipelineState, RapidDecision, TaskType};
use crate::heuristics::{can_answer_directly, is_personal_question, is_simple_conversation, is_simple_shell_command};
use crate::pipeline::{Stage, StageContext};

/// Inputs at or below this word count are eligible for the
/// ambiguity-triggered clarification path (spec.md §4.2: "If the input is
/// short AND ambiguous AND confidence is below threshold").
const SHORT_INPUT_WORD_LIMIT: usize = 5;

pub struct RapidGateStage;

#[async_trait]
impl Stage for RapidGateStage {
    fn name(&self) -> &'static str {
        "rapid_gate"
    }

    async fn execute(&self, ctx: &StageContext, state: &mut PipelineState) {
        let started = Instant::now();

        let rapid_config = ctx.config.rapid;
        let skip = !rapid_config.enabled
            || (rapid_config.skip_in_voice_mode && state.request.context.voice_mode)
            || is_trivially_answerable(&state.request.input);

        if skip {
            let confidence = state.routing.as_ref().map(|r| r.confidence).unwrap_or(1.0);
            state.rapid = Some(RapidDecision::proceed(confidence));
            state.stage_durations.insert(self.name().to_string(), started.elapsed());
            return;
        }

        let confidence = state.routing.as_ref().map(|r| r.confidence).unwrap_or(0.0);
        let task_type = state.routing.as_ref().map(|r| r.task_type).unwrap_or(TaskType::General);
        let word_count = state.request.input.split_whitespace().count();
        let short = word_count <= SHORT_INPUT_WORD_LIMIT;
        let ambiguous = confidence < rapid_config.min_confidence;

        if short && ambiguous {
            let question = clarification_question(task_type, &state.request.input);
            state.response_content = Some(question.clone());
            state.rapid = Some(RapidDecision::clarification(confidence, question));
        } else if ambiguous {
            let assumptions = vec![format!("assuming this is a {} task", task_type_name(task_type))];
            state.rapid = Some(RapidDecision::proceed_with_assumptions(confidence, assumptions));
        } else {
            state.rapid = Some(RapidDecision::proceed(confidence));
        }

        state.stage_durations.insert(self.name().to_string(), started.elapsed());
    }
}

fn is_trivially_answerable(input: &str) -> bool {
    is_simple_shell_command(input)
        || is_simple_conversation(input)
        || is_personal_question(input)
        || can_answer_directly(input)
}

fn clarification_question(task_type: TaskType, input: &str) -> String {
    format!(
        "Before I proceed with this {} request (\"{}\"), could you clarify what specifically you'd like done?",
        task_type_name(task_type),
        input.trim()
    )
}

fn task_type_name(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::General => "general",
        TaskType::CodeGen => "code generation",
        TaskType::Debug => "debugging",
        TaskType::Review => "review",
        TaskType::Planning => "planning",
        TaskType::Infrastructure => "infrastructure",
        TaskType::Explain => "explanation",
        TaskType::Refactor => "refactoring",
    }
}
