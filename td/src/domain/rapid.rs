//! RAPID decision, per spec.md §3.
//!
//! RAPID levels: 5 = proceed; 2 = return clarification; 3-4 = proceed with
//! stated assumptions.

/// The confidence tier assigned by the RAPID gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RapidLevel {
    /// Level 2: confidence too low, input too ambiguous to proceed.
    ClarificationNeeded = 2,
    /// Level 3: proceed, but note a moderate assumption.
    ProceedWithAssumption = 3,
    /// Level 4: proceed, several stated assumptions.
    ProceedWithAssumptions = 4,
    /// Level 5: proceed outright.
    Proceed = 5,
}

/// Output of the RAPID gate stage (spec.md §3).
#[derive(Debug, Clone)]
pub struct RapidDecision {
    pub should_proceed: bool,
    pub clarification_needed: bool,
    pub clarification_question: Option<String>,
    pub confidence_score: f32,
    pub assumptions: Vec<String>,
    pub level: RapidLevel,
}

impl RapidDecision {
    pub fn proceed(confidence_score: f32) -> Self {
        Self {
            should_proceed: true,
            clarification_needed: false,
            clarification_question: None,
            confidence_score,
            assumptions: Vec::new(),
            level: RapidLevel::Proceed,
        }
    }

    pub fn proceed_with_assumptions(confidence_score: f32, assumptions: Vec<String>) -> Self {
        let level = if assumptions.len() > 1 {
            RapidLevel::ProceedWithAssumptions
        } else {
            RapidLevel::ProceedWithAssumption
        };
        Self {
            should_proceed: true,
            clarification_needed: false,
            clarification_question: None,
            confidence_score,
            assumptions,
            level,
        }
    }

    pub fn clarification(confidence_score: f32, question: impl Into<String>) -> Self {
        Self {
            should_proceed: false,
            clarification_needed: true,
            clarification_question: Some(question.into()),
            confidence_score,
            assumptions: Vec::new(),
            level: RapidLevel::ClarificationNeeded,
        }
    }
}
