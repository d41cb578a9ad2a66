//! Domain types for the cognitive request-processing pipeline.
//!
//! These are the plain data types threaded through a single request's
//! lifetime: the inbound [`Request`], the [`PipelineState`] mutated by each
//! stage, and the outbound [`Response`]. None of these types carry behavior
//! beyond small constructors and accessors — the behavior lives in
//! `crate::pipeline` and `crate::orchestrator`.

mod cognitive;
mod fingerprint;
mod rapid;
mod request;
mod response;
mod routing;

pub use cognitive::{CognitiveResult, ModelTier};
pub use fingerprint::{Fingerprint, ProjectContextCache};
pub use rapid::{RapidDecision, RapidLevel};
pub use request::{Request, RequestContext, RequestType};
pub use response::{Response, TokenMetrics};
pub use routing::{RoutingDecision, TaskType};

use std::collections::HashMap;
use std::time::Duration;

use crate::events::EventEmitter;
use crate::llm::ToolDefinition;
use crate::tools::ToolResult;

/// Mutable state owned by a single request as it flows through the pipeline.
///
/// A `PipelineState` is created once per [`Request`] and lives only for the
/// duration of one `Orchestrator::process` call (see spec.md §3,
/// "Lifecycle = one request; not shared across requests").
pub struct PipelineState {
    pub request: Request,
    pub response_content: Option<String>,
    pub routing: Option<RoutingDecision>,
    pub rapid: Option<RapidDecision>,
    pub cognitive: Option<CognitiveResult>,
    pub knowledge_hits: Vec<KnowledgeHit>,
    pub strategic_principles: Vec<String>,
    pub tool_results: Vec<(String, ToolResult)>,
    pub available_tools: Vec<ToolDefinition>,
    pub llm_provider_used: Option<String>,
    pub llm_model_used: Option<String>,
    pub llm_model_logged: Option<String>,
    pub errors: Vec<String>,
    pub stage_durations: HashMap<String, Duration>,
    pub cancelled: bool,
    pub handled_early: bool,
    pub metadata: HashMap<String, serde_json::Value>,
    pub token_usage_local: u64,
    pub token_usage_external: u64,
    pub emitter: EventEmitter,
}

impl PipelineState {
    pub fn new(request: Request, emitter: EventEmitter) -> Self {
        Self {
            request,
            response_content: None,
            routing: None,
            rapid: None,
            cognitive: None,
            knowledge_hits: Vec::new(),
            strategic_principles: Vec::new(),
            tool_results: Vec::new(),
            available_tools: Vec::new(),
            llm_provider_used: None,
            llm_model_used: None,
            llm_model_logged: None,
            errors: Vec::new(),
            stage_durations: HashMap::new(),
            cancelled: false,
            handled_early: false,
            metadata: HashMap::new(),
            token_usage_local: 0,
            token_usage_external: 0,
            emitter,
        }
    }

    /// Record an error without aborting the pipeline (spec.md §4.1, failure policy).
    pub fn record_error(&mut self, stage: &str, message: impl Into<String>) {
        self.errors.push(format!("{stage}: {}", message.into()));
    }

    /// True once either the RAPID gate or the introspection stage has set a
    /// final response and asked remaining stages to be skipped.
    pub fn should_early_exit(&self) -> bool {
        self.handled_early || (self.rapid_requests_clarification() && self.response_content.is_some())
    }

    fn rapid_requests_clarification(&self) -> bool {
        matches!(
            self.rapid,
            Some(RapidDecision {
                clarification_needed: true,
                ..
            })
        )
    }
}

/// A single retrieved memory/knowledge passage (spec.md §3, Blackboard.Memories).
#[derive(Debug, Clone)]
pub struct KnowledgeHit {
    pub content: String,
    pub relevance: f32,
}
