//! Response and token metrics, per spec.md §3.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

use crate::providers::is_local_provider;
use crate::tools::ToolResult;

use super::{KnowledgeHit, RoutingDecision};

/// Split of accumulated token usage between local and externally-hosted
/// providers, inferred from whichever provider names were actually used
/// during the request (spec.md §3: "splits accumulated tokens into local
/// vs external by inferred provider").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenMetrics {
    pub local_tokens: u64,
    pub external_tokens: u64,
}

impl TokenMetrics {
    /// Classify `tokens` as local or external using `provider_hint` when the
    /// caller knows its own provider, falling back to name-based inference
    /// otherwise (spec.md §9, Open Question on `"unknown"` providers).
    pub fn record(&mut self, tokens: u64, provider_hint: Option<&str>) {
        let is_local = match provider_hint {
            Some(p) => is_local_provider(p),
            None => false,
        };
        if is_local {
            self.local_tokens += tokens;
        } else {
            self.external_tokens += tokens;
        }
    }
}

/// The single response produced for a [`Request`](super::Request)
/// (spec.md §3).
#[derive(Debug, Clone)]
pub struct Response {
    pub request_id: String,
    pub success: bool,
    pub content: String,
    pub tool_results: Vec<(String, ToolResult)>,
    pub knowledge_used: Vec<KnowledgeHit>,
    pub routing: Option<RoutingDecision>,
    pub error: Option<String>,
    pub metadata: HashMap<String, serde_json::Value>,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
    pub token_metrics: TokenMetrics,
    pub cancelled: bool,
}

impl Response {
    /// Construct the response builder result from a finished
    /// [`PipelineState`](super::PipelineState). The response builder
    /// "consolidates all recorded errors into a single joined message"
    /// (spec.md §7, Propagation policy).
    pub fn from_state(state: super::PipelineState, duration: Duration) -> Self {
        let error = if state.errors.is_empty() {
            None
        } else {
            Some(state.errors.join("; "))
        };
        let success = error.is_none() && !state.cancelled;

        let mut metadata = state.metadata;
        if state.cancelled {
            metadata.insert("cancelled".to_string(), serde_json::Value::Bool(true));
        }

        let token_metrics = TokenMetrics {
            local_tokens: state.token_usage_local,
            external_tokens: state.token_usage_external,
        };

        Self {
            request_id: state.request.id,
            success,
            content: state.response_content.unwrap_or_default(),
            tool_results: state.tool_results,
            knowledge_used: state.knowledge_hits,
            routing: state.routing,
            error,
            metadata,
            duration,
            timestamp: Utc::now(),
            token_metrics,
            cancelled: state.cancelled,
        }
    }
}
