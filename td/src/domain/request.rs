//! Request and its context, per spec.md §3.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of request being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestType {
    Chat,
    Command,
    Query,
}

/// A callback invoked by stages to report granular progress, e.g. streaming
/// tokens to a caller-supplied sink. Stored as a type-erased `Arc<dyn Fn>`
/// because closures cannot derive `Clone`/`Serialize`.
pub type StepCallback = std::sync::Arc<dyn Fn(&str) + Send + Sync>;

/// Immutable-once-created context accompanying a [`Request`] (spec.md §3:
/// "Request.context carries: working directory, platform fingerprint,
/// conversation history, active file, tags, model/provider override,
/// unrestricted flag, voice flag, per-step callback").
#[derive(Clone, Default)]
pub struct RequestContext {
    pub working_dir: Option<String>,
    pub fingerprint: Option<super::Fingerprint>,
    pub conversation_history: Vec<String>,
    pub active_file: Option<String>,
    pub tags: Vec<String>,
    pub model_override: Option<String>,
    pub provider_override: Option<String>,
    pub unrestricted: bool,
    pub voice_mode: bool,
    pub on_step: Option<StepCallback>,
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("working_dir", &self.working_dir)
            .field("fingerprint", &self.fingerprint)
            .field("conversation_history_len", &self.conversation_history.len())
            .field("active_file", &self.active_file)
            .field("tags", &self.tags)
            .field("model_override", &self.model_override)
            .field("provider_override", &self.provider_override)
            .field("unrestricted", &self.unrestricted)
            .field("voice_mode", &self.voice_mode)
            .field("on_step", &self.on_step.is_some())
            .finish()
    }
}

/// A single user request entering the orchestrator (spec.md §3).
///
/// `id` and `timestamp` are populated on entry if the caller left them
/// unset; the request is treated as immutable once the pipeline begins.
#[derive(Debug, Clone)]
pub struct Request {
    pub id: String,
    pub request_type: RequestType,
    pub input: String,
    pub session_id: Option<String>,
    pub context: RequestContext,
    pub timestamp: DateTime<Utc>,
}

impl Request {
    /// Build a chat request with a freshly generated id and current timestamp.
    pub fn chat(input: impl Into<String>) -> Self {
        Self::new(RequestType::Chat, input)
    }

    pub fn command(input: impl Into<String>) -> Self {
        Self::new(RequestType::Command, input)
    }

    pub fn query(input: impl Into<String>) -> Self {
        Self::new(RequestType::Query, input)
    }

    fn new(request_type: RequestType, input: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            request_type,
            input: input.into(),
            session_id: None,
            context: RequestContext::default(),
            timestamp: Utc::now(),
        }
    }

    /// Fill in `id`/`timestamp` if the caller left them default — mirrors
    /// `Orchestrator::Process`'s "Assigns id/timestamp if missing" (spec.md §4.1).
    pub fn ensure_identity(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}
