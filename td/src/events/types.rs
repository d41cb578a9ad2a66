//! Event types for the orchestrator's activity stream
//!
//! These events represent all observable activity as a request flows
//! through the pipeline and lobe executive:
//! - Request lifecycle (received, response generated)
//! - Mode/persona changes
//! - Tool execution
//! - Cognitive template usage and memory updates
//! - Lobe (agent) lifecycle
//! - Interrupts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Core event enum - the vocabulary of the orchestrator's activity (spec.md
/// §3, "Event", and §4.6).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A request entered the orchestrator.
    RequestReceived {
        request_id: String,
        input_summary: String,
    },
    /// A response was produced (successfully or not) for a request.
    ResponseGenerated {
        request_id: String,
        success: bool,
        duration_ms: u64,
    },
    /// The active persona or mode changed.
    ModeChanged {
        request_id: Option<String>,
        mode: String,
        trigger: String,
    },
    /// A tool call completed (successfully or not).
    ToolExecuted {
        request_id: String,
        tool: String,
        args_summary: String,
        latency_ms: u64,
        success: bool,
        error: Option<String>,
    },
    /// A cognitive template was matched and rendered in place of an LLM call.
    TemplateUsed {
        request_id: String,
        template: String,
        similarity: f32,
    },
    /// A memory coordinator field was written.
    MemoryUpdated {
        request_id: Option<String>,
        field: String,
    },
    /// A lobe was launched by the executive.
    AgentStarted { request_id: String, lobe_id: String },
    /// A lobe finished (successfully or not) and reported a confidence.
    AgentCompleted {
        request_id: String,
        lobe_id: String,
        confidence: f32,
    },
    /// The orchestrator's in-flight processing for a request was interrupted.
    Interrupt {
        request_id: Option<String>,
        reason: String,
    },
}

impl Event {
    /// Get the request id this event is associated with, if any. Events not
    /// tied to a single request (e.g. a global mode change) return `None`.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Event::RequestReceived { request_id, .. }
            | Event::ResponseGenerated { request_id, .. }
            | Event::ToolExecuted { request_id, .. }
            | Event::TemplateUsed { request_id, .. }
            | Event::AgentStarted { request_id, .. }
            | Event::AgentCompleted { request_id, .. } => Some(request_id),
            Event::ModeChanged { request_id, .. }
            | Event::MemoryUpdated { request_id, .. }
            | Event::Interrupt { request_id, .. } => request_id.as_deref(),
        }
    }

    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::RequestReceived { .. } => "RequestReceived",
            Event::ResponseGenerated { .. } => "ResponseGenerated",
            Event::ModeChanged { .. } => "ModeChanged",
            Event::ToolExecuted { .. } => "ToolExecuted",
            Event::TemplateUsed { .. } => "TemplateUsed",
            Event::MemoryUpdated { .. } => "MemoryUpdated",
            Event::AgentStarted { .. } => "AgentStarted",
            Event::AgentCompleted { .. } => "AgentCompleted",
            Event::Interrupt { .. } => "Interrupt",
        }
    }
}

/// A timestamped event log entry for file persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventLogEntry {
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,
    pub event: Event,
}

impl EventLogEntry {
    pub fn new(event: Event) -> Self {
        Self {
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Convenience for summarizing arbitrary tool arguments into the
/// human-readable strings carried by [`Event::ToolExecuted`], without
/// dragging `serde_json::Value` through the emitter's call sites.
pub fn summarize_args(args: &Value) -> String {
    match args {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_request_id() {
        let event = Event::RequestReceived {
            request_id: "req-123".to_string(),
            input_summary: "hello".to_string(),
        };
        assert_eq!(event.request_id(), Some("req-123"));
    }

    #[test]
    fn test_event_without_request_id() {
        let event = Event::ModeChanged {
            request_id: None,
            mode: "agentic".to_string(),
            trigger: "user command".to_string(),
        };
        assert_eq!(event.request_id(), None);
    }

    #[test]
    fn test_event_type() {
        let event = Event::AgentCompleted {
            request_id: "req-123".to_string(),
            lobe_id: "reasoning".to_string(),
            confidence: 0.8,
        };
        assert_eq!(event.event_type(), "AgentCompleted");
    }

    #[test]
    fn test_event_serialization() {
        let event = Event::ToolExecuted {
            request_id: "req-123".to_string(),
            tool: "bash".to_string(),
            args_summary: "echo hi".to_string(),
            latency_ms: 12,
            success: true,
            error: None,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ToolExecuted"));
        assert!(json.contains("bash"));

        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.request_id(), Some("req-123"));
    }

    #[test]
    fn test_event_log_entry() {
        let event = Event::RequestReceived {
            request_id: "req-123".to_string(),
            input_summary: "test".to_string(),
        };
        let entry = EventLogEntry::new(event);

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("ts"));
        assert!(json.contains("RequestReceived"));
    }

    #[test]
    fn test_summarize_args() {
        assert_eq!(summarize_args(&Value::Null), "");
        assert_eq!(summarize_args(&Value::String("x".into())), "x");
        assert_eq!(summarize_args(&serde_json::json!({"a": 1})), "{\"a\":1}");
    }
}
