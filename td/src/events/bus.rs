//! Event Bus - central pub/sub system for orchestrator events
//!
//! The EventBus uses tokio broadcast channels to deliver events to all
//! subscribers with minimal latency. Stages, the lobe executive, and
//! coordinators emit events; consumers (event logger, future UIs) subscribe.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use super::types::{Event, summarize_args};

/// Default channel capacity (events).
pub const DEFAULT_CHANNEL_CAPACITY: usize = 10_000;

/// Central event bus for orchestrator activity streaming.
///
/// Every significant action emits an event to this bus. All consumers
/// (file logger, external callers) subscribe to receive events.
pub struct EventBus {
    tx: broadcast::Sender<Event>,
    #[allow(dead_code)]
    channel_capacity: usize,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        debug!(capacity, "EventBus::new: creating event bus");
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            channel_capacity: capacity,
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Emit an event to all subscribers. Fire-and-forget: if there are no
    /// subscribers, the event is dropped; if the channel is full, the
    /// oldest buffered event is dropped for the slowest subscriber.
    pub fn emit(&self, event: Event) {
        debug!(
            event_type = event.event_type(),
            request_id = event.request_id(),
            "EventBus::emit"
        );
        let _ = self.tx.send(event);
    }

    /// Subscribe to receive events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        debug!("EventBus::subscribe: new subscriber");
        self.tx.subscribe()
    }

    /// Create an emitter handle bound to a single request id.
    pub fn emitter_for(&self, request_id: impl Into<String>) -> EventEmitter {
        let request_id = request_id.into();
        debug!(%request_id, "EventBus::emitter_for: creating emitter");
        EventEmitter {
            tx: self.tx.clone(),
            request_id,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

/// Handle for components to emit events without owning the bus.
///
/// Cheap to clone; bound to a single request id, matching spec.md §4.6's
/// "an `EventEmitter` handle bound to a request id".
#[derive(Clone)]
pub struct EventEmitter {
    tx: broadcast::Sender<Event>,
    request_id: String,
}

impl EventEmitter {
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn emit(&self, event: Event) {
        debug!(event_type = event.event_type(), "EventEmitter::emit");
        let _ = self.tx.send(event);
    }

    // === Convenience methods, one per Event variant ===

    pub fn request_received(&self, input_summary: &str) {
        self.emit(Event::RequestReceived {
            request_id: self.request_id.clone(),
            input_summary: input_summary.to_string(),
        });
    }

    pub fn response_generated(&self, success: bool, duration_ms: u64) {
        self.emit(Event::ResponseGenerated {
            request_id: self.request_id.clone(),
            success,
            duration_ms,
        });
    }

    /// Mode/persona change. Not bound to this emitter's request id when
    /// `global` is true, matching the orchestrator-level `SetMode`/
    /// `SetPersona` calls that happen outside any single request.
    pub fn mode_changed(&self, mode: &str, trigger: &str, global: bool) {
        self.emit(Event::ModeChanged {
            request_id: if global { None } else { Some(self.request_id.clone()) },
            mode: mode.to_string(),
            trigger: trigger.to_string(),
        });
    }

    pub fn tool_executed(&self, tool: &str, args: &Value, latency_ms: u64, success: bool, error: Option<&str>) {
        self.emit(Event::ToolExecuted {
            request_id: self.request_id.clone(),
            tool: tool.to_string(),
            args_summary: summarize_args(args),
            latency_ms,
            success,
            error: error.map(str::to_string),
        });
    }

    pub fn template_used(&self, template: &str, similarity: f32) {
        self.emit(Event::TemplateUsed {
            request_id: self.request_id.clone(),
            template: template.to_string(),
            similarity,
        });
    }

    pub fn memory_updated(&self, field: &str) {
        self.emit(Event::MemoryUpdated {
            request_id: Some(self.request_id.clone()),
            field: field.to_string(),
        });
    }

    pub fn agent_started(&self, lobe_id: &str) {
        self.emit(Event::AgentStarted {
            request_id: self.request_id.clone(),
            lobe_id: lobe_id.to_string(),
        });
    }

    pub fn agent_completed(&self, lobe_id: &str, confidence: f32) {
        self.emit(Event::AgentCompleted {
            request_id: self.request_id.clone(),
            lobe_id: lobe_id.to_string(),
            confidence,
        });
    }

    pub fn interrupt(&self, reason: &str) {
        self.emit(Event::Interrupt {
            request_id: Some(self.request_id.clone()),
            reason: reason.to_string(),
        });
    }
}

/// Create an event bus wrapped in an Arc for shared ownership.
pub fn create_event_bus() -> Arc<EventBus> {
    Arc::new(EventBus::with_default_capacity())
}
