//! Event Bus Architecture for orchestrator observability
//!
//! Every significant orchestrator action emits an event. Consumers (the
//! file logger, and eventually external callers) subscribe to the bus.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       EVENT BUS                              │
//! │            (tokio::sync::broadcast channel)                  │
//! └─────────────────────────────────────────────────────────────┘
//!         ↑               ↑               ↑               ↑
//!     Pipeline        Lobe Executive   Coordinators    Orchestrator
//!     emits:          emits:           emit:           emits:
//!     - RequestReceived - AgentStarted - MemoryUpdated - ModeChanged
//!     - ToolExecuted     - AgentCompleted - TemplateUsed - Interrupt
//!         ↓               ↓               ↓               ↓
//!              ┌────────────────────────────────┐
//!              │     File Logger (.jsonl)        │
//!              └────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use cortex::events::{EventBus, EventEmitter};
//! use std::sync::Arc;
//!
//! let event_bus = Arc::new(EventBus::with_default_capacity());
//! let emitter = event_bus.emitter_for("request-123");
//!
//! emitter.request_received("explain this error");
//! emitter.agent_started("reasoning");
//!
//! let mut rx = event_bus.subscribe();
//! while let Ok(event) = rx.recv().await {
//!     println!("Event: {:?}", event);
//! }
//! ```

mod bus;
mod logger;
mod types;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventEmitter, create_event_bus};
pub use logger::{EventLogger, read_request_events, replay_request_events, spawn_event_logger};
pub use types::{Event, EventLogEntry};
