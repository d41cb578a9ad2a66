//! A cognitive request-processing orchestrator.
//!
//! Every request flows through a staged pipeline (fingerprint, routing,
//! RAPID clarification gate, introspection, cognitive template matching,
//! knowledge retrieval, tool execution, LLM) onto a shared blackboard, with
//! a parallel lobe executive available for deeper agentic evaluation.
//!
//! # Modules
//!
//! - [`orchestrator`] - builds the stage list, drives execution, owns stats
//! - [`pipeline`] - the staged pipeline and its individual stages
//! - [`blackboard`] - the shared, concurrency-safe scratch space for a request
//! - [`lobe`] / [`executive`] - specialist fan-out and confidence aggregation
//! - [`coordinators`] - facade traits over cognitive/memory/persona/tools
//! - [`llm`] - the `LlmProvider` seam and completion/message types
//! - [`tools`] - the tool executor and builtin tools (bash, cd)
//! - [`scheduler`] - cron-driven background maintenance
//! - [`events`] - the activity event bus and JSONL logger
//! - [`domain`] - request/response/pipeline-state types
//! - [`heuristics`] / [`providers`] - pure classification helpers
//! - [`config`] - construction-time configuration
//! - [`cli`] - command-line interface

pub mod blackboard;
pub mod cli;
pub mod config;
pub mod coordinators;
pub mod domain;
pub mod events;
pub mod executive;
pub mod heuristics;
pub mod llm;
pub mod lobe;
pub mod orchestrator;
pub mod pipeline;
pub mod providers;
pub mod scheduler;
pub mod tools;

pub use config::{OrchestratorConfig, RapidConfig};
pub use domain::{Request, RequestContext, RequestType, Response, TokenMetrics};
pub use events::{EventBus, EventEmitter, EventLogger, create_event_bus};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, OrchestratorStats};
