//! The orchestrator (spec.md §4.1): builds the stage list per request,
//! applies a timeout, drives stage execution, emits events, and updates
//! running stats.

mod stats;

pub use stats::OrchestratorStats;

use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::config::OrchestratorConfig;
use crate::coordinators::{CognitiveCoordinator, CoordinatorError, MemoryCoordinator, Mode, Persona, PersonaCoordinator, ToolsCoordinator};
use crate::domain::{PipelineState, Request, Response, RoutingDecision, TaskType};
use crate::events::{EventBus, EventEmitter};
use crate::llm::{LlmProvider, ToolCall, ToolResult};
use crate::pipeline::stages::routing::classify;
use crate::pipeline::{build_stage_list, StageContext};
use crate::tools::ToolContext;

/// The "stream slot": at most one in-flight cancellable operation per
/// orchestrator instance (spec.md §5, "Active-stream handle ...
/// mutex-protected; only one stream at a time per orchestrator instance").
struct StreamSlot {
    token: CancellationToken,
    /// Signaled once by the holder when it finishes, so a concurrent
    /// `Interrupt` never fires into a slot whose request already completed.
    done_tx: Option<oneshot::Sender<()>>,
}

pub struct Orchestrator {
    config: OrchestratorConfig,
    cognitive: Arc<dyn CognitiveCoordinator>,
    memory: Arc<dyn MemoryCoordinator>,
    persona: Arc<dyn PersonaCoordinator>,
    tools: Arc<dyn ToolsCoordinator>,
    llm: Option<Arc<dyn LlmProvider>>,
    project_cache: Arc<crate::domain::ProjectContextCache>,
    event_bus: Arc<EventBus>,
    stream_slot: Mutex<Option<StreamSlot>>,
    stats: OrchestratorStats,
}

pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    cognitive: Arc<dyn CognitiveCoordinator>,
    memory: Arc<dyn MemoryCoordinator>,
    persona: Arc<dyn PersonaCoordinator>,
    tools: Arc<dyn ToolsCoordinator>,
    llm: Option<Arc<dyn LlmProvider>>,
    event_bus: Arc<EventBus>,
}

impl OrchestratorBuilder {
    pub fn new(
        config: OrchestratorConfig,
        cognitive: Arc<dyn CognitiveCoordinator>,
        memory: Arc<dyn MemoryCoordinator>,
        persona: Arc<dyn PersonaCoordinator>,
        tools: Arc<dyn ToolsCoordinator>,
    ) -> Self {
        Self {
            config,
            cognitive,
            memory,
            persona,
            tools,
            llm: None,
            event_bus: crate::events::create_event_bus(),
        }
    }

    pub fn with_llm(mut self, llm: Arc<dyn LlmProvider>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn build(self) -> Orchestrator {
        Orchestrator {
            config: self.config,
            cognitive: self.cognitive,
            memory: self.memory,
            persona: self.persona,
            tools: self.tools,
            llm: self.llm,
            project_cache: Arc::new(crate::domain::ProjectContextCache::new(std::time::Duration::from_secs(300))),
            event_bus: self.event_bus,
            stream_slot: Mutex::new(None),
            stats: OrchestratorStats::default(),
        }
    }
}

impl Orchestrator {
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    pub fn stats(&self) -> stats::StatsSnapshot {
        self.stats.snapshot()
    }

    /// Process one request end to end (spec.md §4.1).
    pub async fn process(&self, mut request: Request) -> Response {
        request.ensure_identity();
        let emitter = self.event_bus.emitter_for(request.id.clone());
        emitter.request_received(&request.input);

        let started = Instant::now();
        let cancel_token = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        self.occupy_stream_slot(cancel_token.clone(), done_tx);

        let ctx = StageContext {
            cognitive: self.cognitive.clone(),
            memory: self.memory.clone(),
            persona: self.persona.clone(),
            tools: self.tools.clone(),
            llm: self.llm.clone(),
            project_cache: self.project_cache.clone(),
            config: Arc::new(self.config.clone()),
        };

        let stages = build_stage_list(&request.input, &self.config);
        let mut state = PipelineState::new(request, emitter.clone());

        let run = async {
            for stage in &stages {
                if state.should_early_exit() {
                    break;
                }
                stage.execute(&ctx, &mut state).await;
            }
        };

        tokio::select! {
            _ = run => {}
            _ = cancel_token.cancelled() => {
                state.cancelled = true;
            }
            _ = tokio::time::sleep(self.config.default_timeout) => {
                state.cancelled = true;
                state.record_error("orchestrator", "request exceeded the default timeout");
            }
        }

        self.vacate_stream_slot();
        let _ = done_rx.try_recv();

        let task_hint = state.routing.as_ref().map(|r| r.task_type).unwrap_or(TaskType::General);
        let success = state.errors.is_empty() && !state.cancelled;
        self.stats.record(success, state.cancelled, state.tool_results.len() as u64, state.knowledge_hits.len() as u64, task_hint);

        let duration = started.elapsed();
        emitter.response_generated(success, duration.as_millis() as u64);

        Response::from_state(state, duration)
    }

    fn occupy_stream_slot(&self, token: CancellationToken, done_tx: oneshot::Sender<()>) {
        let mut slot = self.stream_slot.lock().unwrap();
        *slot = Some(StreamSlot { token, done_tx: Some(done_tx) });
    }

    fn vacate_stream_slot(&self) {
        let mut slot = self.stream_slot.lock().unwrap();
        if let Some(mut occupied) = slot.take() {
            if let Some(tx) = occupied.done_tx.take() {
                let _ = tx.send(());
            }
        }
    }

    /// Cancel the active stream, if any (spec.md §4.1, §8 invariant #8:
    /// idempotent, no-op when nothing is in flight).
    pub fn interrupt(&self, reason: &str) {
        let slot = self.stream_slot.lock().unwrap();
        match slot.as_ref() {
            Some(occupied) => {
                occupied.token.cancel();
                self.event_bus.emitter_for("orchestrator").interrupt(reason);
            }
            None => {
                warn!(reason, "Orchestrator::interrupt: no active stream");
            }
        }
    }

    /// Pure classification, no side effects (spec.md §4.1).
    pub fn route(&self, input: &str) -> RoutingDecision {
        classify(input)
    }

    /// Delegate straight to the tools coordinator, bypassing the pipeline
    /// (spec.md §4.1).
    pub async fn execute_tool(&self, call: &ToolCall, tool_ctx: &ToolContext) -> ToolResult {
        self.tools.execute(call, tool_ctx).await
    }

    pub async fn set_persona(&self, id: &str) -> Result<(), CoordinatorError> {
        self.persona.set_active_persona(id).await
    }

    pub async fn get_active_persona(&self) -> Result<Persona, CoordinatorError> {
        self.persona.get_active_persona().await
    }

    /// Publishes `ModeChanged` on success (spec.md §4.1).
    pub async fn set_mode(&self, mode: Mode, trigger: &str) -> Result<(), CoordinatorError> {
        let emitter = self.event_bus.emitter_for("orchestrator");
        self.persona.set_mode(mode, trigger, &emitter).await
    }

    pub async fn get_active_mode(&self) -> Mode {
        self.persona.get_active_mode().await
    }
}
