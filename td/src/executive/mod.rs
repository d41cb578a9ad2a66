//! The lobe executive (spec.md §4.3): selects applicable lobes for an
//! input, runs them concurrently against a shared blackboard, honors
//! replan requests, enforces resource budgets, and aggregates results.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::blackboard::Blackboard;
use crate::events::EventEmitter;
use crate::lobe::{Lobe, LobeId, LobeInput, LobeResult};

/// Confidence below which a non-veto-gate lobe is dropped during selection
/// (spec.md §4.3 step 1).
pub const SELECTION_THRESHOLD: f32 = 0.3;

/// Bound on additional replan iterations, to prevent livelock
/// (spec.md §4.3 step 3, §9 design note).
pub const MAX_REPLAN_ITERATIONS: u32 = 2;

/// Tolerance factor over a lobe's declared time budget before it is
/// cancelled (spec.md §4.3 step 5).
pub const BUDGET_TOLERANCE: f32 = 1.5;

/// Total resource budget available to one executive run (spec.md §4.3
/// step 1, "subject to a total resource budget").
#[derive(Debug, Clone, Copy)]
pub struct ResourceBudget {
    pub max_tokens: u64,
    pub max_concurrent: usize,
}

impl Default for ResourceBudget {
    fn default() -> Self {
        Self {
            max_tokens: 50_000,
            max_concurrent: 8,
        }
    }
}

/// Outcome of one executive run: the collected lobe results, the updated
/// blackboard, and whether a safety/inhibition veto fired.
pub struct ExecutiveOutcome {
    pub results: Vec<LobeResult>,
    pub overall_confidence: f32,
    pub blocked: bool,
    pub block_reason: Option<String>,
}

pub struct LobeExecutive {
    lobes: Vec<Arc<dyn Lobe>>,
    budget: ResourceBudget,
}

impl LobeExecutive {
    pub fn new(lobes: Vec<Arc<dyn Lobe>>, budget: ResourceBudget) -> Self {
        Self { lobes, budget }
    }

    /// Select lobes for this input: top-N by confidence above
    /// [`SELECTION_THRESHOLD`], subject to the token budget, plus any
    /// veto-gate lobes unconditionally (spec.md §4.3 step 1).
    fn select(&self, input: &LobeInput<'_>) -> Vec<Arc<dyn Lobe>> {
        let mut scored: Vec<(Arc<dyn Lobe>, f32)> = self
            .lobes
            .iter()
            .map(|lobe| (Arc::clone(lobe), lobe.can_handle(input)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let mut selected = Vec::new();
        let mut token_total = 0u64;

        for (lobe, confidence) in scored {
            let is_veto_gate = lobe.id().is_veto_gate();
            if !is_veto_gate && confidence < SELECTION_THRESHOLD {
                continue;
            }
            let estimate = lobe.resource_estimate(input);
            if !is_veto_gate && token_total + estimate.tokens > self.budget.max_tokens {
                continue;
            }
            token_total += estimate.tokens;
            selected.push(lobe);
            if selected.len() >= self.budget.max_concurrent {
                break;
            }
        }
        selected
    }

    /// Run selection → launch → collect → (replan loop) → aggregate for a
    /// single request (spec.md §4.3).
    pub async fn run(&self, raw_input: &str, blackboard: &Arc<Blackboard>, emitter: &EventEmitter) -> ExecutiveOutcome {
        let mut active_extra: HashSet<LobeId> = HashSet::new();
        let mut last_results = Vec::new();
        let mut iteration = 0;

        loop {
            let input = LobeInput {
                raw_input,
                blackboard,
            };
            let mut selected = self.select(&input);
            if !active_extra.is_empty() {
                for lobe in &self.lobes {
                    if active_extra.contains(&lobe.id()) && !selected.iter().any(|l| l.id() == lobe.id()) {
                        selected.push(Arc::clone(lobe));
                    }
                }
            }

            let round_results = self.launch_and_collect(&selected, raw_input, blackboard, emitter).await;

            let replan = round_results.iter().find(|r| r.request_replan);
            last_results = round_results;

            if let Some(replan) = replan {
                if iteration >= MAX_REPLAN_ITERATIONS {
                    debug!(iteration, "LobeExecutive::run: replan bound reached, proceeding with last results");
                    break;
                }
                warn!(reason = ?replan.replan_reason, "LobeExecutive::run: replan requested");
                active_extra.extend(replan.suggest_lobes.iter().copied());
                iteration += 1;
                continue;
            }
            break;
        }

        self.aggregate(last_results)
    }

    async fn launch_and_collect(
        &self,
        lobes: &[Arc<dyn Lobe>],
        raw_input: &str,
        blackboard: &Arc<Blackboard>,
        emitter: &EventEmitter,
    ) -> Vec<LobeResult> {
        let mut set = tokio::task::JoinSet::new();

        for lobe in lobes {
            let lobe = Arc::clone(lobe);
            let raw_input = raw_input.to_string();
            let emitter = emitter.clone();
            // Lobes share one blackboard reference; the blackboard's own
            // synchronization serializes concurrent writes (spec.md §4.3
            // step 2).
            let blackboard = Arc::clone(blackboard);
            set.spawn(async move {
                let lobe_id = lobe.id();
                emitter.agent_started(lobe_id.as_str());
                let input = LobeInput {
                    raw_input: &raw_input,
                    blackboard: &blackboard,
                };
                let estimate = lobe.resource_estimate(&input);
                let timeout = Duration::from_secs_f32(estimate.time.as_secs_f32() * BUDGET_TOLERANCE);
                let started = Instant::now();
                let outcome = tokio::time::timeout(timeout, lobe.process(input)).await;
                (lobe_id, outcome, started.elapsed())
            });
        }

        let mut results = Vec::new();
        while let Some(joined) = set.join_next().await {
            let (lobe_id, outcome, elapsed) = match joined {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "LobeExecutive::launch_and_collect: task panicked");
                    continue;
                }
            };
            match outcome {
                Ok(Ok(result)) => {
                    emitter.agent_completed(lobe_id.as_str(), result.confidence);
                    results.push(result);
                }
                Ok(Err(e)) => {
                    warn!(%lobe_id, error = %e, "LobeExecutive::launch_and_collect: lobe failed");
                }
                Err(_) => {
                    debug!(%lobe_id, ?elapsed, "LobeExecutive::launch_and_collect: lobe exceeded budget, dropping");
                }
            }
        }
        results
    }

    /// Aggregate per-lobe confidences into one overall confidence: a
    /// weighted mean nudged up when lobes agree (low variance) and down
    /// when they disagree (spec.md §4.3 step 4).
    fn aggregate(&self, results: Vec<LobeResult>) -> ExecutiveOutcome {
        let veto = results
            .iter()
            .find(|r| r.lobe_id.is_veto_gate() && r.confidence >= 0.8 && !r.caveats.is_empty());

        if results.is_empty() {
            return ExecutiveOutcome {
                results,
                overall_confidence: 0.0,
                blocked: false,
                block_reason: None,
            };
        }

        let mean: f32 = results.iter().map(|r| r.confidence).sum::<f32>() / results.len() as f32;
        let variance: f32 =
            results.iter().map(|r| (r.confidence - mean).powi(2)).sum::<f32>() / results.len() as f32;
        let agreement_bonus = (0.1 - variance).max(0.0);
        let overall_confidence = (mean + agreement_bonus).clamp(0.0, 1.0);

        let (blocked, block_reason) = match veto {
            Some(gate) => (true, gate.caveats.first().cloned()),
            None => (false, None),
        };

        ExecutiveOutcome {
            results,
            overall_confidence,
            blocked,
            block_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::create_event_bus;
    use async_trait::async_trait;

    struct StubLobe {
        id: LobeId,
        confidence: f32,
    }

    #[async_trait]
    impl Lobe for StubLobe {
        fn id(&self) -> LobeId {
            self.id
        }

        fn can_handle(&self, _input: &LobeInput<'_>) -> f32 {
            self.confidence
        }

        fn resource_estimate(&self, _input: &LobeInput<'_>) -> crate::lobe::ResourceEstimate {
            crate::lobe::ResourceEstimate::new(100, Duration::from_millis(50), false)
        }

        async fn process(&self, _input: LobeInput<'_>) -> Result<LobeResult, crate::lobe::LobeError> {
            Ok(LobeResult::new(self.id, "ok", self.confidence, Duration::from_millis(1)))
        }
    }

    #[tokio::test]
    async fn low_confidence_lobes_are_excluded() {
        let lobes: Vec<Arc<dyn Lobe>> = vec![
            Arc::new(StubLobe {
                id: LobeId::Reasoning,
                confidence: 0.9,
            }),
            Arc::new(StubLobe {
                id: LobeId::Creativity,
                confidence: 0.1,
            }),
        ];
        let executive = LobeExecutive::new(lobes, ResourceBudget::default());
        let bb = Arc::new(Blackboard::new("conv"));
        let bus = create_event_bus();
        let emitter = bus.emitter_for("req-1");

        let outcome = executive.run("hello", &bb, &emitter).await;
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].lobe_id, LobeId::Reasoning);
    }

    #[tokio::test]
    async fn veto_gate_lobe_always_runs_regardless_of_threshold() {
        let lobes: Vec<Arc<dyn Lobe>> = vec![Arc::new(StubLobe {
            id: LobeId::Safety,
            confidence: 0.0,
        })];
        let executive = LobeExecutive::new(lobes, ResourceBudget::default());
        let bb = Arc::new(Blackboard::new("conv"));
        let bus = create_event_bus();
        let emitter = bus.emitter_for("req-1");

        let outcome = executive.run("hello", &bb, &emitter).await;
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].lobe_id, LobeId::Safety);
    }

    #[tokio::test]
    async fn aggregate_confidence_is_within_unit_interval() {
        let lobes: Vec<Arc<dyn Lobe>> = vec![
            Arc::new(StubLobe {
                id: LobeId::Reasoning,
                confidence: 0.9,
            }),
            Arc::new(StubLobe {
                id: LobeId::Technical,
                confidence: 0.85,
            }),
        ];
        let executive = LobeExecutive::new(lobes, ResourceBudget::default());
        let bb = Arc::new(Blackboard::new("conv"));
        let bus = create_event_bus();
        let emitter = bus.emitter_for("req-1");

        let outcome = executive.run("hello", &bb, &emitter).await;
        assert!(outcome.overall_confidence >= 0.0 && outcome.overall_confidence <= 1.0);
    }

    #[tokio::test]
    async fn empty_lobe_set_yields_zero_confidence() {
        let executive = LobeExecutive::new(Vec::new(), ResourceBudget::default());
        let bb = Arc::new(Blackboard::new("conv"));
        let bus = create_event_bus();
        let emitter = bus.emitter_for("req-1");

        let outcome = executive.run("hello", &bb, &emitter).await;
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.overall_confidence, 0.0);
    }
}
