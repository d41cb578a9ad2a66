//! Running counters (spec.md §4.1, §5): "atomic counters plus a
//! mutex-protected map for per-task-type distribution."

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::TaskType;

#[derive(Debug, Clone, Default)]
pub struct StatsSnapshot {
    pub total: u64,
    pub success: u64,
    pub failure: u64,
    pub cancelled: u64,
    pub tool_calls: u64,
    pub knowledge_hits: u64,
    pub task_distribution: HashMap<&'static str, u64>,
}

#[derive(Default)]
pub struct OrchestratorStats {
    total: AtomicU64,
    success: AtomicU64,
    failure: AtomicU64,
    cancelled: AtomicU64,
    tool_calls: AtomicU64,
    knowledge_hits: AtomicU64,
    task_distribution: Mutex<HashMap<&'static str, u64>>,
}

fn task_type_name(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::General => "general",
        TaskType::CodeGen => "code_gen",
        TaskType::Debug => "debug",
        TaskType::Review => "review",
        TaskType::Planning => "planning",
        TaskType::Infrastructure => "infrastructure",
        TaskType::Explain => "explain",
        TaskType::Refactor => "refactor",
    }
}

impl OrchestratorStats {
    /// Record the outcome of one `Process` call (spec.md §8, invariant #9:
    /// "Stats counters are monotone non-decreasing; total = success +
    /// failure + cancelled").
    pub fn record(&self, success: bool, cancelled: bool, tool_calls: u64, knowledge_hits: u64, task_type: TaskType) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if cancelled {
            self.cancelled.fetch_add(1, Ordering::Relaxed);
        } else if success {
            self.success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failure.fetch_add(1, Ordering::Relaxed);
        }
        self.tool_calls.fetch_add(tool_calls, Ordering::Relaxed);
        self.knowledge_hits.fetch_add(knowledge_hits, Ordering::Relaxed);

        let mut distribution = self.task_distribution.lock().unwrap();
        *distribution.entry(task_type_name(task_type)).or_insert(0) += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            success: self.success.load(Ordering::Relaxed),
            failure: self.failure.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            tool_calls: self.tool_calls.load(Ordering::Relaxed),
            knowledge_hits: self.knowledge_hits.load(Ordering::Relaxed),
            task_distribution: self.task_distribution.lock().unwrap().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_equals_success_plus_failure_plus_cancelled() {
        let stats = OrchestratorStats::default();
        stats.record(true, false, 0, 0, TaskType::General);
        stats.record(false, false, 0, 0, TaskType::Debug);
        stats.record(false, true, 0, 0, TaskType::General);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, snapshot.success + snapshot.failure + snapshot.cancelled);
        assert_eq!(snapshot.total, 3);
    }
}
