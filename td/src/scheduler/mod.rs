//! Cron scheduler for background maintenance (spec.md §4.7): "run named
//! jobs on cron expressions. Operations: `AddJob(cron_expr, fn) → handle`,
//! `Start`, `Stop` (waits for in-flight jobs). The canonical job is a
//! nightly sleep-cycle trigger that calls into a brain client; a
//! memory-jobs component runs periodic maintenance (decay, deduplication,
//! linking) on enhanced memory stores."

mod jobs;

pub use jobs::{MemoryJobs, SleepCycleTrigger};

use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use cron::Schedule;
use eyre::{eyre, Result};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A job action: an async closure with no input or output, boxed so the
/// scheduler can hold a heterogeneous job table.
pub type JobAction = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// One scheduled entry (spec.md §3, "Scheduler Entry").
pub struct ScheduledJob {
    pub name: String,
    pub cron_expression: String,
    schedule: Schedule,
    action: JobAction,
    pub last_run: Mutex<Option<chrono::DateTime<Utc>>>,
}

/// Prepend a `0` seconds field to a standard 5-field cron expression so it
/// parses with the `cron` crate, which requires 6 (seconds-first) or 7
/// (with year) fields. 6/7-field input passes through unchanged.
fn normalize_cron(expression: &str) -> String {
    match expression.split_whitespace().count() {
        5 => format!("0 {expression}"),
        _ => expression.to_string(),
    }
}

impl ScheduledJob {
    fn new(name: impl Into<String>, cron_expression: impl Into<String>, action: JobAction) -> Result<Self> {
        let cron_expression = cron_expression.into();
        let normalized = normalize_cron(&cron_expression);
        let schedule = Schedule::from_str(&normalized).map_err(|e| eyre!("invalid cron expression `{cron_expression}`: {e}"))?;
        Ok(Self {
            name: name.into(),
            cron_expression,
            schedule,
            action,
            last_run: Mutex::new(None),
        })
    }

    pub fn next_run(&self) -> Option<chrono::DateTime<Utc>> {
        self.schedule.upcoming(Utc).next()
    }
}

/// A handle returned by `AddJob`, usable to remove the job later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobHandle(usize);

struct Inner {
    jobs: Vec<Arc<ScheduledJob>>,
}

/// Runs named jobs on cron expressions (spec.md §4.7).
pub struct Scheduler {
    inner: Mutex<Inner>,
    running: AtomicBool,
    poll_interval: std::time::Duration,
    tick_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner { jobs: Vec::new() }),
            running: AtomicBool::new(false),
            poll_interval: std::time::Duration::from_secs(30),
            tick_handle: Mutex::new(None),
        }
    }

    #[cfg(test)]
    fn with_poll_interval(poll_interval: std::time::Duration) -> Self {
        Self {
            poll_interval,
            ..Self::new()
        }
    }

    /// Register a job. Valid before or after `Start`.
    pub async fn add_job(&self, name: impl Into<String>, cron_expression: impl Into<String>, action: JobAction) -> Result<JobHandle> {
        let job = Arc::new(ScheduledJob::new(name, cron_expression, action)?);
        let mut inner = self.inner.lock().await;
        inner.jobs.push(job);
        Ok(JobHandle(inner.jobs.len() - 1))
    }

    /// Register the canonical nightly sleep-cycle job at 03:00 local time
    /// (spec.md §3: "The canonical entry schedules a nightly 'sleep cycle'
    /// at 03:00 local time").
    pub async fn add_sleep_cycle(&self, trigger: Arc<dyn SleepCycleTrigger>) -> Result<JobHandle> {
        let action: JobAction = Arc::new(move || {
            let trigger = trigger.clone();
            Box::pin(async move { trigger.run().await })
        });
        self.add_job("sleep_cycle", "0 3 * * *", action).await
    }

    /// Start the background polling loop. Idempotent: calling twice is a no-op.
    pub fn start(self: &Arc<Self>) {
        if self.running.swap(true, Ordering::SeqCst) {
            debug!("Scheduler::start: already running");
            return;
        }
        info!("Scheduler::start: beginning cron poll loop");
        let scheduler = self.clone();
        let handle = tokio::spawn(async move {
            scheduler.poll_loop().await;
        });
        if let Ok(mut guard) = self.tick_handle.try_lock() {
            *guard = Some(handle);
        }
    }

    /// Stop the scheduler, waiting for any in-flight job run to finish.
    pub async fn stop(&self) {
        info!("Scheduler::stop: stopping cron poll loop");
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.tick_handle.lock().await.take() {
            let _ = handle.await;
        }
    }

    async fn poll_loop(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.poll_interval);
        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Run any job whose next scheduled fire time has passed since its last
    /// run. Exposed separately from `poll_loop` so tests can drive ticks
    /// deterministically without sleeping.
    pub async fn tick(&self) {
        let jobs = {
            let inner = self.inner.lock().await;
            inner.jobs.clone()
        };

        for job in jobs {
            if self.due(&job).await {
                let mut last_run = job.last_run.lock().await;
                *last_run = Some(Utc::now());
                drop(last_run);

                let name = job.name.clone();
                let action = job.action.clone();
                tokio::spawn(async move {
                    debug!(job = %name, "Scheduler: running job");
                    if let Err(e) = action().await {
                        error!(job = %name, error = %e, "Scheduler: job failed");
                    }
                });
            }
        }
    }

    async fn due(&self, job: &ScheduledJob) -> bool {
        let last_run = *job.last_run.lock().await;
        match job.schedule.upcoming(Utc).take(1).next() {
            Some(next) => match last_run {
                None => next <= Utc::now() + chrono::Duration::seconds(1),
                Some(last) => next > last && next <= Utc::now(),
            },
            None => {
                warn!(job = %job.name, "Scheduler: job has no upcoming fire time");
                false
            }
        }
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[tokio::test]
    async fn add_job_rejects_invalid_cron_expression() {
        let scheduler = Scheduler::new();
        let action: JobAction = Arc::new(|| Box::pin(async { Ok(()) }));
        let result = scheduler.add_job("bad", "not a cron expression", action).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn tick_runs_job_whose_schedule_has_elapsed() {
        let scheduler = Scheduler::new();
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let action: JobAction = Arc::new(move || {
            let counter = counter_clone.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });
        scheduler.add_job("every_second", "* * * * * *", action).await.unwrap();

        scheduler.tick().await;
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn add_job_accepts_standard_5_field_cron_expression() {
        let scheduler = Scheduler::new();
        let action: JobAction = Arc::new(|| Box::pin(async { Ok(()) }));
        let result = scheduler.add_job("nightly", "0 3 * * *", action).await;
        assert!(result.is_ok());
    }

    #[test]
    fn normalize_cron_prepends_seconds_field_to_5_field_expressions() {
        assert_eq!(normalize_cron("0 3 * * *"), "0 0 3 * * *");
        assert_eq!(normalize_cron("* * * * * *"), "* * * * * *");
    }

    #[tokio::test]
    async fn sleep_cycle_job_is_registered_with_canonical_cron_expression() {
        let scheduler = Scheduler::new();
        struct NoopTrigger;
        #[async_trait::async_trait]
        impl SleepCycleTrigger for NoopTrigger {
            async fn run(&self) -> Result<()> {
                Ok(())
            }
        }
        let handle = scheduler.add_sleep_cycle(Arc::new(NoopTrigger)).await.unwrap();
        assert_eq!(handle, JobHandle(0));
    }

    #[tokio::test]
    async fn start_is_idempotent() {
        let scheduler = Arc::new(Scheduler::with_poll_interval(std::time::Duration::from_secs(3600)));
        scheduler.start();
        scheduler.start();
        scheduler.stop().await;
    }
}
