//! Event Logger - persists events to JSONL files
//!
//! The EventLogger subscribes to the EventBus and writes all events to
//! per-request JSONL files for history, debugging, and replay.

use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, error, warn};

use super::bus::EventBus;
use super::types::{Event, EventLogEntry};

/// Event logger that writes events to JSONL files.
///
/// Events are written to `~/.cortex/runs/{request-id}/events.jsonl`.
pub struct EventLogger {
    /// Base directory for run data (~/.cortex/runs).
    runs_dir: PathBuf,
    /// Open file writers per request id. Only populated for events that
    /// carry a request id; request-less events (e.g. global mode changes)
    /// are written to a shared `global.jsonl` file.
    writers: HashMap<String, BufWriter<File>>,
}

const GLOBAL_KEY: &str = "global";

impl EventLogger {
    pub fn new(runs_dir: impl AsRef<Path>) -> Self {
        let runs_dir = runs_dir.as_ref().to_path_buf();
        debug!(?runs_dir, "EventLogger::new: creating logger");
        Self {
            runs_dir,
            writers: HashMap::new(),
        }
    }

    /// Create a logger with the default runs directory (~/.cortex/runs).
    pub fn with_default_path() -> eyre::Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| eyre::eyre!("Could not determine home directory"))?;
        let runs_dir = home.join(".cortex").join("runs");
        fs::create_dir_all(&runs_dir)?;
        Ok(Self::new(runs_dir))
    }

    /// Write an event to its request's log file.
    pub fn write_event(&mut self, event: &Event) -> eyre::Result<()> {
        let key = event.request_id().unwrap_or(GLOBAL_KEY).to_string();
        debug!(key = %key, event_type = event.event_type(), "EventLogger::write_event");

        let writer = if let Some(w) = self.writers.get_mut(&key) {
            w
        } else {
            let dir = self.runs_dir.join(&key);
            fs::create_dir_all(&dir)?;

            let log_path = dir.join("events.jsonl");
            debug!(?log_path, "EventLogger: creating new log file");

            let file = OpenOptions::new().create(true).append(true).open(&log_path)?;
            let writer = BufWriter::new(file);
            self.writers.insert(key.clone(), writer);
            self.writers.get_mut(&key).unwrap()
        };

        let entry = EventLogEntry::new(event.clone());
        let json = serde_json::to_string(&entry)?;
        writeln!(writer, "{}", json)?;
        writer.flush()?;

        Ok(())
    }

    /// Close the writer for a request (e.g., once its response has been
    /// generated).
    pub fn close_request(&mut self, request_id: &str) {
        debug!(%request_id, "EventLogger::close_request");
        if let Some(mut writer) = self.writers.remove(request_id) {
            let _ = writer.flush();
        }
    }

    /// Run the logger, consuming events from the bus until shutdown.
    ///
    /// Meant to be spawned as a background task.
    pub async fn run(mut self, event_bus: Arc<EventBus>) {
        debug!("EventLogger::run: starting event logger");
        let mut rx = event_bus.subscribe();

        loop {
            match rx.recv().await {
                Ok(event) => {
                    let request_id = event.request_id().map(str::to_string);
                    let is_response_generated = matches!(event, Event::ResponseGenerated { .. });

                    if let Err(e) = self.write_event(&event) {
                        error!(request_id = ?request_id, error = %e, "EventLogger: failed to write event");
                    }

                    if is_response_generated {
                        if let Some(id) = request_id {
                            self.close_request(&id);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(missed = n, "EventLogger: lagged behind, missed events");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("EventLogger: channel closed, shutting down");
                    break;
                }
            }
        }

        for (key, mut writer) in self.writers.drain() {
            debug!(key = %key, "EventLogger: flushing writer on shutdown");
            let _ = writer.flush();
        }
    }
}

/// Read events from a request's log file.
pub fn read_request_events(runs_dir: impl AsRef<Path>, request_id: &str) -> eyre::Result<Vec<EventLogEntry>> {
    let log_path = runs_dir.as_ref().join(request_id).join("events.jsonl");
    debug!(?log_path, "read_request_events: reading log file");

    if !log_path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&log_path)?;
    let mut entries = Vec::new();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<EventLogEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!(line, error = %e, "read_request_events: failed to parse line");
            }
        }
    }

    debug!(count = entries.len(), "read_request_events: loaded entries");
    Ok(entries)
}

/// Spawn the event logger as a background task.
pub fn spawn_event_logger(event_bus: Arc<EventBus>) -> eyre::Result<tokio::task::JoinHandle<()>> {
    let logger = EventLogger::with_default_path()?;
    Ok(tokio::spawn(async move {
        logger.run(event_bus).await;
    }))
}

/// Replay events for a request from the default runs directory.
pub fn replay_request_events(request_id: &str) -> eyre::Result<Vec<Event>> {
    let home = dirs::home_dir().ok_or_else(|| eyre::eyre!("Could not determine home directory"))?;
    let runs_dir = home.join(".cortex").join("runs");
    let entries = read_request_events(&runs_dir, request_id)?;
    Ok(entries.into_iter().map(|e| e.event).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_event_logger_creation() {
        let temp = tempdir().unwrap();
        let logger = EventLogger::new(temp.path());
        assert!(logger.writers.is_empty());
    }

    #[test]
    fn test_write_event() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        let event = Event::RequestReceived {
            request_id: "test-123".to_string(),
            input_summary: "hi".to_string(),
        };

        logger.write_event(&event).unwrap();

        let log_path = temp.path().join("test-123").join("events.jsonl");
        assert!(log_path.exists());

        let content = fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("RequestReceived"));
        assert!(content.contains("test-123"));
    }

    #[test]
    fn test_multiple_events_same_request() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "test-123".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::AgentStarted {
                request_id: "test-123".to_string(),
                lobe_id: "reasoning".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::ResponseGenerated {
                request_id: "test-123".to_string(),
                success: true,
                duration_ms: 42,
            })
            .unwrap();

        let log_path = temp.path().join("test-123").join("events.jsonl");
        let content = fs::read_to_string(&log_path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn test_multiple_requests() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "req-1".to_string(),
                input_summary: "task 1".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::RequestReceived {
                request_id: "req-2".to_string(),
                input_summary: "task 2".to_string(),
            })
            .unwrap();

        assert!(temp.path().join("req-1").join("events.jsonl").exists());
        assert!(temp.path().join("req-2").join("events.jsonl").exists());
    }

    #[test]
    fn test_request_less_event_goes_to_global() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::ModeChanged {
                request_id: None,
                mode: "agentic".to_string(),
                trigger: "startup".to_string(),
            })
            .unwrap();

        assert!(temp.path().join(GLOBAL_KEY).join("events.jsonl").exists());
    }

    #[test]
    fn test_read_request_events() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "test-read".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::AgentStarted {
                request_id: "test-read".to_string(),
                lobe_id: "reasoning".to_string(),
            })
            .unwrap();

        let entries = read_request_events(temp.path(), "test-read").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event_type(), "RequestReceived");
        assert_eq!(entries[1].event.event_type(), "AgentStarted");
    }

    #[test]
    fn test_read_nonexistent_request() {
        let temp = tempdir().unwrap();
        let entries = read_request_events(temp.path(), "nonexistent").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_close_request() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "test-close".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();

        assert!(logger.writers.contains_key("test-close"));
        logger.close_request("test-close");
        assert!(!logger.writers.contains_key("test-close"));
    }

    #[test]
    fn test_replay_preserves_order() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "test-replay".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::AgentStarted {
                request_id: "test-replay".to_string(),
                lobe_id: "reasoning".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::ToolExecuted {
                request_id: "test-replay".to_string(),
                tool: "bash".to_string(),
                args_summary: "echo test".to_string(),
                latency_ms: 5,
                success: true,
                error: None,
            })
            .unwrap();
        logger
            .write_event(&Event::ResponseGenerated {
                request_id: "test-replay".to_string(),
                success: true,
                duration_ms: 99,
            })
            .unwrap();

        let entries = read_request_events(temp.path(), "test-replay").unwrap();
        assert_eq!(entries.len(), 4);

        assert_eq!(entries[0].event.event_type(), "RequestReceived");
        assert_eq!(entries[1].event.event_type(), "AgentStarted");
        assert_eq!(entries[2].event.event_type(), "ToolExecuted");
        assert_eq!(entries[3].event.event_type(), "ResponseGenerated");
    }

    #[test]
    fn test_close_request_idempotent() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "idem-test".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();

        logger.close_request("idem-test");
        logger.close_request("idem-test");
        logger.close_request("idem-test");

        assert!(!logger.writers.contains_key("idem-test"));
    }

    #[test]
    fn test_close_nonexistent_request() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());
        logger.close_request("never-existed");
    }

    #[test]
    fn test_requests_are_isolated() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "iso-1".to_string(),
                input_summary: "task 1".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::RequestReceived {
                request_id: "iso-2".to_string(),
                input_summary: "task 2".to_string(),
            })
            .unwrap();
        logger
            .write_event(&Event::AgentStarted {
                request_id: "iso-1".to_string(),
                lobe_id: "reasoning".to_string(),
            })
            .unwrap();

        let entries_1 = read_request_events(temp.path(), "iso-1").unwrap();
        let entries_2 = read_request_events(temp.path(), "iso-2").unwrap();

        assert_eq!(entries_1.len(), 2);
        assert_eq!(entries_2.len(), 1);

        assert!(entries_1.iter().all(|e| e.event.request_id() == Some("iso-1")));
        assert!(entries_2.iter().all(|e| e.event.request_id() == Some("iso-2")));
    }

    #[test]
    fn test_events_persisted_immediately() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "persist-test".to_string(),
                input_summary: "hi".to_string(),
            })
            .unwrap();

        let log_path = temp.path().join("persist-test").join("events.jsonl");
        let content = std::fs::read_to_string(&log_path).unwrap();

        assert!(content.contains("RequestReceived"));
        assert!(content.contains("persist-test"));
    }

    #[test]
    fn test_event_log_file_is_jsonl() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        for i in 0..5 {
            logger
                .write_event(&Event::AgentStarted {
                    request_id: "jsonl-test".to_string(),
                    lobe_id: format!("lobe{i}"),
                })
                .unwrap();
        }

        let log_path = temp.path().join("jsonl-test").join("events.jsonl");
        let content = std::fs::read_to_string(&log_path).unwrap();

        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);

        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).expect("Each line should be valid JSON");
            assert!(parsed.get("ts").is_some(), "Should have timestamp");
            assert!(parsed.get("event").is_some(), "Should have event");
        }
    }

    #[test]
    fn test_reopen_after_close() {
        let temp = tempdir().unwrap();
        let mut logger = EventLogger::new(temp.path());

        logger
            .write_event(&Event::RequestReceived {
                request_id: "reopen-test".to_string(),
                input_summary: "first".to_string(),
            })
            .unwrap();

        logger.close_request("reopen-test");

        logger
            .write_event(&Event::ResponseGenerated {
                request_id: "reopen-test".to_string(),
                success: true,
                duration_ms: 10,
            })
            .unwrap();

        let entries = read_request_events(temp.path(), "reopen-test").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].event.event_type(), "RequestReceived");
        assert_eq!(entries[1].event.event_type(), "ResponseGenerated");
    }
}
