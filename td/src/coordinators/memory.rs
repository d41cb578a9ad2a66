//! Memory coordinator (spec.md §4.5): GetUserMemory, UpdateUserMemory,
//! GetProjectMemory, SearchArchival, InsertArchival, ExecuteTool,
//! GetToolDefinitions, Stats.

use async_trait::async_trait;

use super::CoordinatorError;
use crate::domain::KnowledgeHit;
use crate::events::EventEmitter;
use crate::llm::ToolDefinition;

/// The mutable fields `UpdateUserMemory` is allowed to touch (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryField {
    Name,
    Role,
    Experience,
    Os,
    Shell,
    Editor,
}

impl MemoryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryField::Name => "name",
            MemoryField::Role => "role",
            MemoryField::Experience => "experience",
            MemoryField::Os => "os",
            MemoryField::Shell => "shell",
            MemoryField::Editor => "editor",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserMemory {
    pub name: Option<String>,
    pub role: Option<String>,
    pub experience: Option<String>,
    pub os: Option<String>,
    pub shell: Option<String>,
    pub editor: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectMemory {
    pub summary: Option<String>,
    pub conventions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStats {
    pub archival_entries: u64,
    pub searches: u64,
}

#[async_trait]
pub trait MemoryCoordinator: Send + Sync {
    fn enabled(&self) -> bool;

    async fn get_user_memory(&self) -> Result<UserMemory, CoordinatorError>;

    /// Updates a single field and, on success, emits `MemoryUpdated`
    /// (spec.md §4.5: "UpdateUserMemory publishes MemoryUpdated on success").
    async fn update_user_memory(
        &self,
        field: MemoryField,
        value: &str,
        emitter: &EventEmitter,
    ) -> Result<(), CoordinatorError>;

    async fn get_project_memory(&self) -> Result<ProjectMemory, CoordinatorError>;

    async fn search_archival(&self, query: &str, tags: &[String], k: usize) -> Result<Vec<KnowledgeHit>, CoordinatorError>;

    async fn insert_archival(&self, content: &str) -> Result<(), CoordinatorError>;

    async fn get_tool_definitions(&self) -> Result<Vec<ToolDefinition>, CoordinatorError>;

    fn stats(&self) -> MemoryStats;
}

/// Disabled variant used when no memory store is configured.
#[derive(Default)]
pub struct NoopMemoryCoordinator;

#[async_trait]
impl MemoryCoordinator for NoopMemoryCoordinator {
    fn enabled(&self) -> bool {
        false
    }

    async fn get_user_memory(&self) -> Result<UserMemory, CoordinatorError> {
        Ok(UserMemory::default())
    }

    async fn update_user_memory(
        &self,
        _field: MemoryField,
        _value: &str,
        _emitter: &EventEmitter,
    ) -> Result<(), CoordinatorError> {
        Err(CoordinatorError::NotConfigured { capability: "memory" })
    }

    async fn get_project_memory(&self) -> Result<ProjectMemory, CoordinatorError> {
        Ok(ProjectMemory::default())
    }

    async fn search_archival(
        &self,
        _query: &str,
        _tags: &[String],
        _k: usize,
    ) -> Result<Vec<KnowledgeHit>, CoordinatorError> {
        Ok(Vec::new())
    }

    async fn insert_archival(&self, _content: &str) -> Result<(), CoordinatorError> {
        Err(CoordinatorError::NotConfigured { capability: "memory" })
    }

    async fn get_tool_definitions(&self) -> Result<Vec<ToolDefinition>, CoordinatorError> {
        Ok(Vec::new())
    }

    fn stats(&self) -> MemoryStats {
        MemoryStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::create_event_bus;

    #[tokio::test]
    async fn noop_coordinator_reports_disabled_and_empty() {
        let coordinator = NoopMemoryCoordinator;
        assert!(!coordinator.enabled());
        assert!(coordinator.search_archival("x", &[], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_user_memory_on_noop_returns_not_configured() {
        let coordinator = NoopMemoryCoordinator;
        let bus = create_event_bus();
        let emitter = bus.emitter_for("req-1");
        let err = coordinator.update_user_memory(MemoryField::Name, "Ada", &emitter).await;
        assert!(err.is_err());
    }
}
