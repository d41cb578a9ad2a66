//! Memory coordinator backed by the `cortex-memory` and `cortex-knowledge`
//! satellite crates (spec.md §4.5, §2: "two satellite crates ... the
//! out-of-process collaborators the core consumes through coordinators").
//! `cortex-memory` backs user/project memory and tool definitions;
//! `cortex-knowledge` backs `SearchArchival`/`InsertArchival`, each insert
//! landing in its own one-entry context so the knowledge fabric's existing
//! ingest/search API needs no extension.

use async_trait::async_trait;
use cortex_knowledge::{ContextStore, IngestOptions, SearchOptions};
use cortex_memory::Store as MemoryStore;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use super::{CoordinatorError, MemoryCoordinator, MemoryField, MemoryStats, ProjectMemory, UserMemory};
use crate::domain::KnowledgeHit;
use crate::events::EventEmitter;
use crate::llm::ToolDefinition;

/// SQLite/knowledge-fabric-backed [`MemoryCoordinator`].
pub struct SqliteMemoryCoordinator {
    store: Arc<MemoryStore>,
    knowledge: Arc<ContextStore>,
    knowledge_dir: PathBuf,
}

impl SqliteMemoryCoordinator {
    /// Open (or create) the SQLite memory database at `db_path` and the
    /// knowledge-fabric directory at `knowledge_dir`.
    pub fn open(db_path: impl Into<PathBuf>, knowledge_dir: impl Into<PathBuf>) -> eyre::Result<Self> {
        let store = MemoryStore::open(db_path.into())?;
        let knowledge_dir = knowledge_dir.into();
        let knowledge = ContextStore::open(&knowledge_dir)?;
        Ok(Self {
            store: Arc::new(store),
            knowledge: Arc::new(knowledge),
            knowledge_dir,
        })
    }

    fn map_err(capability: &'static str, e: impl std::fmt::Display) -> CoordinatorError {
        warn!(capability, error = %e, "SqliteMemoryCoordinator: operation failed");
        CoordinatorError::Other(format!("{capability}: {e}"))
    }
}

#[async_trait]
impl MemoryCoordinator for SqliteMemoryCoordinator {
    fn enabled(&self) -> bool {
        true
    }

    async fn get_user_memory(&self) -> Result<UserMemory, CoordinatorError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.get_user_memory())
            .await
            .map_err(|e| Self::map_err("memory", e))?
            .map(|row| UserMemory {
                name: row.name,
                role: row.role,
                experience: row.experience,
                os: row.os,
                shell: row.shell,
                editor: row.editor,
            })
            .map_err(|e| Self::map_err("memory", e))
    }

    async fn update_user_memory(&self, field: MemoryField, value: &str, emitter: &EventEmitter) -> Result<(), CoordinatorError> {
        let store = self.store.clone();
        let field_name = field.as_str();
        let value = value.to_string();
        tokio::task::spawn_blocking(move || store.update_user_memory(field_name, &value))
            .await
            .map_err(|e| Self::map_err("memory", e))?
            .map_err(|e| Self::map_err("memory", e))?;
        emitter.memory_updated(field_name);
        Ok(())
    }

    async fn get_project_memory(&self) -> Result<ProjectMemory, CoordinatorError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.get_project_memory())
            .await
            .map_err(|e| Self::map_err("memory", e))?
            .map(|row| ProjectMemory {
                summary: row.summary,
                conventions: row.conventions,
            })
            .map_err(|e| Self::map_err("memory", e))
    }

    async fn search_archival(&self, query: &str, tags: &[String], k: usize) -> Result<Vec<KnowledgeHit>, CoordinatorError> {
        let knowledge = self.knowledge.clone();
        let query = query.to_string();
        let tags = tags.to_vec();
        let pattern = regex::escape(&query);

        tokio::task::spawn_blocking(move || -> eyre::Result<Vec<KnowledgeHit>> {
            let mut hits = Vec::new();
            for context_id in knowledge.list_contexts()? {
                let matches = knowledge.search(&context_id, &pattern, SearchOptions::bounded(k, tags.clone()))?;
                hits.extend(matches.into_iter().map(|m| KnowledgeHit {
                    content: m.snippet,
                    relevance: m.relevance,
                }));
            }
            hits.sort_by(|a, b| b.relevance.partial_cmp(&a.relevance).unwrap_or(std::cmp::Ordering::Equal));
            hits.truncate(k);
            Ok(hits)
        })
        .await
        .map_err(|e| Self::map_err("knowledge", e))?
        .map_err(|e| Self::map_err("knowledge", e))
    }

    async fn insert_archival(&self, content: &str) -> Result<(), CoordinatorError> {
        let knowledge = self.knowledge.clone();
        let knowledge_dir = self.knowledge_dir.clone();
        let content = content.to_string();

        tokio::task::spawn_blocking(move || -> eyre::Result<()> {
            let inbox = knowledge_dir.join("inbox");
            fs::create_dir_all(&inbox)?;
            let entry_path = inbox.join(format!("{}.txt", Uuid::new_v4()));
            fs::write(&entry_path, &content)?;
            knowledge.ingest(&[entry_path.to_string_lossy().to_string()], IngestOptions::default())?;
            Ok(())
        })
        .await
        .map_err(|e| Self::map_err("knowledge", e))?
        .map_err(|e| Self::map_err("knowledge", e))
    }

    async fn get_tool_definitions(&self) -> Result<Vec<ToolDefinition>, CoordinatorError> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.get_tool_definitions())
            .await
            .map_err(|e| Self::map_err("memory", e))?
            .map(|defs| {
                defs.into_iter()
                    .map(|d| ToolDefinition::new(d.name, d.description, d.input_schema))
                    .collect()
            })
            .map_err(|e| Self::map_err("memory", e))
    }

    fn stats(&self) -> MemoryStats {
        let archival_entries = self.knowledge.list_contexts().map(|c| c.len() as u64).unwrap_or(0);
        MemoryStats {
            archival_entries,
            searches: 0,
        }
    }
}
