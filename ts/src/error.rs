//! Error types for cortex-memory

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown memory field: {0}")]
    UnknownField(String),

    #[error("archival entry not found: {0}")]
    ArchivalNotFound(i64),
}
