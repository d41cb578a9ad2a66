//! cortex-memory - persistent user/project memory and archival knowledge
//!
//! Backs `GetUserMemory` / `UpdateUserMemory` / `GetProjectMemory` /
//! `SearchArchival` / `InsertArchival` / `GetToolDefinitions` for callers
//! that configure a memory coordinator, via a single SQLite file.
//!
//! # Example
//!
//! ```ignore
//! use cortex_memory::Store;
//!
//! let store = Store::open("memory.sqlite3")?;
//! store.update_user_memory("name", "Ada")?;
//! let hits = store.search_archival("dark mode", &["preference".into()], 5)?;
//! ```

pub mod cli;
pub mod config;
pub mod error;
mod store;

pub use error::MemoryError;
pub use store::{ArchivalEntry, Filter, FilterOp, IndexValue, ProjectMemoryRow, Record, Store, ToolDefinitionRow, UserMemoryRow};
