//! cortex-knowledge - RLM-style external knowledge fabric
//!
//! Provides unlimited context windows by storing large text corpora externally
//! and allowing callers to query them via tag-filtered lexical search (fetch
//! chunks, windows).
//!
//! # Architecture
//!
//! ```text
//! .cortex-knowledge/
//! └── {context_id}/
//!     ├── index.jsonl      # chunk metadata (source, offsets, tags)
//!     └── chunks/
//!         ├── 0001.txt
//!         ├── 0002.txt
//!         └── ...
//! ```
//!
//! # Example
//!
//! ```ignore
//! use cortex_knowledge::{ContextStore, IngestOptions, SearchOptions};
//!
//! let store = ContextStore::open(".cortex-knowledge")?;
//! let ctx_id = store.ingest(&["docs/**/*.md"], IngestOptions::with_defaults(vec!["docs".into()]))?;
//! let matches = store.search(&ctx_id, "recursive", SearchOptions::bounded(5, vec!["docs".into()]))?;
//! let chunk = store.get_chunk(&matches[0].chunk_id)?;
//! ```

pub mod cli;
pub mod config;
mod store;

pub use store::{ChunkMeta, ContextId, ContextStats, ContextStore, IngestOptions, SearchMatch, SearchOptions};

/// Default chunk size (32KB)
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Default overlap between chunks (2KB)
pub const DEFAULT_OVERLAP: usize = 2 * 1024;
