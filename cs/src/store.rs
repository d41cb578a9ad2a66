//! Core knowledge-fabric store: chunked ingestion of external text corpora
//! with tag-filtered lexical search, backing `SearchArchival` /
//! `InsertArchival` for callers that configure a knowledge fabric.

use eyre::{Context, Result};
use grep_regex::RegexMatcherBuilder;
use grep_searcher::sinks::UTF8;
use grep_searcher::Searcher;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// Unique identifier for a context
pub type ContextId = String;

/// Unique identifier for a chunk within a context
pub type ChunkId = String;

/// Metadata for a single chunk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Unique chunk ID
    pub chunk_id: ChunkId,
    /// Source file path
    pub source: String,
    /// Byte offset in source file
    pub byte_start: u64,
    /// Byte end in source file
    pub byte_end: u64,
    /// Content hash for staleness detection
    pub content_hash: String,
    /// Creation timestamp (unix ms)
    pub created_at: i64,
    /// Tags attached at ingest time, used for tag-filtered search
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Options for ingesting content
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Size of each chunk in bytes
    pub chunk_size: usize,
    /// Overlap between adjacent chunks
    pub overlap: usize,
    /// Tags to attach to every chunk produced by this ingest
    pub tags: Vec<String>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
            overlap: crate::DEFAULT_OVERLAP,
            tags: Vec::new(),
        }
    }
}

impl IngestOptions {
    pub fn with_defaults(tags: Vec<String>) -> Self {
        Self { tags, ..Self::default() }
    }
}

/// Options for searching
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum number of results
    pub max_results: usize,
    /// Case insensitive search
    pub case_insensitive: bool,
    /// Restrict the search to chunks carrying at least one of these tags.
    /// Empty means unfiltered.
    pub tags: Vec<String>,
}

impl SearchOptions {
    pub fn bounded(max_results: usize, tags: Vec<String>) -> Self {
        Self {
            max_results,
            case_insensitive: false,
            tags,
        }
    }
}

/// A search match result
#[derive(Debug, Clone)]
pub struct SearchMatch {
    /// Chunk ID containing the match
    pub chunk_id: ChunkId,
    /// Approximate byte offset of the matching line within the chunk
    pub offset: usize,
    /// Matching line, trimmed
    pub snippet: String,
    /// Relevance in [0, 1], currently a simple 1/rank decay
    pub relevance: f32,
}

/// Statistics for a context
#[derive(Debug, Clone)]
pub struct ContextStats {
    /// Number of chunks
    pub chunk_count: usize,
    /// Total bytes stored
    pub total_bytes: u64,
    /// Number of source files
    pub source_count: usize,
}

/// The main knowledge store
pub struct ContextStore {
    /// Base path for storage
    base_path: PathBuf,
}

impl ContextStore {
    /// Open or create a context store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        debug!(?base_path, "Opened context store");
        Ok(Self { base_path })
    }

    /// Ingest files matching the given patterns (globs, or directories
    /// walked recursively) into a new context
    pub fn ingest(&self, patterns: &[String], options: IngestOptions) -> Result<ContextId> {
        let context_id = Uuid::now_v7().to_string();
        let ctx_path = self.base_path.join(&context_id);
        let chunks_path = ctx_path.join("chunks");
        fs::create_dir_all(&chunks_path)?;

        let index_path = ctx_path.join("index.jsonl");
        let mut index_file = fs::File::create(&index_path)?;

        let mut chunk_num = 0u32;

        for pattern in patterns {
            for path in self.resolve_pattern(pattern)? {
                if path.is_file() {
                    chunk_num = self.ingest_file(&path, &chunks_path, &mut index_file, chunk_num, &options)?;
                }
            }
        }

        info!(context_id, chunk_count = chunk_num, "Ingestion complete");
        Ok(context_id)
    }

    /// Expand a single input into concrete file paths: a glob pattern if it
    /// contains wildcard characters, a recursive walk if it names a
    /// directory, or the literal path otherwise.
    fn resolve_pattern(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let raw = Path::new(pattern);
        if raw.is_dir() {
            let paths = walkdir::WalkDir::new(raw)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .collect();
            return Ok(paths);
        }

        let mut paths = Vec::new();
        for entry in glob::glob(pattern).context(format!("Invalid glob pattern: {}", pattern))? {
            paths.push(entry?);
        }
        Ok(paths)
    }

    fn ingest_file(
        &self,
        path: &Path,
        chunks_path: &Path,
        index_file: &mut fs::File,
        mut chunk_num: u32,
        options: &IngestOptions,
    ) -> Result<u32> {
        let content = fs::read_to_string(path).context(format!("Failed to read file: {}", path.display()))?;
        let content_bytes = content.as_bytes();
        let source = path.to_string_lossy().to_string();

        let mut offset = 0usize;
        while offset < content_bytes.len() {
            let end = (offset + options.chunk_size).min(content_bytes.len());
            let chunk_content = &content_bytes[offset..end];

            chunk_num += 1;
            let chunk_id = format!("{:04}", chunk_num);
            let chunk_path = chunks_path.join(format!("{}.txt", chunk_id));

            fs::write(&chunk_path, chunk_content)?;

            let meta = ChunkMeta {
                chunk_id: chunk_id.clone(),
                source: source.clone(),
                byte_start: offset as u64,
                byte_end: end as u64,
                content_hash: format!("{:x}", content_hash(chunk_content)),
                created_at: chrono::Utc::now().timestamp_millis(),
                tags: options.tags.clone(),
            };

            let line = serde_json::to_string(&meta)?;
            writeln!(index_file, "{}", line)?;

            offset = if end >= content_bytes.len() { end } else { end - options.overlap };
        }

        Ok(chunk_num)
    }

    fn load_index(&self, context_id: &str) -> Result<Vec<ChunkMeta>> {
        let index_path = self.base_path.join(context_id).join("index.jsonl");
        let file = fs::File::open(&index_path).context(format!("Context not found: {}", context_id))?;
        let reader = BufReader::new(file);
        let mut metas = Vec::new();
        for line in reader.lines() {
            metas.push(serde_json::from_str(&line?)?);
        }
        Ok(metas)
    }

    /// Tag-filtered lexical search within a context, bounded by
    /// `options.max_results`. Uses the same search engine `ripgrep` is built
    /// on, so patterns are ordinary regexes.
    pub fn search(&self, context_id: &str, pattern: &str, options: SearchOptions) -> Result<Vec<SearchMatch>> {
        let ctx_path = self.base_path.join(context_id);
        if !ctx_path.exists() {
            return Err(eyre::eyre!("Context not found: {}", context_id));
        }
        let chunks_path = ctx_path.join("chunks");

        let tag_filter: HashSet<&str> = options.tags.iter().map(String::as_str).collect();
        let metas = self.load_index(context_id)?;

        let matcher = RegexMatcherBuilder::new()
            .case_insensitive(options.case_insensitive)
            .build(pattern)
            .context("invalid search pattern")?;

        let mut matches = Vec::new();

        'chunks: for meta in &metas {
            if !tag_filter.is_empty() && !meta.tags.iter().any(|t| tag_filter.contains(t.as_str())) {
                continue;
            }

            let chunk_path = chunks_path.join(format!("{}.txt", meta.chunk_id));
            if !chunk_path.exists() {
                continue;
            }

            let mut offset = 0usize;
            let mut hits: Vec<(usize, String)> = Vec::new();
            Searcher::new().search_path(
                &matcher,
                &chunk_path,
                UTF8(|_line_number, line| {
                    hits.push((offset, line.trim_end().to_string()));
                    offset += line.len();
                    Ok(true)
                }),
            )?;

            for (rank, (line_offset, snippet)) in hits.into_iter().enumerate() {
                matches.push(SearchMatch {
                    chunk_id: meta.chunk_id.clone(),
                    offset: line_offset,
                    snippet,
                    relevance: 1.0 / (rank as f32 + 1.0),
                });
                if matches.len() >= options.max_results {
                    break 'chunks;
                }
            }
        }

        Ok(matches)
    }

    /// Get the full content of a chunk
    pub fn get_chunk(&self, chunk_id: &str) -> Result<String> {
        let (context_id, chunk_num) = if chunk_id.contains('/') {
            let parts: Vec<&str> = chunk_id.splitn(2, '/').collect();
            (parts[0], parts[1])
        } else {
            return Err(eyre::eyre!("Chunk ID must include context: context_id/chunk_num"));
        };

        let chunk_path = self
            .base_path
            .join(context_id)
            .join("chunks")
            .join(format!("{}.txt", chunk_num));

        fs::read_to_string(&chunk_path).context(format!("Chunk not found: {}", chunk_id))
    }

    /// Get a window of text around an offset
    pub fn get_window(&self, chunk_id: &str, center: usize, radius: usize) -> Result<String> {
        let content = self.get_chunk(chunk_id)?;
        let bytes = content.as_bytes();

        let start = center.saturating_sub(radius);
        let end = (center + radius).min(bytes.len());

        Ok(String::from_utf8_lossy(&bytes[start..end]).to_string())
    }

    /// Get statistics for a context
    pub fn stats(&self, context_id: &str) -> Result<ContextStats> {
        let metas = self.load_index(context_id)?;
        let mut sources = HashSet::new();
        let mut total_bytes = 0u64;
        for meta in &metas {
            total_bytes += meta.byte_end - meta.byte_start;
            sources.insert(meta.source.clone());
        }
        Ok(ContextStats {
            chunk_count: metas.len(),
            total_bytes,
            source_count: sources.len(),
        })
    }

    /// List all context IDs
    pub fn list_contexts(&self) -> Result<Vec<ContextId>> {
        let mut contexts = Vec::new();

        for entry in fs::read_dir(&self.base_path)? {
            let entry = entry?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    contexts.push(name.to_string());
                }
            }
        }

        Ok(contexts)
    }

    /// Delete a context and all its data
    pub fn delete(&self, context_id: &str) -> Result<()> {
        let ctx_path = self.base_path.join(context_id);
        if ctx_path.exists() {
            fs::remove_dir_all(&ctx_path)?;
            info!(context_id, "Deleted context");
        }
        Ok(())
    }
}

/// Content hash for change detection, not cryptographic
fn content_hash(data: &[u8]) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ingest_and_search() {
        let temp = TempDir::new().unwrap();
        let store_path = temp.path().join("store");
        let store = ContextStore::open(&store_path).unwrap();

        let test_file = temp.path().join("test.txt");
        fs::write(&test_file, "Hello world, this is a test of the knowledge fabric.").unwrap();

        let ctx_id = store
            .ingest(
                &[test_file.to_string_lossy().to_string()],
                IngestOptions::with_defaults(vec!["docs".into()]),
            )
            .unwrap();

        let matches = store.search(&ctx_id, "knowledge", SearchOptions::bounded(10, vec![])).unwrap();
        assert!(!matches.is_empty());
        assert!(matches[0].snippet.contains("knowledge"));
    }

    #[test]
    fn test_tag_filtered_search_excludes_untagged_chunks() {
        let temp = TempDir::new().unwrap();
        let store = ContextStore::open(temp.path().join("store")).unwrap();

        let tagged = temp.path().join("tagged.txt");
        fs::write(&tagged, "apples and oranges").unwrap();
        let untagged = temp.path().join("untagged.txt");
        fs::write(&untagged, "apples and pears").unwrap();

        let ctx_a = store
            .ingest(
                &[tagged.to_string_lossy().to_string()],
                IngestOptions::with_defaults(vec!["fruit".into()]),
            )
            .unwrap();
        let ctx_b = store.ingest(&[untagged.to_string_lossy().to_string()], IngestOptions::default()).unwrap();

        let matches_a = store.search(&ctx_a, "apples", SearchOptions::bounded(10, vec!["fruit".into()])).unwrap();
        assert_eq!(matches_a.len(), 1);

        let matches_b = store.search(&ctx_b, "apples", SearchOptions::bounded(10, vec!["fruit".into()])).unwrap();
        assert!(matches_b.is_empty());
    }

    #[test]
    fn test_list_and_delete() {
        let temp = TempDir::new().unwrap();
        let store = ContextStore::open(temp.path()).unwrap();

        let test_file = temp.path().join("test.txt");
        fs::write(&test_file, "test content").unwrap();

        let ctx_id = store
            .ingest(&[test_file.to_string_lossy().to_string()], IngestOptions::with_defaults(vec![]))
            .unwrap();

        let contexts = store.list_contexts().unwrap();
        assert!(contexts.contains(&ctx_id));

        store.delete(&ctx_id).unwrap();

        let contexts = store.list_contexts().unwrap();
        assert!(!contexts.contains(&ctx_id));
    }
}
