//! SQLite-backed persistent state: user memory, project memory, archival
//! knowledge entries, and registered tool definitions.
//!
//! Archival queries run through a small generic `Filter`/`FilterOp`/
//! `IndexValue` layer rather than hand-written SQL per caller, the same
//! shape a generic task store exposes for its own record queries.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

use crate::error::MemoryError;

/// A value an archival field can be filtered against.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValue {
    Text(String),
    Real(f64),
}

/// Comparison applied between a field and an [`IndexValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Like,
    Gte,
}

/// One predicate in a [`Store::query_archival`] call. Predicates are ANDed.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: &'static str,
    pub op: FilterOp,
    pub value: IndexValue,
}

impl Filter {
    pub fn eq_text(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            op: FilterOp::Eq,
            value: IndexValue::Text(value.into()),
        }
    }

    pub fn contains(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            op: FilterOp::Like,
            value: IndexValue::Text(format!("%{}%", value.into())),
        }
    }

    pub fn gte_real(field: &'static str, value: f64) -> Self {
        Self {
            field,
            op: FilterOp::Gte,
            value: IndexValue::Real(value),
        }
    }

    fn sql_op(&self) -> &'static str {
        match self.op {
            FilterOp::Eq => "=",
            FilterOp::Like => "LIKE",
            FilterOp::Gte => ">=",
        }
    }
}

/// A persisted record identified by a stable row id.
pub trait Record {
    fn id(&self) -> i64;
}

#[derive(Debug, Clone, Default)]
pub struct UserMemoryRow {
    pub name: Option<String>,
    pub role: Option<String>,
    pub experience: Option<String>,
    pub os: Option<String>,
    pub shell: Option<String>,
    pub editor: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectMemoryRow {
    pub summary: Option<String>,
    pub conventions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ArchivalEntry {
    pub id: i64,
    pub content: String,
    pub tags: Vec<String>,
    pub relevance: f32,
    pub created_at: i64,
}

impl Record for ArchivalEntry {
    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone)]
pub struct ToolDefinitionRow {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

const USER_MEMORY_FIELDS: &[&str] = &["name", "role", "experience", "os", "shell", "editor"];

/// Persistent store for user memory, project memory, archival knowledge,
/// and registered tool definitions, backed by a single SQLite file.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self, MemoryError> {
        let conn = Connection::open_in_memory()?;
        Self::migrate(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn migrate(conn: &Connection) -> Result<(), MemoryError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_memory (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                name TEXT, role TEXT, experience TEXT, os TEXT, shell TEXT, editor TEXT
            );
            CREATE TABLE IF NOT EXISTS project_memory (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                summary TEXT,
                conventions TEXT NOT NULL DEFAULT '[]'
            );
            CREATE TABLE IF NOT EXISTS archival (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                relevance REAL NOT NULL DEFAULT 1.0,
                created_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS tool_definitions (
                name TEXT PRIMARY KEY,
                description TEXT NOT NULL,
                input_schema TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    pub fn get_user_memory(&self) -> Result<UserMemoryRow, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row(
                "SELECT name, role, experience, os, shell, editor FROM user_memory WHERE id = 1",
                [],
                |r| {
                    Ok(UserMemoryRow {
                        name: r.get(0)?,
                        role: r.get(1)?,
                        experience: r.get(2)?,
                        os: r.get(3)?,
                        shell: r.get(4)?,
                        editor: r.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(row.unwrap_or_default())
    }

    /// Update a single named field (one of [`USER_MEMORY_FIELDS`]).
    pub fn update_user_memory(&self, field: &str, value: &str) -> Result<(), MemoryError> {
        if !USER_MEMORY_FIELDS.contains(&field) {
            return Err(MemoryError::UnknownField(field.to_string()));
        }
        let conn = self.conn.lock().unwrap();
        conn.execute("INSERT OR IGNORE INTO user_memory (id) VALUES (1)", [])?;
        let sql = format!("UPDATE user_memory SET {field} = ?1 WHERE id = 1");
        conn.execute(&sql, params![value])?;
        Ok(())
    }

    pub fn get_project_memory(&self) -> Result<ProjectMemoryRow, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let row = conn
            .query_row("SELECT summary, conventions FROM project_memory WHERE id = 1", [], |r| {
                let conventions_json: String = r.get(1)?;
                Ok((r.get::<_, Option<String>>(0)?, conventions_json))
            })
            .optional()?;
        match row {
            Some((summary, conventions_json)) => Ok(ProjectMemoryRow {
                summary,
                conventions: serde_json::from_str(&conventions_json)?,
            }),
            None => Ok(ProjectMemoryRow::default()),
        }
    }

    pub fn set_project_memory(&self, summary: Option<&str>, conventions: &[String]) -> Result<(), MemoryError> {
        let conn = self.conn.lock().unwrap();
        let conventions_json = serde_json::to_string(conventions)?;
        conn.execute(
            "INSERT INTO project_memory (id, summary, conventions) VALUES (1, ?1, ?2)
             ON CONFLICT(id) DO UPDATE SET summary = excluded.summary, conventions = excluded.conventions",
            params![summary, conventions_json],
        )?;
        Ok(())
    }

    pub fn insert_archival(&self, content: &str, tags: &[String]) -> Result<i64, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let tags_json = serde_json::to_string(tags)?;
        let created_at = chrono::Utc::now().timestamp_millis();
        conn.execute(
            "INSERT INTO archival (content, tags, relevance, created_at) VALUES (?1, ?2, 1.0, ?3)",
            params![content, tags_json, created_at],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Run a tag/content filtered archival query, most-recent first,
    /// bounded by `limit`.
    pub fn query_archival(&self, filters: &[Filter], limit: usize) -> Result<Vec<ArchivalEntry>, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let mut sql = String::from("SELECT id, content, tags, relevance, created_at FROM archival");
        let mut bound: Vec<String> = Vec::new();

        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            let clauses: Vec<String> = filters
                .iter()
                .enumerate()
                .map(|(i, f)| {
                    let value = match &f.value {
                        IndexValue::Text(t) => t.clone(),
                        IndexValue::Real(r) => r.to_string(),
                    };
                    bound.push(value);
                    format!("{} {} ?{}", f.field, f.sql_op(), i + 1)
                })
                .collect();
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC LIMIT ?");
        bound.push(limit.to_string());

        let mut stmt = conn.prepare(&sql)?;
        let params: Vec<&dyn rusqlite::ToSql> = bound.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
        let rows = stmt.query_map(params.as_slice(), |r| {
            let tags_json: String = r.get(2)?;
            Ok((
                r.get::<_, i64>(0)?,
                r.get::<_, String>(1)?,
                tags_json,
                r.get::<_, f64>(3)?,
                r.get::<_, i64>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, content, tags_json, relevance, created_at) = row?;
            entries.push(ArchivalEntry {
                id,
                content,
                tags: serde_json::from_str(&tags_json)?,
                relevance: relevance as f32,
                created_at,
            });
        }
        Ok(entries)
    }

    /// Tag-filtered substring search over archival content, bounded by `k`.
    pub fn search_archival(&self, query: &str, tags: &[String], k: usize) -> Result<Vec<ArchivalEntry>, MemoryError> {
        let mut filters = Vec::new();
        if !query.is_empty() {
            filters.push(Filter::contains("content", query));
        }
        // OR semantics across tags isn't expressible with pure AND filters,
        // so narrow to the first tag when present; callers that need full
        // OR-of-tags should issue one query per tag and merge.
        if let Some(tag) = tags.first() {
            filters.push(Filter::contains("tags", tag.clone()));
        }
        self.query_archival(&filters, k)
    }

    pub fn register_tool_definition(&self, name: &str, description: &str, input_schema: &serde_json::Value) -> Result<(), MemoryError> {
        let conn = self.conn.lock().unwrap();
        let schema_json = serde_json::to_string(input_schema)?;
        conn.execute(
            "INSERT INTO tool_definitions (name, description, input_schema) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET description = excluded.description, input_schema = excluded.input_schema",
            params![name, description, schema_json],
        )?;
        Ok(())
    }

    pub fn get_tool_definitions(&self) -> Result<Vec<ToolDefinitionRow>, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT name, description, input_schema FROM tool_definitions ORDER BY name")?;
        let rows = stmt.query_map([], |r| {
            let schema_json: String = r.get(2)?;
            Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?, schema_json))
        })?;
        let mut defs = Vec::new();
        for row in rows {
            let (name, description, schema_json) = row?;
            defs.push(ToolDefinitionRow {
                name,
                description,
                input_schema: serde_json::from_str(&schema_json)?,
            });
        }
        Ok(defs)
    }

    pub fn archival_count(&self) -> Result<u64, MemoryError> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM archival", [], |r| r.get(0))?;
        Ok(count as u64)
    }
}
