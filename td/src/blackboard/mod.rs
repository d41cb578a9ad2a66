//! Concurrency-safe working memory for a single request (spec.md §3, §4.4).
//!
//! A [`Blackboard`] is created when the lobe executive is invoked for a
//! request and destroyed when the response is built; it is never shared
//! across requests. Lobes cooperate by reading and writing through a
//! shared `Arc<Blackboard>` clone.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;

/// A detected entity span within the raw request input. Intervals are
/// half-open `[start, end)` and must lie within the input (spec.md §4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub entity_type: String,
    pub value: String,
    pub start: usize,
    pub end: usize,
}

/// A retrieved or inferred memory/knowledge passage.
#[derive(Debug, Clone)]
pub struct Memory {
    pub content: String,
    pub relevance: f32,
}

/// User-scoped affect/expertise signals consulted by lobes when shaping
/// their output (spec.md §3, "UserState?").
#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub expertise: Option<String>,
    pub mood: Option<String>,
    pub tone: Option<String>,
}

struct Inner {
    conversation_id: String,
    memories: Vec<Memory>,
    entities: Vec<Entity>,
    user_state: Option<UserState>,
    overall_confidence: f32,
    fields: HashMap<String, Value>,
}

/// Concurrency-safe shared working memory for one request (spec.md §3,
/// §4.4: "Blackboard").
///
/// `clone()` produces an immutable snapshot and freezes the original: all
/// subsequent writes to the original are silently dropped rather than
/// panicking (spec.md §9, design note on blackboard clone semantics).
pub struct Blackboard {
    inner: RwLock<Inner>,
    frozen: AtomicBool,
}

impl Blackboard {
    pub fn new(conversation_id: impl Into<String>) -> Self {
        Self {
            inner: RwLock::new(Inner {
                conversation_id: conversation_id.into(),
                memories: Vec::new(),
                entities: Vec::new(),
                user_state: None,
                overall_confidence: 0.0,
                fields: HashMap::new(),
            }),
            frozen: AtomicBool::new(false),
        }
    }

    pub fn conversation_id(&self) -> String {
        self.inner.read().unwrap().conversation_id.clone()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    /// Read a free-form field previously written with [`Blackboard::set`].
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().unwrap().fields.get(key).cloned()
    }

    /// Write a free-form field. A no-op once this blackboard is frozen.
    pub fn set(&self, key: impl Into<String>, value: Value) {
        if self.is_frozen() {
            return;
        }
        self.inner.write().unwrap().fields.insert(key.into(), value);
    }

    /// Append a memory. Safe under concurrent calls: no item is lost.
    pub fn add_memory(&self, memory: Memory) {
        if self.is_frozen() {
            return;
        }
        self.inner.write().unwrap().memories.push(memory);
    }

    pub fn memories(&self) -> Vec<Memory> {
        self.inner.read().unwrap().memories.clone()
    }

    /// Append an entity. Intervals are not validated here — callers
    /// (the stage that extracted the entity) are responsible for keeping
    /// `[start, end)` within the raw input.
    pub fn add_entity(&self, entity: Entity) {
        if self.is_frozen() {
            return;
        }
        self.inner.write().unwrap().entities.push(entity);
    }

    /// Entities sorted by `start` (spec.md §4.4: "Entities remain sorted by
    /// `start` on read").
    pub fn entities(&self) -> Vec<Entity> {
        let mut entities = self.inner.read().unwrap().entities.clone();
        entities.sort_by_key(|e| e.start);
        entities
    }

    pub fn set_user_state(&self, state: UserState) {
        if self.is_frozen() {
            return;
        }
        self.inner.write().unwrap().user_state = Some(state);
    }

    pub fn user_state(&self) -> Option<UserState> {
        self.inner.read().unwrap().user_state.clone()
    }

    /// Merge a new confidence reading into the running overall confidence,
    /// clamped to `[0,1]` (spec.md §3: `OverallConfidence ∈ [0,1]`).
    pub fn set_overall_confidence(&self, confidence: f32) {
        if self.is_frozen() {
            return;
        }
        self.inner.write().unwrap().overall_confidence = confidence.clamp(0.0, 1.0);
    }

    pub fn overall_confidence(&self) -> f32 {
        self.inner.read().unwrap().overall_confidence
    }

    /// Produce an immutable snapshot. The receiver (`self`) is frozen as a
    /// side effect; any write issued to it afterward is a no-op, and
    /// previously returned snapshots are never affected (spec.md §4.4,
    /// testable property #6).
    pub fn clone_frozen(&self) -> Blackboard {
        self.frozen.store(true, Ordering::Release);
        let guard = self.inner.read().unwrap();
        Blackboard {
            inner: RwLock::new(Inner {
                conversation_id: guard.conversation_id.clone(),
                memories: guard.memories.clone(),
                entities: guard.entities.clone(),
                user_state: guard.user_state.clone(),
                overall_confidence: guard.overall_confidence,
                fields: guard.fields.clone(),
            }),
            frozen: AtomicBool::new(true),
        }
    }
}
