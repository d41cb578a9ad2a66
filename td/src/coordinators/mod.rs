//! Coordinators (spec.md §4.5): thin facade traits consumed by pipeline
//! stages, each with a canonical "disabled" (`Noop*`) variant constructed
//! explicitly at composition time (spec.md §9: "Model coordinators as sum
//! types or capability interfaces with a canonical disabled variant").

mod cognitive;
mod memory;
mod persona;
mod sqlite_memory;
mod tools;

pub use cognitive::{CognitiveCoordinator, CognitiveStats, NoopCognitiveCoordinator};
pub use memory::{MemoryCoordinator, MemoryField, MemoryStats, NoopMemoryCoordinator, ProjectMemory, UserMemory};
pub use persona::{Mode, NoopPersonaCoordinator, Persona, PersonaCoordinator, PersonaStats};
pub use sqlite_memory::SqliteMemoryCoordinator;
pub use tools::{DefaultToolsCoordinator, NoopToolsCoordinator, ToolsCoordinator};

use thiserror::Error;

/// The capability-not-configured error every coordinator returns instead of
/// panicking when its underlying resource is absent (spec.md §4.5,
/// "coordinators must be safe to call when their underlying resource is
/// not configured").
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("{capability} is not configured")]
    NotConfigured { capability: &'static str },

    #[error("unknown persona: {id}")]
    UnknownPersona { id: String },

    #[error("unknown mode: {mode}")]
    UnknownMode { mode: String },

    #[error("{0}")]
    Other(String),
}
