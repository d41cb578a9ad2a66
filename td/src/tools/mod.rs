//! Tool system consumed by the tool execution stage (spec.md §4.2, §4.5).
//!
//! Concrete tool implementations beyond `bash`/`cd` are a plug-in surface
//! (spec.md §1 non-goal); the coordinator contract and the two tools the
//! core itself special-cases live here.

mod context;
mod error;
mod executor;
mod traits;

pub mod builtin;

pub use context::ToolContext;
pub use error::ToolError;
pub use executor::{SecurityPolicy, ToolExecutor, ToolStats};
pub use traits::{Tool, ToolResult};
