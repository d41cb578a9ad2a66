//! Built-in tools available to the tool execution stage (spec.md §4.2).
//!
//! Concrete shell/file-system/web tools are explicitly out of scope
//! (spec.md §1); `bash` and `cd` are the two the core's own tool execution
//! stage and its `cd`-special-case depend on directly.

mod cd;
mod run_command;

pub use cd::CdTool;
pub use run_command::RunCommandTool;
