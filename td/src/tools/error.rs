//! Tool error types (spec.md §7: tool errors attach to state as a failed
//! `ToolResult`; the pipeline continues).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("no such file or directory: {path}")]
    NotFound { path: String },

    #[error("command timed out after {timeout_ms}ms")]
    CommandTimeout { timeout_ms: u64 },

    #[error("tool not found: {name}")]
    UnknownTool { name: String },

    #[error("denied by security policy: {tool} requires confirmation")]
    RequiresConfirmation { tool: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_matches_cd_failure_wording() {
        let err = ToolError::NotFound {
            path: "/nonexistent".to_string(),
        };
        assert!(err.to_string().contains("no such file or directory"));
    }
}
