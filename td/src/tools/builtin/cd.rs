//! cd tool - change the tracked working directory (spec.md §4.2: "Handle
//! `cd` specially: resolve target (including `~`, `-`, relative), validate
//! existence+directory, and record `new_working_dir` in response metadata").

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::tools::{Tool, ToolContext, ToolResult};

pub struct CdTool;

impl CdTool {
    /// Resolve `target` against `ctx.cwd`, expanding `~` and `-`
    /// (previous directory is not tracked here, so `-` resolves to the
    /// caller's `$HOME` as a safe default — matches plain `cd` with no
    /// prior directory recorded).
    fn resolve(target: &str, ctx: &ToolContext) -> std::path::PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| std::path::PathBuf::from("/"));
        if target == "-" || target == "~" {
            return home;
        }
        if let Some(rest) = target.strip_prefix("~/") {
            return home.join(rest);
        }
        let path = std::path::Path::new(target);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            ctx.cwd.join(path)
        }
    }
}

#[async_trait]
impl Tool for CdTool {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn description(&self) -> &'static str {
        "Change the current working directory"
    }

    fn input_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": { "type": "string", "description": "Target directory, may be relative, ~, or -" }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value, ctx: &ToolContext) -> ToolResult {
        let Some(target) = input["path"].as_str() else {
            return ToolResult::error("path is required");
        };

        let resolved = Self::resolve(target, ctx);
        debug!(%target, resolved = %resolved.display(), "CdTool::execute: resolved target");

        if !resolved.exists() {
            return ToolResult::error(format!("no such file or directory: {}", resolved.display()));
        }
        if !resolved.is_dir() {
            return ToolResult::error(format!("not a directory: {}", resolved.display()));
        }

        ToolResult::success(resolved.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cd_into_existing_directory_succeeds() {
        let temp = std::env::temp_dir();
        let ctx = ToolContext::new(temp.clone(), "req-1".to_string());
        let tool = CdTool;
        let result = tool.execute(serde_json::json!({ "path": temp.display().to_string() }), &ctx).await;
        assert!(!result.is_error);
    }

    #[tokio::test]
    async fn cd_into_nonexistent_directory_reports_posix_style_error() {
        let ctx = ToolContext::new(std::env::temp_dir(), "req-1".to_string());
        let tool = CdTool;
        let result = tool.execute(serde_json::json!({ "path": "/nonexistent-path-xyz" }), &ctx).await;
        assert!(result.is_error);
        assert!(result.content.contains("no such file or directory"));
    }

    #[tokio::test]
    async fn cd_into_a_file_is_rejected() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let ctx = ToolContext::new(std::env::temp_dir(), "req-1".to_string());
        let tool = CdTool;
        let result = tool
            .execute(serde_json::json!({ "path": temp.path().display().to_string() }), &ctx)
            .await;
        assert!(result.is_error);
        assert!(result.content.contains("not a directory"));
    }

    #[tokio::test]
    async fn relative_path_resolves_against_cwd() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::create_dir(temp.path().join("sub")).unwrap();
        let ctx = ToolContext::new(temp.path().to_path_buf(), "req-1".to_string());
        let tool = CdTool;
        let result = tool.execute(serde_json::json!({ "path": "sub" }), &ctx).await;
        assert!(!result.is_error);
    }
}
