//! File write tools — overwrite or append to files inside the workspace.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::args::{present_str, required_str, sandboxed};

const MISSING_ARGS: &str = "File path or content not provided.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteMode {
    Overwrite,
    Append,
}

async fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) => tokio::fs::create_dir_all(parent).await,
        None => Ok(()),
    }
}

async fn write_with_mode(path: &Path, content: &str, mode: WriteMode) -> std::io::Result<()> {
    ensure_parent(path).await?;
    match mode {
        WriteMode::Overwrite => tokio::fs::write(path, content).await,
        WriteMode::Append => {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .await?;
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        }
    }
}

async fn run_write(
    arguments: &serde_json::Value,
    context: &ExecutionContext,
    mode: WriteMode,
) -> Result<ToolResult, ToolError> {
    let (Some(path), Some(content)) = (
        required_str(arguments, "path"),
        present_str(arguments, "content"),
    ) else {
        return Err(ToolError::InvalidArguments(MISSING_ARGS.into()));
    };
    let full_path = sandboxed(context, path)?;

    debug!(path = %full_path.display(), bytes = content.len(), ?mode, "Writing file");

    Ok(match (write_with_mode(&full_path, content, mode).await, mode) {
        (Ok(()), WriteMode::Overwrite) => ToolResult::success(format!(
            "File written successfully to {}",
            full_path.display()
        )),
        (Ok(()), WriteMode::Append) => ToolResult::success(format!(
            "File appended successfully to {}",
            full_path.display()
        )),
        (Err(e), WriteMode::Overwrite) => ToolResult::failure(format!("Error writing file: {e}")),
        (Err(e), WriteMode::Append) => ToolResult::failure(format!("Error appending file: {e}")),
    })
}

pub struct WriteFileTool;

#[async_trait]
impl Tool for WriteFileTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::WriteFile
    }

    fn description(&self) -> &str {
        "Writes content to a file, replacing it. Args: {\"path\": \"...\", \"content\": \"...\"}"
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ExecutionContext,
    ) -> ToolResult {
        run_write(&arguments, context, WriteMode::Overwrite)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}

pub struct AppendFileTool;

#[async_trait]
impl Tool for AppendFileTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::AppendFile
    }

    fn description(&self) -> &str {
        "Appends content to a file. Args: {\"path\": \"...\", \"content\": \"...\"}"
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ExecutionContext,
    ) -> ToolResult {
        run_write(&arguments, context, WriteMode::Append)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}

/// Present so the backend can see deletion exists and is disabled.
pub struct DeleteFileTool;

#[async_trait]
impl Tool for DeleteFileTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::DeleteFile
    }

    fn description(&self) -> &str {
        "Deletes a file. (Disabled for safety)"
    }

    async fn execute(&self, _arguments: serde_json::Value, _context: &ExecutionContext) -> ToolResult {
        ToolResult::failure("File deletion is not allowed by safety policy.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn workspace() -> (tempfile::TempDir, ExecutionContext) {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::new(dir.path());
        (dir, ctx)
    }

    #[tokio::test]
    async fn write_reports_absolute_path() {
        let (dir, ctx) = workspace();
        let result = WriteFileTool
            .execute(json!({"path": "hello.txt", "content": "hi"}), &ctx)
            .await;
        assert!(result.ok);
        let expected = dir.path().canonicalize().unwrap().join("hello.txt");
        assert_eq!(
            result.output,
            format!("File written successfully to {}", expected.display())
        );
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "hi");
    }

    #[tokio::test]
    async fn write_overwrites_and_accepts_empty_content() {
        let (dir, ctx) = workspace();
        std::fs::write(dir.path().join("a.txt"), "old").unwrap();
        let result = WriteFileTool
            .execute(json!({"path": "a.txt", "content": ""}), &ctx)
            .await;
        assert!(result.ok);
        assert_eq!(std::fs::read_to_string(dir.path().join("a.txt")).unwrap(), "");
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let (dir, ctx) = workspace();
        let result = WriteFileTool
            .execute(json!({"path": "src/pkg/mod.py", "content": "x = 1\n"}), &ctx)
            .await;
        assert!(result.ok, "{}", result.output);
        assert!(dir.path().join("src/pkg/mod.py").exists());
    }

    #[tokio::test]
    async fn write_requires_both_fields() {
        let (_dir, ctx) = workspace();
        for args in [json!({"path": "a.txt"}), json!({"content": "x"}), json!({"path": "", "content": "x"})] {
            let result = WriteFileTool.execute(args, &ctx).await;
            assert!(!result.ok);
            assert_eq!(result.output, MISSING_ARGS);
        }
    }

    #[tokio::test]
    async fn write_outside_workspace_refused() {
        let (_dir, ctx) = workspace();
        let result = WriteFileTool
            .execute(json!({"path": "..\\escape.txt", "content": "x"}), &ctx)
            .await;
        assert!(!result.ok);
        assert!(result.output.starts_with("Sandbox violation:"));
    }

    #[tokio::test]
    async fn append_extends_file() {
        let (dir, ctx) = workspace();
        std::fs::write(dir.path().join("log.txt"), "one\n").unwrap();
        let result = AppendFileTool
            .execute(json!({"path": "log.txt", "content": "two\n"}), &ctx)
            .await;
        assert!(result.ok);
        assert!(result.output.starts_with("File appended successfully to "));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("log.txt")).unwrap(),
            "one\ntwo\n"
        );
    }

    #[tokio::test]
    async fn append_creates_missing_file() {
        let (dir, ctx) = workspace();
        let result = AppendFileTool
            .execute(json!({"path": "new.txt", "content": "first"}), &ctx)
            .await;
        assert!(result.ok);
        assert_eq!(std::fs::read_to_string(dir.path().join("new.txt")).unwrap(), "first");
    }

    #[tokio::test]
    async fn delete_is_always_refused() {
        let (dir, ctx) = workspace();
        std::fs::write(dir.path().join("keep.txt"), "x").unwrap();
        let result = DeleteFileTool.execute(json!({"path": "keep.txt"}), &ctx).await;
        assert!(!result.ok);
        assert_eq!(result.output, "File deletion is not allowed by safety policy.");
        assert!(dir.path().join("keep.txt").exists());
    }
}
