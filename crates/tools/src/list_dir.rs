//! Directory listing tool.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};

use crate::args::sandboxed;

pub struct ListDirTool;

impl ListDirTool {
    async fn run(
        &self,
        arguments: &serde_json::Value,
        context: &ExecutionContext,
    ) -> Result<ToolResult, ToolError> {
        // Absent path lists the root itself.
        let path = arguments["path"].as_str().unwrap_or("");
        let full_path = sandboxed(context, path)?;

        let mut entries = match tokio::fs::read_dir(&full_path).await {
            Ok(entries) => entries,
            Err(e) => return Ok(ToolResult::failure(format!("Error listing directory: {e}"))),
        };

        let mut names = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
                Ok(None) => break,
                Err(e) => return Ok(ToolResult::failure(format!("Error listing directory: {e}"))),
            }
        }
        names.sort();

        Ok(ToolResult::success(names.join("\n")))
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::ListDir
    }

    fn description(&self) -> &str {
        "Lists files in a directory. Args: {\"path\": \"optional dir, defaults to workspace root\"}"
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        context: &ExecutionContext,
    ) -> ToolResult {
        self.run(&arguments, context)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn lists_root_by_default_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "").unwrap();
        std::fs::write(dir.path().join("a.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        let ctx = ExecutionContext::new(dir.path());

        let result = ListDirTool.execute(json!({}), &ctx).await;
        assert!(result.ok);
        assert_eq!(result.output, "a.txt\nb.txt\nsrc");
    }

    #[tokio::test]
    async fn lists_subdirectory_and_absolute_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("src/main.py"), "").unwrap();
        let ctx = ExecutionContext::new(dir.path());

        let result = ListDirTool.execute(json!({"path": "src"}), &ctx).await;
        assert_eq!(result.output, "main.py");

        let root = dir.path().to_string_lossy().into_owned();
        let result = ListDirTool.execute(json!({"path": root}), &ctx).await;
        assert!(result.ok, "{}", result.output);
        assert_eq!(result.output, "src");
    }

    #[tokio::test]
    async fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::new(dir.path());
        let result = ListDirTool.execute(json!({"path": "ghost"}), &ctx).await;
        assert!(!result.ok);
        assert!(result.output.starts_with("Error listing directory:"));
    }

    #[tokio::test]
    async fn parent_listing_refused() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::new(dir.path());
        let result = ListDirTool.execute(json!({"path": ".."}), &ctx).await;
        assert!(!result.ok);
        assert!(result.output.starts_with("Sandbox violation:"));
    }
}
