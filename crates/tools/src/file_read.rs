//! File read tool — read file contents inside the workspace.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};

use crate::args::{required_str, sandboxed};

pub struct ReadFileTool;

impl ReadFileTool {
    async fn run(
        &self,
        arguments: &serde_json::Value,
        context: &ExecutionContext,
    ) -> Result<ToolResult, ToolError> {
        let path = required_str(arguments, "path")
            .ok_or_else(|| ToolError::InvalidArguments("No file path provided.".into()))?;
        let full_path = sandboxed(context, path)?;

        Ok(match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => ToolResult::success(content),
            Err(e) => ToolResult::failure(format!("Error reading file: {e}")),
        })
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::ReadFile
    }

    fn description(&self) -> &str {
        "Reads the content of a file. Args: {\"path\": \"relative/file/path\"}"
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
