//! Recursive verbatim text search across workspace files.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use std::path::{Path, PathBuf};
use tracing::trace;
use walkdir::WalkDir;

use crate::args::{required_str, sandboxed};

pub struct SearchTextTool;

/// Files under `dir` whose content contains `needle`, case-sensitively.
///
/// Unreadable and non-UTF-8 files are skipped.
pub fn find_files_containing(dir: &Path, needle: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| match std::fs::read_to_string(entry.path()) {
            Ok(content) => content.contains(needle),
            Err(e) => {
                trace!(path = %entry.path().display(), error = %e, "Skipping unreadable file");
                false
            }
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

impl SearchTextTool {
    async fn run(
        &self,
        arguments: &serde_json::Value,
        context: &ExecutionContext,
    ) -> Result<ToolResult, ToolError> {
        let needle = required_str(arguments, "text")
            .ok_or_else(|| ToolError::InvalidArguments("No search text provided.".into()))?
            .to_string();
        let dir = sandboxed(context, arguments["path"].as_str().unwrap_or(""))?;

        if !dir.is_dir() {
            return Ok(ToolResult::failure(format!(
                "Error searching files: '{}' is not a directory",
                dir.display()
            )));
        }

        let matches = tokio::task::spawn_blocking(move || find_files_containing(&dir, &needle))
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: e.to_string(),
            })?;

        if matches.is_empty() {
            return Ok(ToolResult::success("No matching files found."));
        }

        Ok(ToolResult::success(
            matches
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n"),
        ))
    }
}

#[async_trait]
impl Tool for SearchTextTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::SearchTextInFiles
    }

    fn description(&self) -> &str {
        "Searches for text in files within a directory. Args: {\"text\": \"...\", \"path\": \"optional dir\"}"
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
