//! Line-based patch engine and the `patch_file` capability.
//!
//! Changes address 0-based line indices of the file as it was read. They
//! are applied in descending line order (stable for equal lines), so an
//! edit never shifts the index of an edit still pending. Each change is
//! bounds-checked against the line count at the moment it is applied;
//! out-of-range and malformed changes are skipped.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::args::{required_str, sandboxed};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Remove,
    Replace,
    Insert,
}

impl ChangeAction {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "remove" => Some(Self::Remove),
            "replace" => Some(Self::Replace),
            "insert" => Some(Self::Insert),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub action: ChangeAction,
    pub line: i64,
    pub content: String,
}

impl LineChange {
    pub fn remove(line: i64) -> Self {
        Self { action: ChangeAction::Remove, line, content: String::new() }
    }

    pub fn replace(line: i64, content: impl Into<String>) -> Self {
        Self { action: ChangeAction::Replace, line, content: content.into() }
    }

    pub fn insert(line: i64, content: impl Into<String>) -> Self {
        Self { action: ChangeAction::Insert, line, content: content.into() }
    }

    /// Decode one entry of the backend's `changes` list.
    pub fn from_value(value: &Value) -> Option<Self> {
        let action = ChangeAction::parse(value.get("action")?.as_str()?)?;
        let line = value.get("line")?.as_i64()?;
        let content = value
            .get("content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some(Self { action, line, content })
    }
}

/// Apply `changes` to `lines` in place. Returns how many were applied.
///
/// Lines keep their own terminators; inserted and replaced lines get a `\n`.
pub fn apply_changes(lines: &mut Vec<String>, changes: &[LineChange]) -> usize {
    let mut ordered: Vec<&LineChange> = changes.iter().collect();
    ordered.sort_by(|a, b| b.line.cmp(&a.line));

    let mut applied = 0;
    for change in ordered {
        let len = lines.len();
        let Ok(idx) = usize::try_from(change.line) else {
            continue;
        };
        match change.action {
            ChangeAction::Remove if idx < len => {
                lines.remove(idx);
            }
            ChangeAction::Replace if idx < len => {
                lines[idx] = format!("{}\n", change.content);
            }
            ChangeAction::Insert if idx <= len => {
                lines.insert(idx, format!("{}\n", change.content));
            }
            _ => continue,
        }
        applied += 1;
    }
    applied
}

/// Split file content into lines, each keeping its terminator.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

pub struct PatchFileTool;

impl PatchFileTool {
    async fn run(
        &self,
        arguments: &Value,
        context: &ExecutionContext,
    ) -> Result<ToolResult, ToolError> {
        let (Some(path), Some(raw_changes)) = (
            required_str(arguments, "path"),
            arguments.get("changes").and_then(Value::as_array),
        ) else {
            return Err(ToolError::InvalidArguments(
                "Missing 'path' or 'changes' (must be a list).".into(),
            ));
        };
        let full_path = sandboxed(context, path)?;

        let changes: Vec<LineChange> = raw_changes
            .iter()
            .filter_map(|value| {
                let change = LineChange::from_value(value);
                if change.is_none() {
                    warn!(entry = %value, "Skipping malformed patch entry");
                }
                change
            })
            .collect();

        let content = match tokio::fs::read_to_string(&full_path).await {
            Ok(content) => content,
            Err(e) => return Ok(ToolResult::failure(format!("Error patching file: {e}"))),
        };

        let mut lines = split_lines(&content);
        let applied = apply_changes(&mut lines, &changes);
        debug!(
            path = %full_path.display(),
            attempted = raw_changes.len(),
            applied,
            "Patch applied"
        );

        if let Err(e) = tokio::fs::write(&full_path, lines.concat()).await {
            return Ok(ToolResult::failure(format!("Error patching file: {e}")));
        }

        // Reports the attempted count; skipped changes are not distinguished.
        Ok(ToolResult::success(format!(
            "Applied {} changes to {}",
            raw_changes.len(),
            full_path.display()
        )))
    }
}

#[async_trait]
impl Tool for PatchFileTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::PatchFile
    }

    fn description(&self) -> &str {
        "Applies a list of line-based changes (diff patch) to a file. Lines are 0-based. \
         Usage: args={'path':..., 'changes':[{'action':'replace','line':2,'content':'new text'}, ...]} \
         where action is one of remove, replace, insert"
    }

    async fn execute(&self, arguments: Value, context: &ExecutionContext) -> ToolResult {
        self.run(&arguments, context)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}
