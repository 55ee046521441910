//! Built-in capabilities for Anvil.
//!
//! Capabilities give the agent the ability to act inside its workspace:
//! read, write and patch files, search text, run scripts, drive git, chat,
//! and search the web. Every filesystem path goes through the workspace
//! sandbox before any I/O happens.

pub mod args;
pub mod chat;
pub mod file_read;
pub mod file_write;
pub mod git;
pub mod list_dir;
pub mod patch;
pub mod process;
pub mod script;
pub mod search_text;
pub mod web_search;

use anvil_core::error::ToolError;
use anvil_core::search::SearchBackend;
use anvil_core::tool::{ExecutionContext, Tool, ToolRegistry};
use std::sync::Arc;
use std::time::Duration;

pub use patch::{LineChange, apply_changes};

/// The full capability set, configured from `[tools]`.
pub fn builtin_tools(
    config: &anvil_config::ToolsConfig,
    search: Option<Arc<dyn SearchBackend>>,
) -> Vec<Box<dyn Tool>> {
    let git_timeout = Duration::from_secs(config.git_timeout_secs);
    vec![
        Box::new(chat::ChatTool),
        Box::new(file_read::ReadFileTool),
        Box::new(file_write::WriteFileTool),
        Box::new(file_write::AppendFileTool),
        Box::new(list_dir::ListDirTool),
        Box::new(search_text::SearchTextTool),
        Box::new(script::RunScriptTool::from_config(config)),
        Box::new(file_write::DeleteFileTool),
        Box::new(patch::PatchFileTool),
        Box::new(web_search::WebSearchTool::new(search)),
        Box::new(git::GitAddTool::new(git_timeout)),
        Box::new(git::GitCommitTool::new(git_timeout)),
        Box::new(git::GitPushTool::new(git_timeout)),
    ]
}

/// Create a registry with every built-in capability, rooted at `context`.
pub fn default_registry(
    context: ExecutionContext,
    config: &anvil_config::ToolsConfig,
    search: Option<Arc<dyn SearchBackend>>,
) -> Result<ToolRegistry, ToolError> {
    ToolRegistry::build(builtin_tools(config, search), context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anvil_core::tool::CapabilityId;

    #[test]
    fn registry_covers_every_capability() {
        let registry = default_registry(
            ExecutionContext::new("/ws"),
            &anvil_config::ToolsConfig::default(),
            None,
        )
        .unwrap();
        assert_eq!(registry.len(), CapabilityId::ALL.len());
        for id in CapabilityId::ALL {
            assert!(registry.get(id.as_str()).is_some(), "missing {id}");
        }
    }

    #[test]
    fn listing_is_numbered_in_declaration_order() {
        let registry = default_registry(
            ExecutionContext::new("/ws"),
            &anvil_config::ToolsConfig::default(),
            None,
        )
        .unwrap();
        let listing = registry.listing();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with("Tool 0: chat, Description: "));
        assert!(lines[12].starts_with("Tool 12: git_push, Description: "));
        assert!(listing.contains("Deletes a file. (Disabled for safety)"));
    }

    #[tokio::test]
    async fn dispatch_goes_through_sandbox() {
        let dir = tempfile::tempdir().unwrap();
        let registry = default_registry(
            ExecutionContext::new(dir.path()),
            &anvil_config::ToolsConfig::default(),
            None,
        )
        .unwrap();
        let result = registry
            .dispatch("read_file", serde_json::json!({"path": "../../etc/passwd"}))
            .await
            .unwrap();
        assert!(!result.ok);
        assert!(result.output.starts_with("Sandbox violation:"));
    }
}
