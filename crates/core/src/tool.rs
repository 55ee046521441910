//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in its workspace:
//! read/write/patch files, search, run scripts, drive git, etc.
//!
//! The set of capability names is closed ([`CapabilityId`]); the backend's
//! free-form tool string is resolved through [`ToolRegistry::get`] /
//! [`ToolRegistry::dispatch`], which report unknown names explicitly instead
//! of panicking.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The closed set of capabilities the agent may invoke.
///
/// Declaration order is the order tools are listed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityId {
    Chat,
    ReadFile,
    WriteFile,
    AppendFile,
    ListDir,
    SearchTextInFiles,
    RunScript,
    DeleteFile,
    PatchFile,
    SearchWeb,
    GitAdd,
    GitCommit,
    GitPush,
}

impl CapabilityId {
    pub const ALL: [CapabilityId; 13] = [
        CapabilityId::Chat,
        CapabilityId::ReadFile,
        CapabilityId::WriteFile,
        CapabilityId::AppendFile,
        CapabilityId::ListDir,
        CapabilityId::SearchTextInFiles,
        CapabilityId::RunScript,
        CapabilityId::DeleteFile,
        CapabilityId::PatchFile,
        CapabilityId::SearchWeb,
        CapabilityId::GitAdd,
        CapabilityId::GitCommit,
        CapabilityId::GitPush,
    ];

    /// The wire name the backend uses for this capability.
    pub fn as_str(self) -> &'static str {
        match self {
            CapabilityId::Chat => "chat",
            CapabilityId::ReadFile => "read_file",
            CapabilityId::WriteFile => "write_file",
            CapabilityId::AppendFile => "append_file",
            CapabilityId::ListDir => "list_dir",
            CapabilityId::SearchTextInFiles => "search_text_in_files",
            CapabilityId::RunScript => "run_script",
            CapabilityId::DeleteFile => "delete_file",
            CapabilityId::PatchFile => "patch_file",
            CapabilityId::SearchWeb => "search_web",
            CapabilityId::GitAdd => "git_add",
            CapabilityId::GitCommit => "git_commit",
            CapabilityId::GitPush => "git_push",
        }
    }

    /// Resolve a wire name. Returns `None` for anything outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == name)
    }

    /// Whether a successful call changes the content of the file at `args.path`.
    pub fn modifies_file(self) -> bool {
        matches!(
            self,
            CapabilityId::WriteFile | CapabilityId::AppendFile | CapabilityId::PatchFile
        )
    }
}

impl std::fmt::Display for CapabilityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State shared (read-only) by every capability invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionContext {
    /// Absolute sandbox root. Every filesystem capability resolves under it.
    pub workspace: PathBuf,
}

impl ExecutionContext {
    /// Create a context rooted at `workspace`, made absolute against the
    /// current directory if it is relative.
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        let workspace = workspace.into();
        let workspace = if workspace.is_absolute() {
            workspace
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&workspace))
                .unwrap_or(workspace)
        };
        Self { workspace }
    }

    pub fn workspace(&self) -> &Path {
        &self.workspace
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// The result of a tool execution.
///
/// `output` is always human-readable text, whether the call succeeded or
/// not; it is fed back to the backend verbatim as the next observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub ok: bool,

    /// The output content (payload on success, diagnostic on failure)
    pub output: String,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            ok: true,
            output: output.into(),
        }
    }

    pub fn failure(output: impl Into<String>) -> Self {
        Self {
            ok: false,
            output: output.into(),
        }
    }
}

impl From<ToolError> for ToolResult {
    fn from(err: ToolError) -> Self {
        Self::failure(err.to_string())
    }
}

/// The core Tool trait.
///
/// Each capability implements this trait. Implementations never fail past
/// their own boundary: every internal error becomes `ToolResult { ok: false }`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Which capability this tool provides.
    fn id(&self) -> CapabilityId;

    /// The unique name of this tool (e.g., "read_file").
    fn name(&self) -> &'static str {
        self.id().as_str()
    }

    /// A description of what this tool does (sent to the backend).
    fn description(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value, context: &ExecutionContext)
    -> ToolResult;
}

/// The dispatch table mapping capability ids to implementations, plus the
/// shared execution context.
///
/// Built once via [`ToolRegistry::build`]; immutable afterwards.
pub struct ToolRegistry {
    tools: BTreeMap<CapabilityId, Box<dyn Tool>>,
    context: ExecutionContext,
}

impl ToolRegistry {
    /// Build a registry from a list of tools. Each capability may be
    /// provided at most once.
    pub fn build(
        tools: Vec<Box<dyn Tool>>,
        context: ExecutionContext,
    ) -> Result<Self, ToolError> {
        let mut map = BTreeMap::new();
        for tool in tools {
            let id = tool.id();
            if map.insert(id, tool).is_some() {
                return Err(ToolError::Duplicate(id.to_string()));
            }
        }
        Ok(Self {
            tools: map,
            context,
        })
    }

    /// Get a tool by its wire name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        let id = CapabilityId::from_name(name)?;
        self.tools.get(&id).map(|t| t.as_ref())
    }

    /// The shared execution context.
    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    /// Execute a tool by name against the shared context.
    pub async fn dispatch(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        debug!(tool = name, "Dispatching tool");
        Ok(tool.execute(arguments, &self.context).await)
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().map(|id| id.as_str()).collect()
    }

    /// Render the numbered capability listing embedded in the system prompt.
    pub fn listing(&self) -> String {
        if self.tools.is_empty() {
            return "No tools registered.".into();
        }
        self.tools
            .values()
            .enumerate()
            .map(|(idx, tool)| {
                format!(
                    "Tool {idx}: {}, Description: {}",
                    tool.name(),
                    tool.description()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
