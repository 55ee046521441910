//! Git tools — stage, commit, and push through the `git` binary.
//!
//! Every invocation uses a fixed argument vector with the workspace as cwd.
//! Backend-supplied values never reach git in option position: pathspecs
//! follow `--`, and remote or branch names starting with `-` are refused.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

use crate::args::{required_str, str_or};
use crate::process;

const GIT: &str = "git";

/// Validate a remote or branch name before it is placed in argv.
fn ref_arg<'a>(name: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.is_empty()
        || value.starts_with('-')
        || value.chars().any(|c| c.is_whitespace() || c.is_control())
    {
        warn!(name, value, "Rejected git argument");
        return Err(ToolError::InvalidArguments(format!(
            "Invalid git {name}: '{value}'"
        )));
    }
    Ok(value)
}

/// Pathspecs from `files`: a single string or a list of strings. Defaults to `.`.
fn pathspecs(arguments: &Value) -> Result<Vec<String>, ToolError> {
    match arguments.get("files") {
        None | Some(Value::Null) => Ok(vec![".".into()]),
        Some(Value::String(file)) => Ok(vec![file.clone()]),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ToolError::InvalidArguments("'files' must be a string or a list of strings.".into())
                })
            })
            .collect(),
        Some(_) => Err(ToolError::InvalidArguments(
            "'files' must be a string or a list of strings.".into(),
        )),
    }
}

pub struct GitAddTool {
    timeout: Duration,
}

impl GitAddTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, arguments: &Value, context: &ExecutionContext) -> Result<ToolResult, ToolError> {
        let files = pathspecs(arguments)?;
        for file in &files {
            anvil_security::resolve(context.workspace(), file)
                .map_err(|e| ToolError::SandboxViolation(e.to_string()))?;
        }

        for file in &files {
            let output = process::run(
                self.name(),
                GIT,
                &["add", "--", file.as_str()],
                context.workspace(),
                self.timeout,
            )
            .await?;
            if !output.success {
                return Ok(ToolResult::failure(format!(
                    "Error adding {file}: {}",
                    output.stderr.trim_end()
                )));
            }
        }

        Ok(ToolResult::success(format!("Successfully added {files:?}")))
    }
}

#[async_trait]
impl Tool for GitAddTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::GitAdd
    }

    fn description(&self) -> &str {
        "Add files to git staging area. Args: {\"files\": \"path\" or [\"a\", \"b\"], defaults to \".\"}"
    }

    async fn execute(&self, arguments: Value, context: &ExecutionContext) -> ToolResult {
        self.run(&arguments, context)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}

pub struct GitCommitTool {
    timeout: Duration,
}

impl GitCommitTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, arguments: &Value, context: &ExecutionContext) -> Result<ToolResult, ToolError> {
        let message = required_str(arguments, "message")
            .ok_or_else(|| ToolError::InvalidArguments("Commit message is required".into()))?;

        let output = process::run(
            self.name(),
            GIT,
            &["commit", "-m", message],
            context.workspace(),
            self.timeout,
        )
        .await?;

        if !output.success {
            // git reports "nothing to commit" on stdout.
            let detail = if output.stderr.trim().is_empty() {
                output.stdout
            } else {
                output.stderr
            };
            return Ok(ToolResult::failure(format!(
                "Error committing: {}",
                detail.trim_end()
            )));
        }

        Ok(ToolResult::success(format!("Committed successfully: {message}")))
    }
}

#[async_trait]
impl Tool for GitCommitTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::GitCommit
    }

    fn description(&self) -> &str {
        "Commit changes to git repository. Args: {\"message\": \"commit message\"}"
    }

    async fn execute(&self, arguments: Value, context: &ExecutionContext) -> ToolResult {
        self.run(&arguments, context)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}

pub struct GitPushTool {
    timeout: Duration,
}

impl GitPushTool {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, arguments: &Value, context: &ExecutionContext) -> Result<ToolResult, ToolError> {
        let remote = ref_arg("remote", str_or(arguments, "remote", "origin"))?;
        let branch = ref_arg("branch", str_or(arguments, "branch", "main"))?;

        let output = process::run(
            self.name(),
            GIT,
            &["push", remote, branch],
            context.workspace(),
            self.timeout,
        )
        .await?;

        if !output.success {
            return Ok(ToolResult::failure(format!(
                "Error pushing to {remote}/{branch}: {}",
                output.stderr.trim_end()
            )));
        }

        Ok(ToolResult::success(format!("Pushed successfully to {remote}/{branch}")))
    }
}

#[async_trait]
impl Tool for GitPushTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::GitPush
    }

    fn description(&self) -> &str {
        "Push committed changes to remote git repository. Args: {\"remote\": \"origin\", \"branch\": \"main\"}"
    }

    async fn execute(&self, arguments: Value, context: &ExecutionContext) -> ToolResult {
        self.run(&arguments, context)
            .await
            .unwrap_or_else(ToolResult::from)
    }
}
