//! Script runner — executes a workspace script in a fresh interpreter process.
//!
//! Screening is a textual denylist only (see `anvil_security::screen_script`).
//! The real controls are the `allow_scripts` switch and the deadline.

use async_trait::async_trait;
use anvil_core::error::ToolError;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use std::time::Duration;
use tracing::info;

use crate::args::{required_str, sandboxed};
use crate::process;

pub struct RunScriptTool {
    enabled: bool,
    interpreter: String,
    timeout: Duration,
}

impl RunScriptTool {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            enabled: true,
            interpreter: interpreter.into(),
            timeout,
        }
    }

    pub fn from_config(config: &anvil_config::ToolsConfig) -> Self {
        Self::new(
            &config.script_interpreter,
            Duration::from_secs(config.script_timeout_secs),
        )
        .enabled(config.allow_scripts)
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    async fn run(
        &self,
        arguments: &serde_json::Value,
        context: &ExecutionContext,
    ) -> Result<ToolResult, ToolError> {
        if !self.enabled {
            return Err(ToolError::PermissionDenied {
                tool_name: self.name().into(),
                reason: "script execution is disabled by configuration".into(),
            });
        }

        let path = required_str(arguments, "path")
            .ok_or_else(|| ToolError::InvalidArguments("No Script path provided.".into()))?;
        let full_path = sandboxed(context, path)?;

        let source = match tokio::fs::read_to_string(&full_path).await {
            Ok(source) => source,
            Err(e) => return Ok(ToolResult::failure(format!("Error executing script: {e}"))),
        };

        if anvil_security::screen_script(&source).is_some() {
            return Ok(ToolResult::failure("Script contains unsafe operations."));
        }

        info!(script = %full_path.display(), interpreter = %self.interpreter, "Running script");
        let script_arg = full_path.to_string_lossy();
        let output = process::run(
            self.name(),
            &self.interpreter,
            &[&*script_arg],
            context.workspace(),
            self.timeout,
        )
        .await?;

        if !output.success {
            let code = output.code.map_or_else(|| "signal".to_string(), |c| c.to_string());
            return Ok(ToolResult::failure(format!(
                "Error executing script: exit code {code}\n{}",
                output.stderr.trim_end()
            )));
        }

        let mut message = format!("Script executed successfully: {}", full_path.display());
        let stdout = output.stdout.trim_end();
        if !stdout.is_empty() {
            message.push('\n');
            message.push_str(stdout);
        }
        Ok(ToolResult::success(message))
    }
}

#[async_trait]
impl Tool for RunScriptTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::RunScript
    }

    fn description(&self) -> &str {
        "Executes a script file from the workspace and returns its output. Args: {\"path\": \"script.py\"}"
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

    fn sh_tool() -> RunScriptTool {
        RunScriptTool::new("sh", Duration::from_secs(10))
    }

    fn workspace_with(name: &str, source: &str) -> (tempfile::TempDir, ExecutionContext) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(name), source).unwrap();
        let ctx = ExecutionContext::new(dir.path());
        (dir, ctx)
    }

    #[tokio::test]
    async fn denylisted_script_is_not_executed() {
        let (dir, ctx) = workspace_with(
            "evil.sh",
            "touch ran.txt\n# os.remove('x')\n",
        );
        let result = sh_tool().execute(json!({"path": "evil.sh"}), &ctx).await;
        assert!(!result.ok);
        assert_eq!(result.output, "Script contains unsafe operations.");
        assert!(!dir.path().join("ran.txt").exists());
    }

    #[tokio::test]
    async fn missing_path_argument() {
        let (_dir, ctx) = workspace_with("x.sh", "");
        let result = sh_tool().execute(json!({}), &ctx).await;
        assert_eq!(result.output, "No Script path provided.");
    }

    #[tokio::test]
    async fn disabled_runner_refuses() {
        let (_dir, ctx) = workspace_with("ok.sh", "echo hi\n");
        let result = sh_tool()
            .enabled(false)
            .execute(json!({"path": "ok.sh"}), &ctx)
            .await;
        assert!(!result.ok);
        assert!(result.output.contains("disabled"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runs_in_workspace_and_captures_stdout() {
        let (dir, ctx) = workspace_with("ok.sh", "echo hello\ntouch made.txt\n");
        let result = sh_tool().execute(json!({"path": "ok.sh"}), &ctx).await;
        assert!(result.ok, "{}", result.output);
        assert!(result.output.starts_with("Script executed successfully: "));
        assert!(result.output.ends_with("\nhello"));
        assert!(dir.path().join("made.txt").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn nonzero_exit_is_failure_with_stderr() {
        let (_dir, ctx) = workspace_with("bad.sh", "echo boom >&2\nexit 2\n");
        let result = sh_tool().execute(json!({"path": "bad.sh"}), &ctx).await;
        assert!(!result.ok);
        assert_eq!(result.output, "Error executing script: exit code 2\nboom");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn runaway_script_times_out() {
        let (_dir, ctx) = workspace_with("slow.sh", "sleep 5\n");
        let tool = RunScriptTool::new("sh", Duration::from_secs(1));
        let result = tool.execute(json!({"path": "slow.sh"}), &ctx).await;
        assert!(!result.ok);
        assert_eq!(result.output, "Tool timed out: run_script after 1s");
    }
}
