//! External process runner with a deadline.

use anvil_core::error::ToolError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `program args..` in `cwd`, killing it if it outlives `timeout`.
///
/// Arguments are passed as a vector, never through a shell.
pub async fn run(
    tool_name: &str,
    program: &str,
    args: &[&str],
    cwd: &Path,
    timeout: Duration,
) -> Result<ProcessOutput, ToolError> {
    debug!(tool = tool_name, program, ?args, "Spawning process");

    let child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .kill_on_drop(true)
        .output();

    let output = match tokio::time::timeout(timeout, child).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(ToolError::ExecutionFailed {
                tool_name: tool_name.into(),
                reason: format!("failed to start '{program}': {e}"),
            });
        }
        Err(_) => {
            warn!(tool = tool_name, program, "Process timed out");
            return Err(ToolError::Timeout {
                tool_name: tool_name.into(),
                timeout_secs: timeout.as_secs(),
            });
        }
    };

    Ok(ProcessOutput {
        success: output.status.success(),
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_status() {
        let dir = tempfile::tempdir().unwrap();
        let out = run("test", "sh", &["-c", "echo hi; exit 3"], dir.path(), Duration::from_secs(10))
            .await
            .unwrap();
        assert!(!out.success);
        assert_eq!(out.code, Some(3));
        assert_eq!(out.stdout.trim(), "hi");
    }

    #[tokio::test]
    async fn runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "").unwrap();
        let out = run("test", "ls", &[], dir.path(), Duration::from_secs(10))
            .await
            .unwrap();
        assert!(out.stdout.contains("marker.txt"));
    }

    #[tokio::test]
    async fn deadline_kills_process() {
        let dir = tempfile::tempdir().unwrap();
        let err = run("test", "sleep", &["5"], dir.path(), Duration::from_millis(200))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }

    #[tokio::test]
    async fn missing_program_is_execution_failure() {
        let dir = tempfile::tempdir().unwrap();
        let err = run("test", "anvil-no-such-binary", &[], dir.path(), Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::ExecutionFailed { .. }));
    }
}
