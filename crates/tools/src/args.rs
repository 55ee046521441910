//! Argument extraction and sandbox resolution shared by the capabilities.
//!
//! Backends send loosely-typed JSON. A missing key, `null`, and an empty
//! string are all treated as "not provided" for required string arguments.

use anvil_core::error::ToolError;
use anvil_core::tool::ExecutionContext;
use serde_json::Value;
use std::path::PathBuf;

/// A non-empty string argument.
pub fn required_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// A string argument that may be empty but must be present.
pub fn present_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

/// A string argument with a fallback when absent or null.
pub fn str_or<'a>(args: &'a Value, key: &str, default: &'a str) -> &'a str {
    args.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Resolve `path` under the workspace root, refusing anything that escapes.
pub fn sandboxed(context: &ExecutionContext, path: &str) -> Result<PathBuf, ToolError> {
    anvil_security::resolve_contained(context.workspace(), path)
        .map_err(|e| ToolError::SandboxViolation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_null_count_as_missing() {
        let args = json!({"path": "", "other": null, "name": "a.txt"});
        assert_eq!(required_str(&args, "path"), None);
        assert_eq!(required_str(&args, "other"), None);
        assert_eq!(required_str(&args, "absent"), None);
        assert_eq!(required_str(&args, "name"), Some("a.txt"));
    }

    #[test]
    fn empty_content_is_present() {
        let args = json!({"content": ""});
        assert_eq!(present_str(&args, "content"), Some(""));
        assert_eq!(present_str(&json!({}), "content"), None);
        assert_eq!(present_str(&json!({"content": 3}), "content"), None);
    }

    #[test]
    fn sandbox_violation_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = ExecutionContext::new(dir.path());
        let err = sandboxed(&ctx, "..\\secret").unwrap_err();
        assert!(matches!(err, ToolError::SandboxViolation(_)));
        assert!(err.to_string().starts_with("Sandbox violation:"));
    }
}
