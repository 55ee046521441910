//! Chat tool — the reasoning-only capability. Echoes the message back as a suggestion.

use async_trait::async_trait;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};

use crate::args::required_str;

pub struct ChatTool;

#[async_trait]
impl Tool for ChatTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::Chat
    }

    fn description(&self) -> &str {
        "General chat tool for suggestions and advice. Args: {\"message\": \"...\"}"
    }

    async fn execute(&self, arguments: serde_json::Value, _context: &ExecutionContext) -> ToolResult {
        match required_str(&arguments, "message") {
            Some(message) => ToolResult::success(format!("Suggestion: {message}")),
            None => ToolResult::failure("No message provided."),
        }
    }
}
