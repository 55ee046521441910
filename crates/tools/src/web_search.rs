//! Web search tool — delegates to a configured `SearchBackend`.

use async_trait::async_trait;
use anvil_core::search::SearchBackend;
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use std::sync::Arc;
use tracing::warn;

use crate::args::required_str;

pub struct WebSearchTool {
    backend: Option<Arc<dyn SearchBackend>>,
}

impl WebSearchTool {
    pub fn new(backend: Option<Arc<dyn SearchBackend>>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> CapabilityId {
        CapabilityId::SearchWeb
    }

    fn description(&self) -> &str {
        "Searches the web for a query and returns summarized results. Args: {\"query\": \"...\"}"
    }

    async fn execute(&self, arguments: serde_json::Value, _context: &ExecutionContext) -> ToolResult {
        let Some(query) = required_str(&arguments, "query") else {
            return ToolResult::failure("No query provided.");
        };
        let Some(backend) = &self.backend else {
            return ToolResult::failure("Web search is not configured (set EXA_API_KEY).");
        };

        match backend.search(query).await {
            Ok(text) => ToolResult::success(format!("Search Results: {text}")),
            Err(e) => {
                warn!(backend = backend.name(), error = %e, "Web search failed");
                ToolResult::failure(format!("Error searching the web: {e}"))
            }
        }
    }
}
