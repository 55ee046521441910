//! Shared test helpers for loop tests.

use anvil_core::error::ProviderError;
use anvil_core::message::Message;
use anvil_core::provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk, Usage};
use anvil_core::tool::{CapabilityId, ExecutionContext, Tool, ToolResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A provider that replays scripted replies and records every request.
///
/// Once the script runs out, the last reply repeats. Streaming splits each
/// reply into small chunks to exercise reassembly.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
    last: Mutex<String>,
    requests: Mutex<Vec<ProviderRequest>>,
    chunk_size: usize,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(String::new()),
            requests: Mutex::new(Vec::new()),
            chunk_size: 7,
            delay: None,
        }
    }

    pub fn repeating(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }

    /// Wait this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_reply(&self, request: ProviderRequest) -> String {
        self.requests.lock().unwrap().push(request);
        let mut last = self.last.lock().unwrap();
        if let Some(reply) = self.replies.lock().unwrap().pop_front() {
            *last = reply;
        }
        last.clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let model = request.model.clone();
        Ok(ProviderResponse {
            message: Message::assistant(self.next_reply(request)),
            usage: None,
            model,
        })
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> Result<tokio::sync::mpsc::Receiver<Result<StreamChunk, ProviderError>>, ProviderError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply: Vec<char> = self.next_reply(request).chars().collect();
        let (tx, rx) = tokio::sync::mpsc::channel(reply.len() / self.chunk_size + 2);
        for piece in reply.chunks(self.chunk_size) {
            let _ = tx
                .send(Ok(StreamChunk {
                    content: Some(piece.iter().collect()),
                    done: false,
                    usage: None,
                }))
                .await;
        }
        let _ = tx
            .send(Ok(StreamChunk {
                content: None,
                done: true,
                usage: Some(Usage {
                    prompt_tokens: 10,
                    completion_tokens: 5,
                    total_tokens: 15,
                }),
            }))
            .await;
        Ok(rx)
    }
}

/// A provider whose every call fails.
pub struct FailingProvider(pub ProviderError);

#[async_trait::async_trait]
impl Provider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        Err(self.0.clone())
    }
}

/// A capability that counts its invocations and echoes its `message`.
pub struct CountingTool {
    pub id: CapabilityId,
    pub calls: Arc<AtomicUsize>,
}

impl CountingTool {
    pub fn new(id: CapabilityId) -> Self {
        Self {
            id,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Handle to the call counter, usable after the tool is boxed.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl Tool for CountingTool {
    fn id(&self) -> CapabilityId {
        self.id
    }

    fn description(&self) -> &str {
        "Counts calls"
    }

    async fn execute(&self, arguments: serde_json::Value, _context: &ExecutionContext) -> ToolResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let message = arguments["message"].as_str().unwrap_or("");
        ToolResult::success(format!("Suggestion: {message}"))
    }
}

/// Serialize an action step the way a well-behaved backend would.
pub fn action_reply(tool: &str, args: serde_json::Value) -> String {
    serde_json::json!({
        "thought": format!("Target: {tool}"),
        "action": {"tool": tool, "args": args, "reason": "test"}
    })
    .to_string()
}

/// Serialize a final step.
pub fn final_reply(message: &str) -> String {
    serde_json::json!({
        "thought": "Done",
        "final": {"message": message}
    })
    .to_string()
}
