//! ReAct pattern — Thought → Action → Observation loop.
//!
//! Each iteration asks the backend for exactly one [`DecisionStep`]:
//!
//! - **Action**: dispatch the named capability, update session state, and
//!   feed its output back as the next observation
//! - **Final**: stop and return the message, the only successful exit
//! - **Sentinel** (unusable reply): the step is wasted and the previous
//!   observation is sent again
//!
//! When the step budget runs out, the last raw backend reply is returned.

use anvil_config::AppConfig;
use anvil_core::error::{ProviderError, ToolError};
use anvil_core::message::{Conversation, Message};
use anvil_core::provider::{Provider, ProviderRequest};
use anvil_core::tool::{ToolRegistry, ToolResult};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::context::{Scratchpad, SessionState, TraceEntry};
use crate::decision::{Decision, parse_decision};
use crate::event::AgentEvent;
use crate::prompt::{system_prompt, turn_input};

/// Configuration for the ReAct agent.
pub struct ReactAgent {
    /// Reasoning backend.
    provider: Arc<dyn Provider>,
    /// Model name.
    model: String,
    /// Temperature.
    temperature: f32,
    /// Max tokens per backend reply.
    max_tokens: Option<u32>,
    /// Capability registry (owns the sandbox context).
    tools: Arc<ToolRegistry>,
    /// Maximum decisions per goal.
    max_steps: u32,
    /// Deadline for one backend call, stream included.
    turn_timeout: Duration,
    /// Optional live event sink.
    events: Option<mpsc::UnboundedSender<AgentEvent>>,
}

/// The result of a ReAct execution.
#[derive(Debug)]
pub struct ReactResult {
    /// The final message, or the last raw reply when the budget ran out.
    pub answer: String,
    /// Whether the loop ended on a final decision.
    pub finished: bool,
    /// Decisions requested from the backend.
    pub steps: usize,
    /// Capabilities actually dispatched.
    pub tool_calls_made: usize,
    /// Complete reasoning trace.
    pub trace: Vec<TraceEntry>,
}

impl ReactAgent {
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            tools,
            max_steps: 25,
            turn_timeout: Duration::from_secs(120),
            events: None,
        }
    }

    /// Build an agent with the model, sampling and budget settings from `config`.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &AppConfig,
    ) -> Self {
        Self::new(provider, config.default_model.clone(), tools)
            .with_temperature(config.default_temperature)
            .with_max_tokens(config.default_max_tokens)
            .with_max_steps(config.agent.max_steps)
            .with_turn_timeout(Duration::from_secs(config.agent.turn_timeout_secs))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn with_max_steps(mut self, max: u32) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    /// Emit [`AgentEvent`]s to `sink` as the loop runs.
    pub fn with_events(mut self, sink: mpsc::UnboundedSender<AgentEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    fn emit(&self, event: AgentEvent) {
        if let Some(sink) = &self.events {
            // A closed sink only means nobody is watching.
            let _ = sink.send(event);
        }
    }

    /// Ask the backend for one decision and return its raw text.
    ///
    /// The streamed reply is concatenated in arrival order and only returned
    /// once complete.
    async fn decide(
        &self,
        state: &SessionState,
        conversation: &Conversation,
    ) -> Result<String, ProviderError> {
        let mut messages = Vec::with_capacity(conversation.messages.len() + 1);
        messages.push(Message::system(system_prompt(&self.tools, state)));
        messages.extend(conversation.messages.iter().cloned());

        let request = ProviderRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: true,
            stop: vec![],
        };

        let turn = async {
            let mut rx = self.provider.stream(request).await?;
            let mut reply = String::new();
            while let Some(chunk) = rx.recv().await {
                let chunk = chunk?;
                if let Some(content) = chunk.content {
                    reply.push_str(&content);
                }
                if chunk.done {
                    break;
                }
            }
            Ok(reply)
        };

        match tokio::time::timeout(self.turn_timeout, turn).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = self.turn_timeout.as_secs(), "Backend turn timed out");
                Err(ProviderError::Timeout(format!(
                    "no reply from {} within {}s",
                    self.provider.name(),
                    self.turn_timeout.as_secs()
                )))
            }
        }
    }

    /// Dispatch one action. Unknown tools are never executed; they yield an
    /// observation instead.
    async fn act(&self, tool: &str, args: &serde_json::Value, state: &mut SessionState) -> ToolResult {
        match self.tools.dispatch(tool, args.clone()).await {
            Ok(result) => {
                state.update_from_result(tool, args, &result);
                result
            }
            Err(e @ ToolError::NotFound(_)) => {
                warn!(tool, "Backend requested an unknown tool");
                ToolResult::from(e)
            }
            Err(e) => ToolResult::from(e),
        }
    }

    /// Execute the ReAct loop for `goal`.
    ///
    /// `state` and `conversation` belong to the session and persist across
    /// goals. Only backend failures are returned as errors.
    pub async fn run(
        &self,
        goal: &str,
        state: &mut SessionState,
        conversation: &mut Conversation,
    ) -> Result<ReactResult, anvil_core::Error> {
        let mut pad = Scratchpad::new(self.max_steps as usize);
        let mut observation: Option<String> = None;
        let mut last_reply = String::new();
        let mut tool_calls_made = 0usize;

        info!(model = %self.model, max_steps = self.max_steps, "ReAct loop starting");

        while pad.tick() {
            let step = pad.iterations - 1;
            debug!(step, "ReAct iteration");

            conversation.push(Message::user(turn_input(step, goal, observation.as_deref())));
            let reply = self.decide(state, conversation).await?;
            conversation.push(Message::assistant(reply.clone()));

            let decision = parse_decision(&reply);
            last_reply = reply;
            pad.add_thought(&decision.thought);

            match decision.decision {
                Some(Decision::Final { message }) => {
                    self.emit(AgentEvent::Thought { step, content: decision.thought });
                    self.emit(AgentEvent::Final { message: message.clone() });
                    info!(steps = pad.iterations, tool_calls = tool_calls_made, "ReAct loop completed");
                    return Ok(ReactResult {
                        answer: message,
                        finished: true,
                        steps: pad.iterations,
                        tool_calls_made,
                        trace: pad.trace,
                    });
                }
                Some(Decision::Action(call)) => {
                    self.emit(AgentEvent::Thought { step, content: decision.thought });
                    pad.add_action(&format!("{} {}", call.tool, call.args));
                    self.emit(AgentEvent::Action {
                        step,
                        tool: call.tool.clone(),
                        args: call.args.clone(),
                        reason: call.reason.clone(),
                    });

                    let result = self.act(&call.tool, &call.args, state).await;
                    if self.tools.get(&call.tool).is_some() {
                        tool_calls_made += 1;
                    }
                    debug!(tool = %call.tool, ok = result.ok, "Observation recorded");

                    pad.add_observation(&result.output);
                    self.emit(AgentEvent::Observation {
                        step,
                        ok: result.ok,
                        output: result.output.clone(),
                    });
                    observation = Some(result.output);
                }
                None => {
                    warn!(step, "Unusable decision, previous observation carried forward");
                    self.emit(AgentEvent::Degraded { step, detail: decision.thought });
                }
            }
        }

        warn!(max_steps = self.max_steps, "ReAct: max steps reached");
        self.emit(AgentEvent::StepLimit { steps: pad.iterations });

        Ok(ReactResult {
            answer: last_reply,
            finished: false,
            steps: pad.iterations,
            tool_calls_made,
            trace: pad.trace,
        })
    }
}
