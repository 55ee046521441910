//! Scratchpad — the human-readable trace of one goal's execution.
//!
//! Records Thought / Action / Observation entries in order and counts loop
//! iterations against the step budget. The CLI renders it; nothing feeds it
//! back to the backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The agent's scratchpad within a single goal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scratchpad {
    /// ReAct reasoning trace entries.
    pub trace: Vec<TraceEntry>,

    /// Current iteration counter.
    pub iterations: usize,

    /// Maximum iterations allowed.
    pub max_iterations: usize,
}

/// A single entry in the reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceEntry {
    pub kind: TraceKind,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// The kind of reasoning trace entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TraceKind {
    Thought,
    Action,
    Observation,
}

impl TraceKind {
    pub fn label(self) -> &'static str {
        match self {
            TraceKind::Thought => "Thought",
            TraceKind::Action => "Action",
            TraceKind::Observation => "Observation",
        }
    }
}

impl Scratchpad {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            trace: Vec::new(),
            iterations: 0,
            max_iterations,
        }
    }

    pub fn add_thought(&mut self, thought: &str) {
        self.push_trace(TraceKind::Thought, thought);
    }

    pub fn add_action(&mut self, action: &str) {
        self.push_trace(TraceKind::Action, action);
    }

    pub fn add_observation(&mut self, observation: &str) {
        self.push_trace(TraceKind::Observation, observation);
    }

    fn push_trace(&mut self, kind: TraceKind, content: &str) {
        self.trace.push(TraceEntry {
            kind,
            content: content.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Count one iteration. Returns `false` once the budget is spent.
    pub fn tick(&mut self) -> bool {
        if self.iterations >= self.max_iterations {
            return false;
        }
        self.iterations += 1;
        true
    }

    pub fn is_exhausted(&self) -> bool {
        self.iterations >= self.max_iterations
    }

    /// Render the trace as `Label: content` blocks.
    pub fn render(&self) -> String {
        self.trace
            .iter()
            .map(|entry| format!("{}: {}", entry.kind.label(), entry.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
