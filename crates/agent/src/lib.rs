//! The core agent loop — the heart of Anvil.
//!
//! The agent follows a **Thought → Action → Observation** cycle:
//!
//! 1. **Receive** a goal from the front end
//! 2. **Build context** (system prompt with the capability listing and the
//!    session summary, plus the full conversation so far)
//! 3. **Ask the backend** for exactly one JSON decision
//! 4. **If action**: dispatch the capability, update session state, feed the
//!    output back as the next observation and loop back to step 2
//! 5. **If final**: return the message to the user
//!
//! The loop continues until a final decision or the step budget is spent.

pub mod context;
pub mod decision;
pub mod event;
pub mod patterns;
pub mod prompt;

pub use context::{Scratchpad, SessionState, TraceEntry, TraceKind, analyze_workspace};
pub use decision::{ActionCall, Decision, DecisionStep, parse_decision};
pub use event::AgentEvent;
pub use patterns::{ReactAgent, ReactResult};
