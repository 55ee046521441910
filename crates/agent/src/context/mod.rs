//! Per-session context: what the agent knows about its workspace and its
//! own recent actions.
//!
//! - [`state`]: session state updated after every dispatch
//! - [`snapshot`]: one-time workspace digest taken at session start
//! - [`scratchpad`]: Thought / Action / Observation trace of one goal

pub mod scratchpad;
pub mod snapshot;
pub mod state;

pub use scratchpad::{Scratchpad, TraceEntry, TraceKind};
pub use snapshot::analyze_workspace;
pub use state::SessionState;
