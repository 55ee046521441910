//! Agent patterns — structured reasoning strategies.
//!
//! Only one is implemented: **ReAct**, a Thought → Action → Observation loop
//! with one JSON decision per backend turn.

pub mod react;

pub use react::{ReactAgent, ReactResult};

#[cfg(test)]
pub(crate) mod test_helpers;
