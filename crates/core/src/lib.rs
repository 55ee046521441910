//! # Anvil Core
//!
//! Domain types, traits, and error definitions for the Anvil coding agent.
//! This crate has **zero framework dependencies** — it defines the domain model
//! that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every seam the agent loop talks through is a trait here: capabilities
//! ([`Tool`]), the reasoning backend ([`Provider`]) and the web-search backend
//! ([`SearchBackend`]). Implementations live in their respective crates, which
//! keeps the loop testable against scripted stand-ins.

pub mod error;
pub mod message;
pub mod provider;
pub mod search;
pub mod text;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Conversation, ConversationId, Message, Role};
pub use provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk};
pub use search::SearchBackend;
pub use tool::{CapabilityId, ExecutionContext, Tool, ToolRegistry, ToolResult};
