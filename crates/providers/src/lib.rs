//! Reasoning and search backends for Anvil.
//!
//! All reasoning backends implement the `anvil_core::Provider` trait; the
//! web-search backend implements `anvil_core::SearchBackend`. The router
//! selects the correct provider based on configuration.

pub mod exa;
pub mod openai_compat;
pub mod router;

pub use exa::ExaSearch;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config, build_search, default_model};
