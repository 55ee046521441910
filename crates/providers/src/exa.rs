//! Exa web-search backend.
//!
//! Exa exposes an OpenAI-compatible chat endpoint: the query goes in as a
//! single user message and the answer text comes back as the completion.

use async_trait::async_trait;
use anvil_core::error::ProviderError;
use anvil_core::message::Message;
use anvil_core::provider::{Provider, ProviderRequest};
use anvil_core::search::SearchBackend;
use tracing::debug;

use crate::openai_compat::OpenAiCompatProvider;

pub const DEFAULT_EXA_URL: &str = "https://api.exa.ai";
pub const DEFAULT_EXA_MODEL: &str = "exa";

pub struct ExaSearch {
    inner: OpenAiCompatProvider,
    model: String,
}

impl ExaSearch {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            inner: OpenAiCompatProvider::new("exa", base_url, api_key),
            model: model.into(),
        }
    }

    /// Build from the `[search]` config section. Returns `None` without an API key.
    pub fn from_config(config: &anvil_config::SearchConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self::new(&config.api_url, api_key, &config.model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SearchBackend for ExaSearch {
    fn name(&self) -> &str {
        "exa"
    }

    async fn search(&self, query: &str) -> Result<String, ProviderError> {
        debug!(model = %self.model, "Running web search");
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(query)],
            temperature: 0.0,
            max_tokens: None,
            stream: false,
            stop: Vec::new(),
        };
        let response = self.inner.complete(request).await?;
        Ok(response.message.content)
    }
}
