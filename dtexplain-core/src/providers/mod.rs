//! LLM provider implementations.
//!
//! The chat-completion service is consumed as a black box: one request in,
//! one text completion out. There is no retry, backoff, or rate-limit
//! handling; errors surface to the caller as [`LlmError`].
//!
//! Use `create_provider()` to instantiate a provider from config.

pub mod mock;
pub mod openai_compat;

use crate::config::{LlmConfig, SUPPORTED_PROVIDERS};
use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse};
use async_trait::async_trait;
use std::sync::Arc;

pub use mock::MockProvider;
pub use openai_compat::OpenAiCompatibleProvider;

/// A text-completion service.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Perform a full completion and return the response.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;

    /// Return the model name.
    fn model_name(&self) -> &str;
}

/// Create a provider based on the configuration.
///
/// Every supported provider routes to `OpenAiCompatibleProvider`; non-OpenAI
/// endpoints (Azure, Ollama, vLLM) are reached through `base_url`. Unknown
/// provider names are rejected.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn CompletionProvider>, LlmError> {
    if !config.is_supported_provider() {
        return Err(LlmError::UnsupportedProvider {
            provider: config.provider.clone(),
            supported: SUPPORTED_PROVIDERS.join(", "),
        });
    }
    for warning in config.validate() {
        tracing::warn!(provider = %config.provider, "{}", warning);
    }
    Ok(Arc::new(OpenAiCompatibleProvider::new(config)?))
}
