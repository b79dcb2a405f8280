//! In-memory provider for tests and offline runs.

use super::CompletionProvider;
use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse, TokenUsage};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A provider that replays queued responses and records every request.
///
/// When the queue is empty it returns the fallback text, if one was set,
/// otherwise an `ApiRequest` error.
#[derive(Debug, Default)]
pub struct MockProvider {
    responses: Mutex<VecDeque<Result<String, String>>>,
    fallback: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider that always returns `text`.
    pub fn with_response(text: &str) -> Self {
        Self {
            fallback: Some(text.to_string()),
            ..Self::default()
        }
    }

    /// Queue a text response for the next `complete` call.
    pub fn queue_response(&self, text: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(text.to_string()));
    }

    /// Queue an API failure for the next `complete` call.
    pub fn queue_error(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionProvider for MockProvider {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let input_tokens: usize = request
            .messages
            .iter()
            .map(|m| m.content.split_whitespace().count())
            .sum();
        self.requests.lock().unwrap().push(request);

        let next = self.responses.lock().unwrap().pop_front();
        let text = match next {
            Some(Ok(text)) => text,
            Some(Err(message)) => return Err(LlmError::ApiRequest { message }),
            None => self.fallback.clone().ok_or_else(|| LlmError::ApiRequest {
                message: "MockProvider has no queued responses".to_string(),
            })?,
        };

        Ok(CompletionResponse {
            usage: TokenUsage {
                input_tokens,
                output_tokens: text.split_whitespace().count(),
            },
            text,
            model: self.model_name().to_string(),
            finish_reason: Some("stop".to_string()),
        })
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}
