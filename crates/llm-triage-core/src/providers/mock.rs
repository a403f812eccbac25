//! Mock provider for testing
//!
//! Provides deterministic, scripted replies without network dependencies.
//! Every request is recorded so tests can assert on what the model saw.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{ChatOptions, ChatResponse, Provider, ProviderModelConfig};
use crate::logging::Logger;
use crate::types::{ChatMessage, ToolCall, ToolChoice};

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Final message with no calls
    Text(String),
    /// Request the given calls
    Calls(Vec<ToolCall>),
    /// Fail the request
    Error(String),
}

impl MockReply {
    /// Shorthand for a single-call reply
    pub fn call(id: &str, name: &str, arguments: &str) -> Self {
        MockReply::Calls(vec![ToolCall::new(id, name, arguments)])
    }
}

/// A request as the mock saw it
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
    pub tool_choice: ToolChoice,
}

/// Mock LLM provider for testing
///
/// Replies are consumed in order. Once the script runs out the provider
/// answers with a fixed final message.
pub struct MockProvider {
    script: Mutex<VecDeque<MockReply>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<RecordedRequest>>,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    /// Create a mock that plays `replies` in order
    pub fn scripted(replies: Vec<MockReply>, logger: Arc<dyn Logger>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            delay: None,
            requests: Mutex::new(Vec::new()),
            logger,
        }
    }

    /// Create a mock that immediately answers with `text`
    pub fn fixed(text: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::scripted(vec![MockReply::Text(text.into())], logger)
    }

    /// Delay every reply
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_api_base(&self) -> &str {
        "http://localhost:0/mock"
    }

    async fn chat(
        &self,
        messages: &[ChatMessage],
        _model: &ProviderModelConfig,
        options: &ChatOptions,
    ) -> ProviderResult<ChatResponse> {
        self.requests.lock().push(RecordedRequest {
            messages: messages.to_vec(),
            tool_names: options.tools.iter().map(|t| t.name.clone()).collect(),
            tool_choice: options.tool_choice,
        });

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.script.lock().pop_front();
        self.logger
            .debug(&format!("MockProvider: replying with {:?}", reply));

        match reply {
            Some(MockReply::Text(text)) => Ok(ChatResponse::text(text)),
            Some(MockReply::Calls(calls)) => Ok(ChatResponse::calls(calls)),
            Some(MockReply::Error(message)) => {
                Err(ProviderError::Other(format!("Mock error: {}", message)))
            }
            None => Ok(ChatResponse::text("Script exhausted")),
        }
    }
}
