//! Provider trait definition

use async_trait::async_trait;

use super::error::ProviderResult;
use crate::types::{ChatMessage, SamplingParams, ToolCall, ToolChoice, ToolDescriptor};

/// Model configuration for provider requests
#[derive(Debug, Clone)]
pub struct ProviderModelConfig {
    /// Model identifier as used by the provider's API
    pub model: String,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Custom API base URL
    pub api_base: Option<String>,
}

impl ProviderModelConfig {
    /// Create a new model config
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            api_base: None,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the API base URL
    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

/// Options for a chat request
#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    /// Sampling parameters; unset ones are left to the provider
    pub sampling: SamplingParams,
    /// Operations the model may call
    pub tools: Vec<ToolDescriptor>,
    /// Tool choice behavior
    pub tool_choice: ToolChoice,
}

impl ChatOptions {
    /// Create new options with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set sampling parameters
    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    /// Set tools
    pub fn with_tools(mut self, tools: Vec<ToolDescriptor>) -> Self {
        self.tools = tools;
        self
    }

    /// Set tool choice
    pub fn with_tool_choice(mut self, choice: ToolChoice) -> Self {
        self.tool_choice = choice;
        self
    }
}

/// One model reply: either a final message or a batch of call requests
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatResponse {
    /// Assistant text, if any
    pub content: Option<String>,
    /// Requested operation calls, in the order the model emitted them
    pub tool_calls: Vec<ToolCall>,
    /// Provider finish reason, when reported
    pub finish_reason: Option<String>,
}

impl ChatResponse {
    /// A final text reply
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            tool_calls: Vec::new(),
            finish_reason: Some("stop".to_string()),
        }
    }

    /// A reply requesting calls
    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            tool_calls,
            finish_reason: Some("tool_calls".to_string()),
        }
    }

    /// True when the model requested no calls
    pub fn is_final(&self) -> bool {
        self.tool_calls.is_empty()
    }
}

/// Provider trait for LLM implementations
///
/// A provider turns a message history plus callable operation descriptors
/// into either a final message or one or more call requests.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Get the provider name (e.g., "openai")
    fn name(&self) -> &str;

    /// Get the default API base URL
    fn default_api_base(&self) -> &str;

    /// Request one completion
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: &ProviderModelConfig,
        options: &ChatOptions,
    ) -> ProviderResult<ChatResponse>;

    /// Get the API base URL, using custom if provided
    fn get_api_base(&self, model: &ProviderModelConfig) -> String {
        model
            .api_base
            .clone()
            .unwrap_or_else(|| self.default_api_base().to_string())
    }
}
