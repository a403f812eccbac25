//! LLM Triage Core
//!
//! Lets a language model triage a GitHub issue or pull request by calling a
//! small set of declared operations (close, lock, comment, label, rename,
//! review). The crate holds everything except the process entry point, so
//! the whole loop can be driven against mocks.
//!
//! ## Conversation loop
//!
//! ```rust,ignore
//! use llm_triage_core::{build_registry, ConversationRunner, LabelSource, RunSetup};
//!
//! let registry = build_registry(&ctx, api, logger.clone(), LabelSource::Repository).await?;
//! let runner = ConversationRunner::new(provider, Arc::new(registry), RunSetup::from_config(&config), logger)?;
//!
//! let outcome = runner.run().await?;
//! println!("{}", outcome.final_message().unwrap_or_default());
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod tools;
pub mod github;
pub mod runner;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, SamplingParams, ToolCall, ToolChoice,
    ToolDescriptor, ToolResult,
};

pub use secrets::{EnvSecretStore, MemorySecretStore, SecretStore};

pub use logging::{ConsoleLogger, LogLevel, Logger, MemoryLogger, NoOpLogger};

pub use config::{ConfigError, EnvInputSource, InputSource, MemoryInputSource, RunConfig};

pub use providers::{OpenAiProvider, Provider, ProviderError};

pub use tools::{OperationRegistry, ToolError};

pub use github::{build_registry, check_selection, IssueContext, LabelSource, RestClient};

pub use runner::{ConversationRunner, HaltReason, RunError, RunOutcome, RunSetup, RunStatus};
