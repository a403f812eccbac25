//! LLM Provider implementations
//!
//! The conversation runner only sees the `Provider` trait: "given a message
//! history and a set of callable operation descriptors, return either a
//! final message or one or more requested calls".
//!
//! `OpenAiProvider` speaks the OpenAI chat completions wire format and is
//! used for every real endpoint. The `MockProvider` is kept for testing.

mod error;
mod mock;
mod openai;
mod traits;

// Core traits and types
pub use error::{ProviderError, ProviderResult};
pub use traits::{ChatOptions, ChatResponse, Provider, ProviderModelConfig};

pub use openai::{build_request_body, parse_response, OpenAiProvider};

// Mock provider for testing
pub use mock::{MockProvider, MockReply, RecordedRequest};

use crate::logging::Logger;
use std::sync::Arc;
use std::time::Duration;

/// Create a provider for the given provider ID
///
/// `mock` yields an empty scripted mock; anything else is treated as an
/// OpenAI-compatible endpoint.
pub fn create_provider(
    provider_id: &str,
    timeout: Duration,
    logger: Arc<dyn Logger>,
) -> ProviderResult<Box<dyn Provider>> {
    match provider_id.to_lowercase().as_str() {
        "mock" => Ok(Box::new(MockProvider::scripted(Vec::new(), logger))),
        _ => Ok(Box::new(OpenAiProvider::new(timeout, logger)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_create_provider() {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger::new());
        let mock = create_provider("Mock", Duration::from_secs(1), logger.clone()).unwrap();
        assert_eq!(mock.name(), "mock");

        let openai = create_provider("openai", Duration::from_secs(1), logger).unwrap();
        assert_eq!(openai.name(), "openai");
        assert_eq!(openai.default_api_base(), "https://api.openai.com/v1");
    }
}
