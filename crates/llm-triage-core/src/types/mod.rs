//! Core types for LLM interactions
//!
//! This module contains the message, call, and descriptor types shared by
//! the providers, the operation registry, and the conversation runner.

mod message;
mod model;
mod tool;

pub use message::{ChatMessage, ContentPart, MessageContent, MessageRole};
pub use model::SamplingParams;
pub use tool::{ToolCall, ToolChoice, ToolDescriptor, ToolResult};
