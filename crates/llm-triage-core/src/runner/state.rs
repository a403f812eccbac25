//! Runner state machine types

use std::time::Duration;

use crate::types::{ChatMessage, MessageRole, ToolCall};

pub const DEFAULT_MAX_TURNS: usize = 10;
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Why a run stopped without a final message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HaltReason {
    /// `max_turns` model calls produced no final message
    TurnLimitReached { turns: usize },
    /// The model failed after at least one turn had been acted on
    ModelUnavailable(String),
}

impl std::fmt::Display for HaltReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaltReason::TurnLimitReached { turns } => {
                write!(f, "turn limit reached after {} model calls", turns)
            }
            HaltReason::ModelUnavailable(message) => write!(f, "model unavailable: {}", message),
        }
    }
}

/// Where the conversation is
#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
    /// Next step asks the model
    AwaitingModel,
    /// Next step runs these calls
    ExecutingCalls(Vec<ToolCall>),
    /// The model produced a final message
    Completed(String),
    /// Stopped early
    Halted(HaltReason),
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed(_) | RunState::Halted(_))
    }
}

/// Append-only message history
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub(crate) fn start(system_prompt: &str, user_input: &str) -> Self {
        Self {
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(user_input)],
        }
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    /// Roles in order, handy for assertions
    pub fn roles(&self) -> Vec<MessageRole> {
        self.messages.iter().map(|m| m.role).collect()
    }
}

/// Limits for one run
#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Upper bound on model calls
    pub max_turns: usize,
    /// Timeout for each model call and each operation call
    pub call_timeout: Duration,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

/// Terminal status of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    Completed(String),
    Halted(HaltReason),
}

/// What a finished run hands back
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub transcript: Transcript,
    /// Model calls made
    pub turns: usize,
    /// Operation calls that succeeded
    pub executed: usize,
    /// Operation calls that were rejected or failed
    pub failed: usize,
}

impl RunOutcome {
    /// The final assistant message, if the run completed
    pub fn final_message(&self) -> Option<&str> {
        match &self.status {
            RunStatus::Completed(text) => Some(text),
            RunStatus::Halted(_) => None,
        }
    }
}
