//! Conversation runner
//!
//! Owns the transcript and drives the model until it stops asking for
//! operations.

mod conversation;
mod error;
mod state;

pub use conversation::{ConversationRunner, RunSetup};
pub use error::{RunError, RunResult};
pub use state::{
    HaltReason, RunOutcome, RunState, RunStatus, RunnerOptions, Transcript, DEFAULT_CALL_TIMEOUT,
    DEFAULT_MAX_TURNS,
};
