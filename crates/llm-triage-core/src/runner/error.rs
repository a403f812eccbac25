//! Runner error types

use thiserror::Error;

use crate::providers::ProviderError;
use crate::tools::ToolError;

/// Fatal runner errors
///
/// Failures of individual calls are not errors at this level; they are
/// reported to the model as tool results.
#[derive(Error, Debug)]
pub enum RunError {
    /// Nothing to act on: the very first model call failed
    #[error("model request failed on the first turn: {0}")]
    FirstTurnFailed(#[source] ProviderError),

    /// The runner could not be set up
    #[error(transparent)]
    Setup(#[from] ToolError),
}

pub type RunResult<T> = Result<T, RunError>;
