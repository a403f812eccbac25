//! Operation registry errors

use thiserror::Error;

/// Errors raised while building the registry or dispatching a call
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// An operation with this name is already registered
    #[error("Operation \"{0}\" is already registered")]
    DuplicateName(String),

    /// No operation with this name is available
    #[error("Tool \"{0}\" is not available")]
    UnknownOperation(String),

    /// The model's arguments did not parse or failed the schema
    #[error("Invalid arguments for {operation}: {message}")]
    InvalidArguments { operation: String, message: String },

    /// The parameter schema itself is not a valid JSON Schema
    #[error("Invalid schema for {operation}: {message}")]
    InvalidSchema { operation: String, message: String },

    /// An enum schema was requested over zero values
    #[error("Cannot build enum schema for {0}: no allowed values")]
    SchemaBuild(String),

    /// The executor ran and failed
    #[error("{operation} failed: {message}")]
    Execution { operation: String, message: String },

    /// The executor did not finish in time
    #[error("{operation} timed out after {seconds}s")]
    Timeout { operation: String, seconds: u64 },
}

impl ToolError {
    pub fn invalid_arguments(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn execution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Errors that happen before the run starts and abort it
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            ToolError::DuplicateName(_) | ToolError::InvalidSchema { .. } | ToolError::SchemaBuild(_)
        )
    }
}

pub type RegistryResult<T> = Result<T, ToolError>;
