//! Input source trait and configuration errors

/// Source of the raw action inputs
///
/// Implementations:
/// - `EnvInputSource`: GitHub Actions `INPUT_*` environment variables
/// - `MemoryInputSource`: In-memory for testing
pub trait InputSource: Send + Sync {
    /// Raw value of the input, untrimmed, if it is set at all
    fn raw(&self, name: &str) -> Option<String>;

    /// Trimmed value of the input; empty values count as unset
    fn get(&self, name: &str) -> Option<String> {
        self.raw(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Pre-flight configuration failures. All of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    MissingInput(String),

    #[error("invalid value for {name}: {message}")]
    InvalidInput { name: String, message: String },

    #[error("Tool \"{0}\" is not available")]
    UnknownOperation(String),
}

impl ConfigError {
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            name: name.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
