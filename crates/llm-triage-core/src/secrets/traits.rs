//! Core traits and types for secret storage

use thiserror::Error;

/// Errors that can occur during secret store operations
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Store is read-only")]
    ReadOnly,

    #[error("Secret not found: {0}")]
    NotFound(String),
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Source of credentials the action may fall back to
///
/// Keys are either logical names (`openai`, `github`) that a store maps to
/// its own naming scheme, or raw names understood by the store directly.
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> Option<String>;

    /// Store a secret
    ///
    /// Returns `Err(SecretStoreError::ReadOnly)` if the store doesn't support writing.
    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()>;

    /// Delete a secret
    fn delete(&self, key: &str) -> SecretStoreResult<()>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Retrieve a secret or fail with `NotFound`
    fn require(&self, key: &str) -> SecretStoreResult<String> {
        self.get(key)
            .ok_or_else(|| SecretStoreError::NotFound(key.to_string()))
    }
}
