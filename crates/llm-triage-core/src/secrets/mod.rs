//! Credential fallbacks for the action inputs
//!
//! The API key and repository token normally arrive as action inputs. When
//! an input is left empty the configuration layer asks a `SecretStore`
//! instead (by default the process environment).

mod env_store;
mod memory_store;
mod traits;

pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
