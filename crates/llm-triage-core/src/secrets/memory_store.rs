//! In-memory secret store

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreResult};

/// In-memory secret store for tests
///
/// # Example
///
/// ```
/// use llm_triage_core::secrets::{SecretStore, MemorySecretStore};
///
/// let store = MemorySecretStore::new();
/// store.store("github", "ghs_test").unwrap();
/// assert_eq!(store.get("github"), Some("ghs_test".to_string()));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_secrets<K, V>(initial: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            secrets: RwLock::new(
                initial
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Option<String> {
        self.secrets.read().get(key).cloned()
    }

    fn store(&self, key: &str, value: &str) -> SecretStoreResult<()> {
        self.secrets.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> SecretStoreResult<()> {
        self.secrets.write().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_crud() {
        let store = MemorySecretStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("openai"), None);

        store.store("openai", "sk-1").unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.has("openai"));

        store.store("openai", "sk-2").unwrap();
        assert_eq!(store.get("openai"), Some("sk-2".to_string()));

        store.delete("openai").unwrap();
        assert!(!store.has("openai"));
    }

    #[test]
    fn test_with_secrets() {
        let store = MemorySecretStore::with_secrets([("github", "ghs_x")]);
        assert_eq!(store.require("github").unwrap(), "ghs_x");
        assert!(store.require("openai").is_err());
    }
}
