//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Mapping from logical secret names to environment variable names
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("openai", vec!["OPENAI_API_KEY"]);
    m.insert("github", vec!["GITHUB_TOKEN", "GH_TOKEN"]);
    m
});

/// Secret store that reads from environment variables
///
/// Read-only. Logical names are mapped first:
/// - `openai` → `OPENAI_API_KEY`
/// - `github` → `GITHUB_TOKEN`, then `GH_TOKEN`
///
/// Any other key is looked up as a raw variable name. Empty values count as
/// missing.
#[derive(Debug, Default)]
pub struct EnvSecretStore {
    _private: (),
}

impl EnvSecretStore {
    pub fn new() -> Self {
        Self { _private: () }
    }

    /// Get the environment variable names for a logical secret
    pub fn env_vars_for(key: &str) -> Option<&'static [&'static str]> {
        ENV_VAR_MAP.get(key.to_lowercase().as_str()).map(|v| v.as_slice())
    }

    fn read(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        if let Some(vars) = Self::env_vars_for(key) {
            return vars.iter().find_map(|var| Self::read(var));
        }
        Self::read(key)
    }

    fn store(&self, _key: &str, _value: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }

    fn delete(&self, _key: &str) -> SecretStoreResult<()> {
        Err(SecretStoreError::ReadOnly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_store_read_only() {
        let store = EnvSecretStore::new();
        assert_eq!(store.name(), "env");
        assert!(matches!(store.store("test", "value"), Err(SecretStoreError::ReadOnly)));
        assert!(matches!(store.delete("test"), Err(SecretStoreError::ReadOnly)));
    }

    #[test]
    fn test_env_store_get_direct() {
        env::set_var("LLM_TRIAGE_TEST_SECRET_1", "test_value");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("LLM_TRIAGE_TEST_SECRET_1"), Some("test_value".to_string()));

        env::remove_var("LLM_TRIAGE_TEST_SECRET_1");
    }

    #[test]
    fn test_env_store_empty_is_missing() {
        env::set_var("LLM_TRIAGE_TEST_SECRET_2", "   ");

        let store = EnvSecretStore::new();
        assert_eq!(store.get("LLM_TRIAGE_TEST_SECRET_2"), None);
        assert!(matches!(
            store.require("LLM_TRIAGE_TEST_SECRET_2"),
            Err(SecretStoreError::NotFound(_))
        ));

        env::remove_var("LLM_TRIAGE_TEST_SECRET_2");
    }

    #[test]
    fn test_logical_names_are_mapped() {
        assert_eq!(EnvSecretStore::env_vars_for("OpenAI"), Some(&["OPENAI_API_KEY"][..]));
        assert_eq!(
            EnvSecretStore::env_vars_for("github"),
            Some(&["GITHUB_TOKEN", "GH_TOKEN"][..])
        );
        assert_eq!(EnvSecretStore::env_vars_for("unknown"), None);
    }
}
