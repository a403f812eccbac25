//! In-memory input source

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::InputSource;

/// In-memory input source for testing
#[derive(Debug, Default)]
pub struct MemoryInputSource {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryInputSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter
    pub fn with(self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&self, name: &str, value: &str) {
        self.values.write().insert(name.to_string(), value.to_string());
    }

    pub fn remove(&self, name: &str) {
        self.values.write().remove(name);
    }
}

impl InputSource for MemoryInputSource {
    fn raw(&self, name: &str) -> Option<String> {
        self.values.read().get(name).cloned()
    }
}
