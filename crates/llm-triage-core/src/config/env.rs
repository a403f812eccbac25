//! GitHub Actions input source

use super::traits::InputSource;

/// Reads action inputs from the environment.
///
/// The runner exposes input `foo bar` as `INPUT_FOO_BAR`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvInputSource;

impl EnvInputSource {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable name for an input
    pub fn var_name(name: &str) -> String {
        format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
    }
}

impl InputSource for EnvInputSource {
    fn raw(&self, name: &str) -> Option<String> {
        std::env::var(Self::var_name(name)).ok()
    }
}
