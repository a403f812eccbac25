//! Silent logger

use super::traits::Logger;

/// Discards every line; the default for library tests that do not assert
/// on output
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLogger;

impl NoOpLogger {
    pub fn new() -> Self {
        Self
    }
}

impl Logger for NoOpLogger {
    fn debug(&self, _: &str) {}

    fn info(&self, _: &str) {}

    fn warn(&self, _: &str) {}

    fn error(&self, _: &str) {}
}
