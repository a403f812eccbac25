//! Console logger that speaks GitHub Actions workflow commands
//!
//! Debug, warning, and error lines become `::debug::`, `::warning::`, and
//! `::error::` commands so the runner surfaces them as annotations. Info
//! lines are printed plainly with a prefix.

use super::traits::{LogLevel, Logger};

/// A logger that writes workflow commands to stdout
#[derive(Debug, Clone)]
pub struct ConsoleLogger {
    prefix: String,
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleLogger {
    /// Create a new console logger with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "[llm-triage]".to_string(),
        }
    }

    /// Create a console logger with a custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Ask the runner to redact `secret` from all later output
    pub fn mask(&self, secret: &str) {
        if !secret.is_empty() {
            println!("::add-mask::{}", escape_data(secret));
        }
    }

    /// Open a collapsible log group
    pub fn group(&self, title: &str) {
        println!("::group::{}", escape_data(title));
    }

    /// Close the innermost log group
    pub fn end_group(&self) {
        println!("::endgroup::");
    }

    /// The line written for `message` at `level`
    fn format_line(&self, level: LogLevel, message: &str) -> String {
        match level {
            LogLevel::Debug => format!("::debug::{}", escape_data(message)),
            LogLevel::Info => format!("{} {}", self.prefix, message),
            LogLevel::Warn => format!("::warning::{}", escape_data(message)),
            LogLevel::Error => format!("::error::{}", escape_data(message)),
        }
    }
}

/// Escape a workflow command payload.
///
/// `%`, CR and LF must be percent-encoded or the runner truncates the
/// command at the first line break.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

impl Logger for ConsoleLogger {
    fn debug(&self, message: &str) {
        println!("{}", self.format_line(LogLevel::Debug, message));
    }

    fn info(&self, message: &str) {
        println!("{}", self.format_line(LogLevel::Info, message));
    }

    fn warn(&self, message: &str) {
        println!("{}", self.format_line(LogLevel::Warn, message));
    }

    fn error(&self, message: &str) {
        println!("{}", self.format_line(LogLevel::Error, message));
    }
}
