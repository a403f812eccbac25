//! Logging abstractions for runtime-agnostic logging

mod console;
mod memory;
mod noop;
mod traits;

pub use console::{escape_data, ConsoleLogger};
pub use memory::MemoryLogger;
pub use noop::NoOpLogger;
pub use traits::{LogLevel, Logger, SharedLogger};
