//! Run configuration
//!
//! Supports two input sources:
//! - `EnvInputSource`: GitHub Actions `INPUT_*` variables
//! - `MemoryInputSource`: In-memory for testing

mod env;
mod memory;
mod run;
mod traits;

pub use env::EnvInputSource;
pub use memory::MemoryInputSource;
pub use run::{
    inputs, parse_tool_list, RunConfig, DEFAULT_BASE_URL, DEFAULT_MAX_TURNS, DEFAULT_MODEL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOOLS,
};
pub use traits::{ConfigError, ConfigResult, InputSource};
