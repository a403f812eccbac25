//! Operation registry
//!
//! Declares the operations the model may call, hands their descriptors to
//! the provider, and turns the model's untyped call requests into validated,
//! typed executor invocations.
//!
//! ```text
//! ToolCall { name, arguments: "<raw json>" }
//!     │
//!     ▼  parse     ──▶ InvalidArguments
//!     ▼  validate  ──▶ InvalidArguments
//!     ▼  deserialize into A
//!     ▼  executor(A)   (exactly once)
//! confirmation text
//! ```

mod error;
mod registry;
mod schema;

pub use error::{RegistryResult, ToolError};
pub use registry::OperationRegistry;
pub use schema::{build_enum_schema, EnumSchema, ParamSchema};
