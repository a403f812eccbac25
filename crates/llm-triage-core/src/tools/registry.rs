//! Operation registry
//!
//! The OperationRegistry is the central component for:
//! - Declaring the operations the model may call
//! - Producing descriptors for the model, in the order requested
//! - Validating the model's raw arguments against each operation's schema
//! - Invoking the bound executor exactly once per accepted call

use futures::future::{self, BoxFuture, FutureExt};
use jsonschema::JSONSchema;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use super::error::{RegistryResult, ToolError};
use crate::logging::Logger;
use crate::types::{ToolCall, ToolDescriptor};

type Executor = Arc<dyn Fn(Value) -> BoxFuture<'static, RegistryResult<String>> + Send + Sync>;

struct Operation {
    descriptor: ToolDescriptor,
    validator: JSONSchema,
    executor: Executor,
}

/// Registry of callable operations
pub struct OperationRegistry {
    /// Registration order is the catalog order
    operations: RwLock<Vec<Arc<Operation>>>,
    logger: Arc<dyn Logger>,
}

impl OperationRegistry {
    /// Create an empty registry
    pub fn new(logger: Arc<dyn Logger>) -> Self {
        Self {
            operations: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Register one operation.
    ///
    /// The executor receives arguments that already passed `schema` and were
    /// deserialized into `A`. It returns the confirmation text reported back
    /// to the model.
    pub fn register<A, F, Fut>(
        &self,
        name: &str,
        description: &str,
        schema: Value,
        executor: F,
    ) -> RegistryResult<()>
    where
        A: DeserializeOwned + Send + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RegistryResult<String>> + Send + 'static,
    {
        if self.contains(name) {
            return Err(ToolError::DuplicateName(name.to_string()));
        }

        let validator = JSONSchema::compile(&schema).map_err(|e| ToolError::InvalidSchema {
            operation: name.to_string(),
            message: e.to_string(),
        })?;

        let op_name = name.to_string();
        let executor: Executor = Arc::new(move |value: Value| {
            match serde_json::from_value::<A>(value) {
                Ok(args) => executor(args).boxed(),
                Err(e) => {
                    future::ready(Err(ToolError::invalid_arguments(&op_name, e.to_string()))).boxed()
                }
            }
        });

        let mut operations = self.operations.write();
        // Re-check under the write lock
        if operations.iter().any(|op| op.descriptor.name == name) {
            return Err(ToolError::DuplicateName(name.to_string()));
        }
        operations.push(Arc::new(Operation {
            descriptor: ToolDescriptor::new(name, description, schema),
            validator,
            executor,
        }));

        self.logger
            .debug(&format!("[OperationRegistry] Registered {}", name));
        Ok(())
    }

    /// Descriptors for `names`, in the order given
    pub fn descriptors_for<S: AsRef<str>>(&self, names: &[S]) -> RegistryResult<Vec<ToolDescriptor>> {
        names
            .iter()
            .map(|n| {
                self.lookup(n.as_ref())
                    .map(|op| op.descriptor.clone())
                    .ok_or_else(|| ToolError::UnknownOperation(n.as_ref().to_string()))
            })
            .collect()
    }

    /// Validate a call and run its executor.
    ///
    /// Any parse or schema failure is returned as `InvalidArguments` and the
    /// executor is not invoked.
    pub async fn dispatch(&self, call: &ToolCall) -> RegistryResult<String> {
        let op = self
            .lookup(&call.name)
            .ok_or_else(|| ToolError::UnknownOperation(call.name.clone()))?;

        self.logger.info(&format!(
            "[OperationRegistry] {} {}",
            call.name, call.arguments
        ));

        let result = match parse_arguments(call).and_then(|args| validate(&op, &args).map(|_| args)) {
            Ok(args) => (op.executor)(args).await,
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            self.logger
                .warn(&format!("[OperationRegistry] {} failed: {}", call.name, e));
        }
        result
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<String> {
        self.operations
            .read()
            .iter()
            .map(|op| op.descriptor.name.clone())
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.operations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.read().is_empty()
    }

    fn lookup(&self, name: &str) -> Option<Arc<Operation>> {
        self.operations
            .read()
            .iter()
            .find(|op| op.descriptor.name == name)
            .cloned()
    }
}

fn parse_arguments(call: &ToolCall) -> RegistryResult<Value> {
    call.parse_arguments()
        .map_err(|e| ToolError::invalid_arguments(&call.name, format!("malformed JSON: {}", e)))
}

fn validate(op: &Operation, args: &Value) -> RegistryResult<()> {
    if let Err(errors) = op.validator.validate(args) {
        let messages: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(ToolError::invalid_arguments(
            &op.descriptor.name,
            messages.join("; "),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::tools::schema::{EnumSchema, ParamSchema};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Deserialize)]
    struct CloseArgs {
        reason: String,
    }

    fn close_schema() -> Value {
        ParamSchema::new()
            .enumeration(
                "reason",
                None,
                EnumSchema::new("reason", ["completed", "not_planned"]).unwrap(),
            )
            .to_json()
    }

    fn counting_registry() -> (OperationRegistry, Arc<AtomicUsize>) {
        let registry = OperationRegistry::new(Arc::new(MemoryLogger::new()));
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        registry
            .register("closeIssue", "Close Issue", close_schema(), move |args: CloseArgs| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("#1 closed as {}", args.reason))
                }
            })
            .unwrap();
        registry
            .register(
                "commentIssue",
                "Comment Issue",
                ParamSchema::new().string("content", None).to_json(),
                |args: Value| async move { Ok(format!("#1 commented: {}", args["content"])) },
            )
            .unwrap();
        (registry, count)
    }

    #[tokio::test]
    async fn test_dispatch_valid_call() {
        let (registry, count) = counting_registry();
        let out = registry
            .dispatch(&ToolCall::new("c1", "closeIssue", r#"{"reason":"completed"}"#))
            .await
            .unwrap();

        assert_eq!(out, "#1 closed as completed");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rejected_arguments_never_execute() {
        let (registry, count) = counting_registry();
        let bad = [
            r#"{"reason":"fixed"}"#,
            r#"{}"#,
            r#"{"reason":"completed","extra":1}"#,
            r#"{"reason":5}"#,
            r#"{"reason":"#,
            r#"["completed"]"#,
            "",
        ];

        for args in bad {
            let err = registry
                .dispatch(&ToolCall::new("c", "closeIssue", args))
                .await
                .unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments { ref operation, .. } if operation == "closeIssue"),
                "{args} gave {err:?}"
            );
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_operation_at_dispatch() {
        let (registry, _) = counting_registry();
        let err = registry
            .dispatch(&ToolCall::new("c", "deleteRepo", "{}"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), r#"Tool "deleteRepo" is not available"#);
    }

    #[test]
    fn test_duplicate_name() {
        let (registry, _) = counting_registry();
        let err = registry
            .register("closeIssue", "again", close_schema(), |_: Value| async {
                Ok(String::new())
            })
            .unwrap_err();
        assert_eq!(err, ToolError::DuplicateName("closeIssue".into()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_invalid_schema() {
        let registry = OperationRegistry::new(Arc::new(MemoryLogger::new()));
        let err = registry
            .register(
                "broken",
                "Broken",
                serde_json::json!({"type": 12}),
                |_: Value| async { Ok(String::new()) },
            )
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidSchema { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_descriptors_in_request_order() {
        let (registry, _) = counting_registry();
        let descriptors = registry
            .descriptors_for(&["commentIssue", "closeIssue"])
            .unwrap();
        let names: Vec<_> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["commentIssue", "closeIssue"]);
        assert_eq!(descriptors[1].input_schema, close_schema());

        assert_eq!(registry.names(), vec!["closeIssue", "commentIssue"]);
    }

    #[test]
    fn test_descriptors_unknown_name() {
        let (registry, _) = counting_registry();
        let err = registry
            .descriptors_for(&["closeIssue", "lockIssue"])
            .unwrap_err();
        assert_eq!(err, ToolError::UnknownOperation("lockIssue".into()));
    }

    #[tokio::test]
    async fn test_executor_failure_is_reported() {
        let logger = Arc::new(MemoryLogger::new());
        let registry = OperationRegistry::new(logger.clone());
        registry
            .register(
                "renameIssue",
                "Rename Issue",
                ParamSchema::new().string("title", None).to_json(),
                |_: Value| async { Err(ToolError::execution("renameIssue", "403 Forbidden")) },
            )
            .unwrap();

        let err = registry
            .dispatch(&ToolCall::new("c", "renameIssue", r#"{"title":"x"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution { .. }));
        assert!(logger.contains("403 Forbidden"));
    }

    #[tokio::test]
    async fn test_dispatch_logs_name_and_arguments_at_info() {
        let logger = Arc::new(MemoryLogger::new());
        let registry = OperationRegistry::new(logger.clone());
        registry
            .register("closeIssue", "Close Issue", close_schema(), |args: CloseArgs| async move {
                Ok(args.reason)
            })
            .unwrap();

        registry
            .dispatch(&ToolCall::new("c", "closeIssue", r#"{"reason":"completed"}"#))
            .await
            .unwrap();
        let _ = registry
            .dispatch(&ToolCall::new("c", "closeIssue", r#"{"reason":"fixed"}"#))
            .await;

        let info = logger.messages_at(LogLevel::Info);
        assert!(info.iter().any(|m| m.contains(r#"closeIssue {"reason":"completed"}"#)));
        assert!(info.iter().any(|m| m.contains(r#"closeIssue {"reason":"fixed"}"#)));
        assert!(logger
            .messages_at(LogLevel::Warn)
            .iter()
            .any(|m| m.starts_with("[OperationRegistry] closeIssue failed: Invalid arguments")));
    }
}
