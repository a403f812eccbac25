//! The triage operation catalog
//!
//! Six operations, each performing exactly one GitHub mutation on the
//! current issue or pull request:
//!
//! | name                | arguments                   |
//! |---------------------|-----------------------------|
//! | `closeIssue`        | `reason`                    |
//! | `lockIssue`         | `reason`                    |
//! | `commentIssue`      | `content`                   |
//! | `labelIssue`        | `label` (array)             |
//! | `renameIssue`       | `title`                     |
//! | `reviewPullRequest` | `event`, `content`          |

use serde::Deserialize;
use std::sync::Arc;

use super::client::{GitHubError, IssueApi};
use super::context::IssueContext;
use super::models::{CloseReason, LockReason, ReviewEvent};
use crate::config::{ConfigError, ConfigResult};
use crate::logging::Logger;
use crate::tools::{build_enum_schema, EnumSchema, OperationRegistry, ParamSchema, RegistryResult, ToolError};

pub const CLOSE_ISSUE: &str = "closeIssue";
pub const LOCK_ISSUE: &str = "lockIssue";
pub const COMMENT_ISSUE: &str = "commentIssue";
pub const LABEL_ISSUE: &str = "labelIssue";
pub const RENAME_ISSUE: &str = "renameIssue";
pub const REVIEW_PULL_REQUEST: &str = "reviewPullRequest";

/// Every operation `build_registry` registers, in catalog order
pub const OPERATION_NAMES: [&str; 6] = [
    CLOSE_ISSUE,
    LOCK_ISSUE,
    COMMENT_ISSUE,
    LABEL_ISSUE,
    RENAME_ISSUE,
    REVIEW_PULL_REQUEST,
];

/// Labels offered when the repository's own labels are unavailable
pub const DEFAULT_LABELS: [&str; 6] = [
    "bug",
    "enhancement",
    "question",
    "invalid",
    "wontfix",
    "duplicate",
];

/// Where the `labelIssue` enum comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSource {
    /// Ask the repository, fall back to `DEFAULT_LABELS` on failure or no labels
    Repository,
    /// Use `DEFAULT_LABELS` without a network call
    Fallback,
}

/// Reject an enabled-operation list naming anything outside the catalog.
///
/// Needs no network, so a misconfigured run fails before any call is made.
pub fn check_selection<S: AsRef<str>>(names: &[S]) -> ConfigResult<()> {
    match names
        .iter()
        .find(|n| !OPERATION_NAMES.contains(&n.as_ref()))
    {
        Some(unknown) => Err(ConfigError::UnknownOperation(unknown.as_ref().to_string())),
        None => Ok(()),
    }
}

#[derive(Deserialize)]
struct CloseArgs {
    reason: CloseReason,
}

#[derive(Deserialize)]
struct LockArgs {
    reason: LockReason,
}

#[derive(Deserialize)]
struct CommentArgs {
    content: String,
}

#[derive(Deserialize)]
struct LabelArgs {
    label: Vec<String>,
}

#[derive(Deserialize)]
struct RenameArgs {
    title: String,
}

#[derive(Deserialize)]
struct ReviewArgs {
    event: ReviewEvent,
    content: String,
}

/// Shared state every executor needs
#[derive(Clone)]
struct Target {
    number: u64,
    api: Arc<dyn IssueApi>,
    logger: Arc<dyn Logger>,
}

impl Target {
    fn confirm(&self, message: String) -> String {
        self.logger.info(&message);
        message
    }

    async fn close(self, args: CloseArgs) -> RegistryResult<String> {
        self.api
            .close_issue(args.reason)
            .await
            .map_err(failed(CLOSE_ISSUE))?;
        Ok(self.confirm(format!("#{} closed as {}", self.number, args.reason)))
    }

    async fn lock(self, args: LockArgs) -> RegistryResult<String> {
        self.api
            .lock_issue(args.reason)
            .await
            .map_err(failed(LOCK_ISSUE))?;
        Ok(self.confirm(format!("#{} locked as {}", self.number, args.reason)))
    }

    async fn comment(self, args: CommentArgs) -> RegistryResult<String> {
        self.api
            .create_comment(&args.content)
            .await
            .map_err(failed(COMMENT_ISSUE))?;
        Ok(self.confirm(format!("#{} commented: {}", self.number, args.content)))
    }

    async fn label(self, args: LabelArgs) -> RegistryResult<String> {
        self.api
            .add_labels(&args.label)
            .await
            .map_err(failed(LABEL_ISSUE))?;
        Ok(self.confirm(format!("#{} labeled: {}", self.number, args.label.join(","))))
    }

    async fn rename(self, args: RenameArgs) -> RegistryResult<String> {
        self.api
            .rename_issue(&args.title)
            .await
            .map_err(failed(RENAME_ISSUE))?;
        Ok(self.confirm(format!("#{} renamed: {}", self.number, args.title)))
    }

    async fn review(self, args: ReviewArgs) -> RegistryResult<String> {
        self.api
            .create_review(args.event, &args.content)
            .await
            .map_err(failed(REVIEW_PULL_REQUEST))?;
        Ok(self.confirm(format!("#{} reviewed as {}", self.number, args.event)))
    }
}

fn failed(operation: &'static str) -> impl Fn(GitHubError) -> ToolError {
    move |e| ToolError::execution(operation, e.to_string())
}

/// Build the registry holding all six operations.
///
/// The label enum is computed once here and never refreshed.
pub async fn build_registry(
    ctx: &IssueContext,
    api: Arc<dyn IssueApi>,
    logger: Arc<dyn Logger>,
    labels: LabelSource,
) -> RegistryResult<OperationRegistry> {
    let fallback: Vec<String> = DEFAULT_LABELS.iter().map(|s| s.to_string()).collect();
    let live = match labels {
        LabelSource::Fallback => None,
        LabelSource::Repository => match api.list_labels().await {
            Ok(names) => {
                if names.is_empty() {
                    logger.info("Repository has no labels, using default label set");
                }
                Some(names)
            }
            Err(e) => {
                logger.warn(&format!(
                    "Could not list repository labels, using default label set: {}",
                    e
                ));
                None
            }
        },
    };
    let label_enum = build_enum_schema("label", live.as_deref(), &fallback)?;

    let target = Target {
        number: ctx.number,
        api,
        logger: logger.clone(),
    };
    let registry = OperationRegistry::new(logger);

    let t = target.clone();
    registry.register(
        CLOSE_ISSUE,
        "Close Issue",
        ParamSchema::new()
            .enumeration("reason", None, EnumSchema::new("reason", CloseReason::ALL.map(|r| r.as_str()))?)
            .to_json(),
        move |args| t.clone().close(args),
    )?;

    let t = target.clone();
    registry.register(
        LOCK_ISSUE,
        "Lock Issue",
        ParamSchema::new()
            .enumeration("reason", None, EnumSchema::new("reason", LockReason::ALL.map(|r| r.as_str()))?)
            .to_json(),
        move |args| t.clone().lock(args),
    )?;

    let t = target.clone();
    registry.register(
        COMMENT_ISSUE,
        "Comment Issue",
        ParamSchema::new().string("content", None).to_json(),
        move |args| t.clone().comment(args),
    )?;

    let t = target.clone();
    registry.register(
        LABEL_ISSUE,
        "Label Issue",
        ParamSchema::new().enum_array("label", None, label_enum).to_json(),
        move |args| t.clone().label(args),
    )?;

    let t = target.clone();
    registry.register(
        RENAME_ISSUE,
        "Rename Issue",
        ParamSchema::new().string("title", None).to_json(),
        move |args| t.clone().rename(args),
    )?;

    registry.register(
        REVIEW_PULL_REQUEST,
        "Review Pull Request",
        ParamSchema::new()
            .enumeration("event", None, EnumSchema::new("event", ReviewEvent::ALL.map(|e| e.as_str()))?)
            .string("content", None)
            .to_json(),
        move |args| target.clone().review(args),
    )?;

    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::{MockIssueApi, Mutation};
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::types::ToolCall;
    use serde_json::json;

    async fn registry_with(api: Arc<MockIssueApi>, labels: LabelSource) -> (OperationRegistry, Arc<MemoryLogger>) {
        let logger = Arc::new(MemoryLogger::new());
        let registry = build_registry(&IssueContext::new("octo", "widgets", 5), api, logger.clone(), labels)
            .await
            .unwrap();
        (registry, logger)
    }

    fn label_enum(registry: &OperationRegistry) -> serde_json::Value {
        registry.descriptors_for(&[LABEL_ISSUE]).unwrap()[0].input_schema["properties"]["label"]["items"]["enum"]
            .clone()
    }

    #[tokio::test]
    async fn test_catalog() {
        let (registry, _) = registry_with(Arc::new(MockIssueApi::new()), LabelSource::Fallback).await;
        assert_eq!(registry.names(), OPERATION_NAMES.to_vec());

        let review = &registry.descriptors_for(&[REVIEW_PULL_REQUEST]).unwrap()[0];
        assert_eq!(review.description, "Review Pull Request");
        assert_eq!(review.input_schema["required"], json!(["event", "content"]));
        assert_eq!(
            review.input_schema["properties"]["event"]["enum"],
            json!(["APPROVE", "REQUEST_CHANGES", "COMMENT"])
        );
    }

    #[tokio::test]
    async fn test_each_operation_performs_one_mutation() {
        let api = Arc::new(MockIssueApi::new().with_labels(["bug", "docs"]));
        let (registry, logger) = registry_with(api.clone(), LabelSource::Repository).await;

        let calls = [
            (CLOSE_ISSUE, json!({"reason": "not_planned"}), "#5 closed as not_planned"),
            (LOCK_ISSUE, json!({"reason": "too heated"}), "#5 locked as too heated"),
            (COMMENT_ISSUE, json!({"content": "thanks"}), "#5 commented: thanks"),
            (LABEL_ISSUE, json!({"label": ["bug", "docs"]}), "#5 labeled: bug,docs"),
            (RENAME_ISSUE, json!({"title": "Crash on start"}), "#5 renamed: Crash on start"),
            (REVIEW_PULL_REQUEST, json!({"event": "APPROVE", "content": "LGTM"}), "#5 reviewed as APPROVE"),
        ];
        for (name, args, expected) in calls {
            let out = registry
                .dispatch(&ToolCall::new("c", name, args.to_string()))
                .await
                .unwrap();
            assert_eq!(out, expected);
        }

        assert_eq!(
            api.mutations(),
            vec![
                Mutation::Close(CloseReason::NotPlanned),
                Mutation::Lock(LockReason::TooHeated),
                Mutation::Comment("thanks".into()),
                Mutation::AddLabels(vec!["bug".into(), "docs".into()]),
                Mutation::Rename("Crash on start".into()),
                Mutation::Review(ReviewEvent::Approve, "LGTM".into()),
            ]
        );
        assert_eq!(logger.messages_at(LogLevel::Info).iter().filter(|m| m.starts_with("#5 ")).count(), 6);
    }

    #[tokio::test]
    async fn test_label_outside_live_set_is_rejected() {
        let api = Arc::new(MockIssueApi::new().with_labels(["bug", "docs"]));
        let (registry, _) = registry_with(api.clone(), LabelSource::Repository).await;
        assert_eq!(label_enum(&registry), json!(["bug", "docs"]));

        let err = registry
            .dispatch(&ToolCall::new("c", LABEL_ISSUE, r#"{"label":["nonexistent-label"]}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
        assert!(api.mutations().is_empty());
    }

    #[tokio::test]
    async fn test_label_fetch_failure_falls_back() {
        let api = Arc::new(MockIssueApi::new().with_label_error("connection reset"));
        let (registry, logger) = registry_with(api.clone(), LabelSource::Repository).await;

        assert_eq!(label_enum(&registry), json!(DEFAULT_LABELS));
        assert_eq!(api.label_requests(), 1);
        assert!(logger.contains("connection reset"));
    }

    #[tokio::test]
    async fn test_empty_repository_labels_fall_back() {
        let api = Arc::new(MockIssueApi::new());
        let (registry, _) = registry_with(api, LabelSource::Repository).await;
        assert_eq!(label_enum(&registry), json!(DEFAULT_LABELS));
    }

    #[tokio::test]
    async fn test_fallback_source_skips_network() {
        let api = Arc::new(MockIssueApi::new().with_labels(["bug"]));
        let (registry, _) = registry_with(api.clone(), LabelSource::Fallback).await;
        assert_eq!(api.label_requests(), 0);
        assert_eq!(label_enum(&registry), json!(DEFAULT_LABELS));
    }

    #[tokio::test]
    async fn test_github_failure_becomes_execution_error() {
        let api = Arc::new(MockIssueApi::new().failing("lock_issue"));
        let (registry, _) = registry_with(api.clone(), LabelSource::Fallback).await;

        let err = registry
            .dispatch(&ToolCall::new("c", LOCK_ISSUE, r#"{"reason":"spam"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Execution { ref operation, .. } if operation == LOCK_ISSUE));
        assert!(err.to_string().contains("403"));
    }

    #[test]
    fn test_check_selection() {
        assert!(check_selection(&["closeIssue", "commentIssue"]).is_ok());
        assert!(check_selection(&OPERATION_NAMES).is_ok());

        let err = check_selection(&["closeIssue", "deleteIssue"]).unwrap_err();
        assert_eq!(err, ConfigError::UnknownOperation("deleteIssue".into()));
        assert_eq!(err.to_string(), r#"Tool "deleteIssue" is not available"#);
    }
}
