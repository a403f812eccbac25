//! GitHub capability and the triage operations built on it
//!
//! - `IssueContext`: which issue/PR this run acts on
//! - `IssueApi` / `RestClient`: the REST calls
//! - `build_registry`: the six operations bound to an `IssueApi`
//! - `MockIssueApi`: recording test double

mod client;
mod context;
mod mock;
mod models;
mod operations;

pub use client::{GitHubError, GitHubResult, IssueApi, RestClient};
pub use context::{number_from_payload, IssueContext, DEFAULT_API_URL};
pub use mock::{MockIssueApi, Mutation};
pub use models::{CloseReason, LockReason, ReviewEvent};
pub use operations::{
    build_registry, check_selection, LabelSource, CLOSE_ISSUE, COMMENT_ISSUE, DEFAULT_LABELS,
    LABEL_ISSUE, LOCK_ISSUE, OPERATION_NAMES, RENAME_ISSUE, REVIEW_PULL_REQUEST,
};
