//! In-memory `IssueApi` for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use super::client::{GitHubError, GitHubResult, IssueApi};
use super::models::{CloseReason, LockReason, ReviewEvent};

/// A mutation the mock received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Close(CloseReason),
    Lock(LockReason),
    Comment(String),
    AddLabels(Vec<String>),
    Rename(String),
    Review(ReviewEvent, String),
}

/// Records mutations instead of performing them
pub struct MockIssueApi {
    labels: Result<Vec<String>, String>,
    failing: HashSet<&'static str>,
    mutations: Mutex<Vec<Mutation>>,
    label_requests: Mutex<usize>,
}

impl Default for MockIssueApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIssueApi {
    /// A mock whose repository has no labels
    pub fn new() -> Self {
        Self {
            labels: Ok(Vec::new()),
            failing: HashSet::new(),
            mutations: Mutex::new(Vec::new()),
            label_requests: Mutex::new(0),
        }
    }

    /// Repository labels returned by `list_labels`
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Ok(labels.into_iter().map(Into::into).collect());
        self
    }

    /// Make `list_labels` fail
    pub fn with_label_error(mut self, message: impl Into<String>) -> Self {
        self.labels = Err(message.into());
        self
    }

    /// Make one mutation fail. `method` is the `IssueApi` method name.
    pub fn failing(mut self, method: &'static str) -> Self {
        self.failing.insert(method);
        self
    }

    pub fn mutations(&self) -> Vec<Mutation> {
        self.mutations.lock().clone()
    }

    pub fn label_requests(&self) -> usize {
        *self.label_requests.lock()
    }

    fn record(&self, method: &'static str, mutation: Mutation) -> GitHubResult<()> {
        if self.failing.contains(method) {
            return Err(GitHubError::Api {
                operation: method.to_string(),
                status: 403,
                message: "Resource not accessible by integration".to_string(),
            });
        }
        self.mutations.lock().push(mutation);
        Ok(())
    }
}

#[async_trait]
impl IssueApi for MockIssueApi {
    async fn list_labels(&self) -> GitHubResult<Vec<String>> {
        *self.label_requests.lock() += 1;
        self.labels.clone().map_err(GitHubError::Other)
    }

    async fn close_issue(&self, reason: CloseReason) -> GitHubResult<()> {
        self.record("close_issue", Mutation::Close(reason))
    }

    async fn lock_issue(&self, reason: LockReason) -> GitHubResult<()> {
        self.record("lock_issue", Mutation::Lock(reason))
    }

    async fn create_comment(&self, body: &str) -> GitHubResult<()> {
        self.record("create_comment", Mutation::Comment(body.to_string()))
    }

    async fn add_labels(&self, labels: &[String]) -> GitHubResult<()> {
        self.record("add_labels", Mutation::AddLabels(labels.to_vec()))
    }

    async fn rename_issue(&self, title: &str) -> GitHubResult<()> {
        self.record("rename_issue", Mutation::Rename(title.to_string()))
    }

    async fn create_review(&self, event: ReviewEvent, body: &str) -> GitHubResult<()> {
        self.record("create_review", Mutation::Review(event, body.to_string()))
    }
}
