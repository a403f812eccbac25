//! GitHub REST capability
//!
//! `IssueApi` is everything the operations need from GitHub. `RestClient`
//! implements it over the REST API for the issue in an `IssueContext`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::context::IssueContext;
use super::models::{CloseReason, LockReason, ReviewEvent};
use crate::logging::Logger;

const LABELS_PER_PAGE: usize = 100;

/// Errors from the GitHub capability
#[derive(Error, Debug)]
pub enum GitHubError {
    /// GitHub answered with a non-success status
    #[error("GitHub API error ({status}) during {operation}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    /// Network/HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token cannot be used as a header value
    #[error("invalid GitHub token: {0}")]
    InvalidToken(String),

    /// Anything else, mostly from test doubles
    #[error("{0}")]
    Other(String),
}

pub type GitHubResult<T> = Result<T, GitHubError>;

/// Mutations and lookups on the current issue or pull request
#[async_trait]
pub trait IssueApi: Send + Sync {
    /// All label names defined on the repository
    async fn list_labels(&self) -> GitHubResult<Vec<String>>;

    async fn close_issue(&self, reason: CloseReason) -> GitHubResult<()>;

    async fn lock_issue(&self, reason: LockReason) -> GitHubResult<()>;

    async fn create_comment(&self, body: &str) -> GitHubResult<()>;

    async fn add_labels(&self, labels: &[String]) -> GitHubResult<()>;

    async fn rename_issue(&self, title: &str) -> GitHubResult<()>;

    async fn create_review(&self, event: ReviewEvent, body: &str) -> GitHubResult<()>;
}

/// `IssueApi` over the GitHub REST API
pub struct RestClient {
    http: reqwest::Client,
    ctx: IssueContext,
    logger: Arc<dyn Logger>,
}

impl RestClient {
    pub fn new(
        ctx: IssueContext,
        token: &str,
        timeout: Duration,
        logger: Arc<dyn Logger>,
    ) -> GitHubResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("llm-triage/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .map_err(|e| GitHubError::InvalidToken(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, ctx, logger })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}{}",
            self.ctx.api_url, self.ctx.owner, self.ctx.repo, path
        )
    }

    fn issue_url(&self, path: &str) -> String {
        self.repo_url(&format!("/issues/{}{}", self.ctx.number, path))
    }

    async fn send(
        &self,
        operation: &str,
        request: reqwest::RequestBuilder,
    ) -> GitHubResult<reqwest::Response> {
        self.logger
            .debug(&format!("[RestClient] {} on {}#{}", operation, self.ctx.slug(), self.ctx.number));
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(GitHubError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message: api_message(&body),
        })
    }
}

#[derive(Deserialize)]
struct LabelRow {
    name: String,
}

#[async_trait]
impl IssueApi for RestClient {
    async fn list_labels(&self) -> GitHubResult<Vec<String>> {
        let mut names = Vec::new();
        let mut page = 1_u32;
        loop {
            let request = self.http.get(self.repo_url("/labels")).query(&[
                ("per_page", LABELS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ]);
            let rows: Vec<LabelRow> = self.send("list labels", request).await?.json().await?;
            let count = rows.len();
            names.extend(rows.into_iter().map(|r| r.name));
            match next_page(page, count) {
                Some(next) => page = next,
                None => break,
            }
        }
        Ok(names)
    }

    async fn close_issue(&self, reason: CloseReason) -> GitHubResult<()> {
        let request = self
            .http
            .patch(self.issue_url(""))
            .json(&json!({ "state": "closed", "state_reason": reason }));
        self.send("close issue", request).await.map(drop)
    }

    async fn lock_issue(&self, reason: LockReason) -> GitHubResult<()> {
        let request = self
            .http
            .put(self.issue_url("/lock"))
            .json(&json!({ "lock_reason": reason }));
        self.send("lock issue", request).await.map(drop)
    }

    async fn create_comment(&self, body: &str) -> GitHubResult<()> {
        let request = self
            .http
            .post(self.issue_url("/comments"))
            .json(&json!({ "body": body }));
        self.send("create comment", request).await.map(drop)
    }

    async fn add_labels(&self, labels: &[String]) -> GitHubResult<()> {
        let request = self
            .http
            .post(self.issue_url("/labels"))
            .json(&json!({ "labels": labels }));
        self.send("add labels", request).await.map(drop)
    }

    async fn rename_issue(&self, title: &str) -> GitHubResult<()> {
        let request = self
            .http
            .patch(self.issue_url(""))
            .json(&json!({ "title": title }));
        self.send("rename issue", request).await.map(drop)
    }

    async fn create_review(&self, event: ReviewEvent, body: &str) -> GitHubResult<()> {
        let url = self.repo_url(&format!("/pulls/{}/reviews", self.ctx.number));
        let request = self
            .http
            .post(url)
            .json(&json!({ "event": event, "body": body }));
        self.send("create review", request).await.map(drop)
    }
}

/// A full page means there may be more; a short one is the last
fn next_page(page: u32, received: usize) -> Option<u32> {
    if received < LABELS_PER_PAGE {
        None
    } else {
        page.checked_add(1)
    }
}

/// GitHub error bodies carry a `message` field; fall back to the raw body
fn api_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(800).collect())
}
