//! Issue/PR context of the current workflow run

use serde_json::Value;
use std::path::Path;

use crate::config::{ConfigError, ConfigResult};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// The single issue or pull request this run acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueContext {
    pub owner: String,
    pub repo: String,
    pub number: u64,
    pub event_name: String,
    pub api_url: String,
}

impl IssueContext {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, number: u64) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            number,
            event_name: String::new(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }

    /// Read the context from the runner's `GITHUB_*` variables
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` with an injectable variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let slug = var("GITHUB_REPOSITORY")
            .ok_or_else(|| ConfigError::MissingInput("GITHUB_REPOSITORY".into()))?;
        let (owner, repo) = parse_slug(&slug)?;

        let event_path = var("GITHUB_EVENT_PATH")
            .ok_or_else(|| ConfigError::MissingInput("GITHUB_EVENT_PATH".into()))?;
        let number = number_from_event_file(Path::new(&event_path))?;

        Ok(Self {
            owner,
            repo,
            number,
            event_name: var("GITHUB_EVENT_NAME").unwrap_or_default(),
            api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// True when the triggering event concerns a pull request
    pub fn is_pull_request(&self) -> bool {
        self.event_name.starts_with("pull_request")
    }
}

fn parse_slug(raw: &str) -> ConfigResult<(String, String)> {
    let invalid = || ConfigError::invalid("GITHUB_REPOSITORY", format!("expected owner/repo, got {raw:?}"));
    let (owner, repo) = raw.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(invalid());
    }
    Ok((owner.to_string(), repo.to_string()))
}

fn number_from_event_file(path: &Path) -> ConfigResult<u64> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        ConfigError::invalid("GITHUB_EVENT_PATH", format!("{}: {}", path.display(), e))
    })?;
    let payload: Value = serde_json::from_str(&raw)
        .map_err(|e| ConfigError::invalid("GITHUB_EVENT_PATH", e.to_string()))?;
    number_from_payload(&payload)
}

/// Issue or PR number of an event payload
pub fn number_from_payload(payload: &Value) -> ConfigResult<u64> {
    [
        &payload["issue"]["number"],
        &payload["pull_request"]["number"],
        &payload["number"],
    ]
    .into_iter()
    .find_map(Value::as_u64)
    .ok_or_else(|| {
        ConfigError::invalid("GITHUB_EVENT_PATH", "event payload has no issue or pull request number")
    })
}
