//! Closed enumerations accepted by the GitHub mutations

use serde::{Deserialize, Serialize};

/// Why an issue is being closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    NotPlanned,
    Completed,
}

impl CloseReason {
    pub const ALL: [CloseReason; 2] = [CloseReason::NotPlanned, CloseReason::Completed];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloseReason::NotPlanned => "not_planned",
            CloseReason::Completed => "completed",
        }
    }
}

/// Why a conversation is being locked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockReason {
    #[serde(rename = "off-topic")]
    OffTopic,
    #[serde(rename = "spam")]
    Spam,
    #[serde(rename = "too heated")]
    TooHeated,
    #[serde(rename = "resolved")]
    Resolved,
}

impl LockReason {
    pub const ALL: [LockReason; 4] = [
        LockReason::OffTopic,
        LockReason::Spam,
        LockReason::TooHeated,
        LockReason::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LockReason::OffTopic => "off-topic",
            LockReason::Spam => "spam",
            LockReason::TooHeated => "too heated",
            LockReason::Resolved => "resolved",
        }
    }
}

/// Pull request review verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewEvent {
    Approve,
    RequestChanges,
    Comment,
}

impl ReviewEvent {
    pub const ALL: [ReviewEvent; 3] = [
        ReviewEvent::Approve,
        ReviewEvent::RequestChanges,
        ReviewEvent::Comment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewEvent::Approve => "APPROVE",
            ReviewEvent::RequestChanges => "REQUEST_CHANGES",
            ReviewEvent::Comment => "COMMENT",
        }
    }
}

macro_rules! impl_display {
    ($($ty:ty),*) => {
        $(impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display!(CloseReason, LockReason, ReviewEvent);
