//! GitHub API data transfer objects
//!
//! These types represent the data returned from the GitHub API.
//! They are intentionally separate from the labeler's domain logic
//! to keep this crate pure and reusable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A pull request from the GitHub API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number (e.g., 123)
    pub number: u64,

    /// PR title
    pub title: String,

    /// Author's GitHub username
    pub author: String,

    /// HEAD commit SHA
    pub head_sha: String,

    /// Base branch name (e.g., "main")
    pub base_branch: String,

    /// HEAD branch name (e.g., "feature/foo")
    pub head_branch: String,

    /// Full name (`owner/name`) of the repository the PR targets
    pub base_repository: String,

    /// PR URL for opening in browser
    pub html_url: String,
}

/// What happened to a pull request in a `PullRequestEvent`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PullRequestAction {
    Opened,
    /// New commits were pushed to the head branch
    Synchronize,
    Reopened,
    Closed,
    /// Any action the labeler does not act on (edited, labeled, ...)
    Other(String),
}

impl PullRequestAction {
    pub fn parse(action: &str) -> Self {
        match action {
            "opened" => Self::Opened,
            "synchronize" => Self::Synchronize,
            "reopened" => Self::Reopened,
            "closed" => Self::Closed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Opened => "opened",
            Self::Synchronize => "synchronize",
            Self::Reopened => "reopened",
            Self::Closed => "closed",
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a repository event, discriminated by event type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventPayload {
    /// `PullRequestEvent`
    PullRequest {
        action: PullRequestAction,
        pull_request: PullRequest,
    },

    /// `PushEvent`
    Push {
        /// Full git ref, e.g. `refs/heads/feature/foo`
        git_ref: String,
    },

    /// Any other event type; never acted upon
    Other { event_type: String },
}

/// A single entry of the repository events feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEvent {
    /// Monotonically increasing event identifier
    pub id: u64,

    /// When GitHub recorded the event
    pub created_at: DateTime<Utc>,

    /// Login of the user that triggered the event
    pub actor: String,

    pub payload: EventPayload,
}

impl RepoEvent {
    /// GitHub's name for the event type (e.g. `PushEvent`)
    pub fn event_type(&self) -> &str {
        match &self.payload {
            EventPayload::PullRequest { .. } => "PullRequestEvent",
            EventPayload::Push { .. } => "PushEvent",
            EventPayload::Other { event_type } => event_type,
        }
    }

    /// Whether the labeler reacts to this kind of event at all
    pub fn is_tracked(&self) -> bool {
        !matches!(self.payload, EventPayload::Other { .. })
    }
}

/// One page of the repository events feed
#[derive(Debug, Clone, Default)]
pub struct EventsPage {
    /// Events, newest first as delivered by GitHub
    pub events: Vec<RepoEvent>,

    /// Cache-validation token to present on the next request
    pub etag: Option<String>,

    /// Server-recommended delay before polling again (`X-Poll-Interval`)
    pub poll_interval: Option<Duration>,

    /// Page number to request next, if the feed has more pages
    pub next_page: Option<u32>,

    /// True when the server answered `304 Not Modified`
    pub not_modified: bool,
}

/// A file touched by a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root
    pub path: String,
}

/// Commit status state (legacy Status API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
    Error,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusState::Pending => "pending",
            StatusState::Success => "success",
            StatusState::Failure => "failure",
            StatusState::Error => "error",
        };
        f.write_str(name)
    }
}
