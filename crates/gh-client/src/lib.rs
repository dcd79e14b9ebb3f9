//! GitHub API client for the pull request labeler
//!
//! This crate provides a trait-based GitHub API client covering the calls a
//! labeling bot needs: the repository events feed, pull requests and their
//! changed files, labels and commit statuses.
//! The design follows the decorator pattern, allowing dry-run behavior to be
//! composed with the base client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │              GitHubClient trait                  │
//! │  - fetch_events()                                │
//! │  - fetch_pull_requests() / fetch_changed_files() │
//! │  - add_labels() / remove_label() / create_status │
//! └─────────────────────────────────────────────────┘
//!                        │
//!        ┌───────────────┴───────────────┐
//!        ▼                               ▼
//! ┌─────────────────┐         ┌─────────────────────┐
//! │ OctocrabClient  │         │ DryRunClient        │
//! │ (direct API)    │◄────────│ (decorator)         │
//! └─────────────────┘         └─────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use gh_client::{DryRunClient, GitHubClient, OctocrabClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let octocrab = octocrab::Octocrab::builder()
//!     .personal_token("token".to_string())
//!     .build()?;
//!
//! // Reads hit the API, label and status mutations are only logged
//! let client = DryRunClient::new(OctocrabClient::new(Arc::new(octocrab)));
//! let prs = client.fetch_pull_requests("owner", "repo").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connect;
pub mod dry_run_client;
pub mod error;
pub mod octocrab_client;
pub mod types;
pub mod wire;

/// Default GitHub host (public GitHub)
pub const DEFAULT_HOST: &str = "github.com";

pub use client::GitHubClient;
pub use connect::{connect, GitHubHost};
pub use dry_run_client::DryRunClient;
pub use error::{is_transient, TransportError};
pub use octocrab_client::OctocrabClient;
pub use types::{
    ChangedFile, EventPayload, EventsPage, PullRequest, PullRequestAction, RepoEvent, StatusState,
};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
