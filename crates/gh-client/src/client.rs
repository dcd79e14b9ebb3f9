//! GitHub client trait definition
//!
//! This module defines the core `GitHubClient` trait that all client
//! implementations must satisfy. It covers exactly the calls the labeler
//! needs: reading the events feed, reading pull requests and their files,
//! and mutating labels and commit statuses.

use crate::types::{ChangedFile, EventsPage, PullRequest, StatusState};
use async_trait::async_trait;
use std::collections::BTreeSet;

/// GitHub API client trait
///
/// Defines the interface for interacting with the GitHub API.
/// Implementations can be direct (hitting the API) or decorated
/// with dry-run behavior, recording for tests, etc.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks and threads.
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{GitHubClient, PullRequest};
///
/// async fn list_prs(client: &dyn GitHubClient) -> anyhow::Result<Vec<PullRequest>> {
///     client.fetch_pull_requests("rust-lang", "rust").await
/// }
/// ```
#[async_trait]
pub trait GitHubClient: Send + Sync {
    // === Events ===

    /// Fetch one page of the repository events feed
    ///
    /// # Arguments
    ///
    /// * `owner` - Repository owner (user or organization)
    /// * `repo` - Repository name
    /// * `page` - 1-based page number
    /// * `etag` - Cache-validation token from a previous fetch of the same page
    ///
    /// # Returns
    ///
    /// The page of events (newest first), or an empty page with
    /// `not_modified` set when the token is still valid.
    async fn fetch_events(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        etag: Option<&str>,
    ) -> anyhow::Result<EventsPage>;

    // === Pull requests ===

    /// Fetch all open pull requests for a repository
    async fn fetch_pull_requests(&self, owner: &str, repo: &str)
        -> anyhow::Result<Vec<PullRequest>>;

    /// Fetch a single pull request by number
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// Fetch the files changed by a pull request
    async fn fetch_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>>;

    // === Labels ===

    /// Fetch the labels currently set on an issue or pull request
    async fn fetch_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<BTreeSet<String>>;

    /// Replace all labels of an issue with the given set
    async fn replace_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Add labels to an issue, keeping the existing ones
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Remove a single label from an issue
    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()>;

    // === Commit statuses ===

    /// Fetch the status contexts already recorded for a commit
    async fn fetch_status_contexts(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<BTreeSet<String>>;

    /// Create a commit status
    ///
    /// # Arguments
    ///
    /// * `commit_sha` - The commit to attach the status to
    /// * `state` - Status state
    /// * `context` - Status context (the name shown in the PR checks list)
    /// * `description` - Short human readable description
    async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        state: StatusState,
        context: &str,
        description: &str,
    ) -> anyhow::Result<()>;
}
