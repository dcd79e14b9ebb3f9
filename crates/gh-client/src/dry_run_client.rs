//! Dry-run GitHub API client (decorator pattern)
//!
//! Wraps any `GitHubClient` implementation. Reads are delegated to the inner
//! client, mutations are logged instead of executed so rule changes can be
//! tried against a live repository without touching it.

use crate::client::GitHubClient;
use crate::types::{ChangedFile, EventsPage, PullRequest, StatusState};
use async_trait::async_trait;
use log::info;
use std::collections::BTreeSet;

/// Dry-run GitHub API client using the decorator pattern
///
/// # Example
///
/// ```rust,ignore
/// use gh_client::{DryRunClient, OctocrabClient};
/// use std::sync::Arc;
///
/// let octocrab = Arc::new(octocrab::Octocrab::builder().build().unwrap());
/// let client = DryRunClient::new(OctocrabClient::new(octocrab));
/// ```
#[derive(Debug, Clone)]
pub struct DryRunClient<C: GitHubClient> {
    inner: C,
}

impl<C: GitHubClient> DryRunClient<C> {
    /// Create a new dry-run client around `inner`
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: GitHubClient> GitHubClient for DryRunClient<C> {
    async fn fetch_events(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        etag: Option<&str>,
    ) -> anyhow::Result<EventsPage> {
        self.inner.fetch_events(owner, repo, page, etag).await
    }

    async fn fetch_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        self.inner.fetch_pull_requests(owner, repo).await
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        self.inner.fetch_pull_request(owner, repo, pr_number).await
    }

    async fn fetch_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>> {
        self.inner.fetch_changed_files(owner, repo, pr_number).await
    }

    async fn fetch_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<BTreeSet<String>> {
        self.inner.fetch_labels(owner, repo, issue_number).await
    }

    // Mutations below are never forwarded

    async fn replace_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        info!(
            "[dry-run] replace labels of {}/{}#{} with [{}]",
            owner,
            repo,
            issue_number,
            labels.join(", ")
        );
        Ok(())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        info!(
            "[dry-run] add labels [{}] to {}/{}#{}",
            labels.join(", "),
            owner,
            repo,
            issue_number
        );
        Ok(())
    }

    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        info!(
            "[dry-run] remove label {} from {}/{}#{}",
            label, owner, repo, issue_number
        );
        Ok(())
    }

    async fn fetch_status_contexts(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<BTreeSet<String>> {
        self.inner
            .fetch_status_contexts(owner, repo, commit_sha)
            .await
    }

    async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
        state: StatusState,
        context: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        info!(
            "[dry-run] set {}/{}@{} status {} to {}: {}",
            owner, repo, commit_sha, context, state, description
        );
        Ok(())
    }
}
