//! Open pull request index
//!
//! Push events only name a branch, so the session keeps the open pull
//! requests of the monitored repository keyed by head branch.

use gh_client::{GitHubClient, PullRequest};
use gh_pr_config::Repository;
use log::{debug, warn};
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct PullRequestTracker {
    open: HashMap<String, PullRequest>,
}

impl PullRequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the currently open pull requests of `repo`
    pub async fn load(client: &dyn GitHubClient, repo: &Repository) -> anyhow::Result<Self> {
        let prs = client.fetch_pull_requests(&repo.owner, &repo.name).await?;
        let mut tracker = Self::new();
        for pr in prs {
            tracker.insert(pr);
        }
        debug!("Tracking {} open PRs of {}", tracker.len(), repo);
        Ok(tracker)
    }

    pub fn on_opened(&mut self, pr: PullRequest) {
        self.insert(pr);
    }

    pub fn on_reopened(&mut self, pr: PullRequest) {
        self.insert(pr);
    }

    /// Forget a closed pull request
    ///
    /// A PR we never saw open means an `opened` event was missed; that is
    /// logged and otherwise ignored.
    pub fn on_closed(&mut self, pr: &PullRequest) -> Option<PullRequest> {
        let removed = self.open.remove(&pr.head_branch);
        if removed.is_none() {
            warn!(
                "Open PRs did not contain branch {} (PR#{})",
                pr.head_branch, pr.number
            );
        }
        removed
    }

    pub fn lookup_by_head_branch(&self, branch: &str) -> Option<&PullRequest> {
        self.open.get(branch)
    }

    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    fn insert(&mut self, pr: PullRequest) {
        self.open.insert(pr.head_branch.clone(), pr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{pull_request, FakeClient};

    #[test]
    fn test_opened_and_closed() {
        let mut tracker = PullRequestTracker::new();
        tracker.on_opened(pull_request(1, "alice", "feature/db"));
        assert_eq!(
            tracker.lookup_by_head_branch("feature/db").map(|pr| pr.number),
            Some(1)
        );

        let closed = tracker.on_closed(&pull_request(1, "alice", "feature/db"));
        assert_eq!(closed.map(|pr| pr.number), Some(1));
        assert!(tracker.lookup_by_head_branch("feature/db").is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_reopened_overwrites_entry() {
        let mut tracker = PullRequestTracker::new();
        tracker.on_opened(pull_request(1, "alice", "feature"));
        tracker.on_reopened(pull_request(2, "bob", "feature"));

        assert_eq!(tracker.len(), 1);
        assert_eq!(
            tracker.lookup_by_head_branch("feature").map(|pr| pr.number),
            Some(2)
        );
    }

    #[test]
    fn test_closing_unknown_branch_is_tolerated() {
        let mut tracker = PullRequestTracker::new();
        tracker.on_opened(pull_request(1, "alice", "kept"));

        assert!(tracker.on_closed(&pull_request(9, "bob", "never-seen")).is_none());
        assert_eq!(tracker.len(), 1);
        assert!(tracker.lookup_by_head_branch("kept").is_some());
    }

    #[tokio::test]
    async fn test_load_indexes_open_pull_requests() {
        let fake = FakeClient::default();
        fake.add_open_pull_request(pull_request(3, "alice", "feature/a"));
        fake.add_open_pull_request(pull_request(4, "bob", "feature/b"));

        let repo = Repository::new("appfolio", "landa");
        let tracker = PullRequestTracker::load(&fake, &repo).await.unwrap();

        assert_eq!(tracker.len(), 2);
        assert_eq!(
            tracker.lookup_by_head_branch("feature/b").map(|pr| pr.number),
            Some(4)
        );
    }
}
