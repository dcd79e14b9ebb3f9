//! Event dispatch and the label / commit status cycles
//!
//! The reconciler owns the open PR index of a session. Pull request events
//! keep the index current; `opened`, `synchronize` and pushes to a PR branch
//! run the label cycle and, when contexts are configured, the commit status
//! cycle for that PR.

use crate::labels::{decide, LabelDelta};
use crate::tracker::PullRequestTracker;
use gh_client::{EventPayload, GitHubClient, PullRequest, PullRequestAction, RepoEvent, StatusState};
use gh_pr_config::{LabelStrategy, Repository, RuleConfig, RuleRegistry};
use log::{debug, error, info};
use std::sync::Arc;

const BRANCH_REF_PREFIX: &str = "refs/heads/";

/// What a label/status cycle did for one pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The PR's repository has no rules
    NotMonitored,
    IgnoredAuthor,
    IgnoredBaseBranch,
    Processed {
        labels: LabelDelta,
        /// Status contexts created, in context order
        created_statuses: Vec<String>,
    },
}

pub struct Reconciler {
    client: Arc<dyn GitHubClient>,
    repo: Repository,
    registry: Arc<RuleRegistry>,
    tracker: PullRequestTracker,
    strategy: LabelStrategy,
}

impl Reconciler {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        repo: Repository,
        registry: Arc<RuleRegistry>,
        tracker: PullRequestTracker,
        strategy: LabelStrategy,
    ) -> Self {
        Self {
            client,
            repo,
            registry,
            tracker,
            strategy,
        }
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &PullRequestTracker {
        &self.tracker
    }

    /// React to one event of the feed
    pub async fn handle(&mut self, event: &RepoEvent) -> anyhow::Result<()> {
        match &event.payload {
            EventPayload::PullRequest {
                action,
                pull_request,
            } => self.handle_pull_request(action, pull_request).await,
            EventPayload::Push { git_ref } => self.handle_push(git_ref).await,
            EventPayload::Other { event_type } => {
                debug!("Ignoring {} {}", event_type, event.id);
                Ok(())
            }
        }
    }

    async fn handle_pull_request(
        &mut self,
        action: &PullRequestAction,
        pr: &PullRequest,
    ) -> anyhow::Result<()> {
        match action {
            PullRequestAction::Opened => {
                self.tracker.on_opened(pr.clone());
                self.process_pull_request(pr).await?;
            }
            PullRequestAction::Synchronize => {
                self.process_pull_request(pr).await?;
            }
            PullRequestAction::Reopened => self.tracker.on_reopened(pr.clone()),
            PullRequestAction::Closed => {
                self.tracker.on_closed(pr);
            }
            PullRequestAction::Other(action) => {
                debug!("Skipping PR#{}: action {}", pr.number, action);
            }
        }
        Ok(())
    }

    async fn handle_push(&mut self, git_ref: &str) -> anyhow::Result<()> {
        let Some(branch) = git_ref.strip_prefix(BRANCH_REF_PREFIX) else {
            debug!("Ignoring push to {}", git_ref);
            return Ok(());
        };
        let Some(indexed) = self.tracker.lookup_by_head_branch(branch) else {
            debug!("No open PR for branch {}", branch);
            return Ok(());
        };

        // The indexed copy still points at the commit before the push
        let pr = self
            .client
            .fetch_pull_request(&self.repo.owner, &self.repo.name, indexed.number)
            .await?;
        self.process_pull_request(&pr).await?;
        Ok(())
    }

    /// Process explicitly requested pull requests, in order
    ///
    /// A failure on one PR is logged and does not stop the others.
    pub async fn process_numbers(&self, numbers: &[u64]) {
        for &number in numbers {
            let result = match self
                .client
                .fetch_pull_request(&self.repo.owner, &self.repo.name, number)
                .await
            {
                Ok(pr) => self.process_pull_request(&pr).await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                error!("Failed to process PR#{} of {}: {:#}", number, self.repo, err);
            }
        }
    }

    /// Run the label and commit status cycles for one pull request
    pub async fn process_pull_request(&self, pr: &PullRequest) -> anyhow::Result<CycleOutcome> {
        let Some(rules) = self.registry.rules_for(&pr.base_repository) else {
            info!("Got event for unexpected repo {}", pr.base_repository);
            return Ok(CycleOutcome::NotMonitored);
        };
        if rules.ignored_authors.contains(&pr.author) {
            info!("Ignoring PR#{} by {}", pr.number, pr.author);
            return Ok(CycleOutcome::IgnoredAuthor);
        }
        if rules.ignored_base_branches.contains(&pr.base_branch) {
            info!(
                "Ignoring PR#{} against base branch {}",
                pr.number, pr.base_branch
            );
            return Ok(CycleOutcome::IgnoredBaseBranch);
        }

        info!("Handling PR#{} \"{}\" {}", pr.number, pr.title, pr.html_url);
        let labels = self.apply_labels(pr, &rules).await?;
        let created_statuses = self.apply_statuses(pr, &rules).await?;

        Ok(CycleOutcome::Processed {
            labels,
            created_statuses,
        })
    }

    async fn apply_labels(&self, pr: &PullRequest, rules: &RuleConfig) -> anyhow::Result<LabelDelta> {
        let (owner, name) = (self.repo.owner.as_str(), self.repo.name.as_str());

        let changed_files: Vec<String> = if rules.file_pattern_labels.is_empty() {
            Vec::new()
        } else {
            self.client
                .fetch_changed_files(owner, name, pr.number)
                .await?
                .into_iter()
                .map(|file| file.path)
                .collect()
        };
        let current = self.client.fetch_labels(owner, name, pr.number).await?;

        let delta = decide(
            &pr.author,
            &changed_files,
            &pr.base_branch,
            &pr.head_branch,
            &current,
            rules,
        );
        if delta.is_empty() {
            debug!("Labels of PR#{} are up to date", pr.number);
            return Ok(delta);
        }

        match self.strategy {
            LabelStrategy::Granular => {
                for label in &delta.remove {
                    info!("Removing label {} from PR#{}", label, pr.number);
                    self.client.remove_label(owner, name, pr.number, label).await?;
                }
                if !delta.add.is_empty() {
                    let added: Vec<String> = delta.add.iter().cloned().collect();
                    info!("Adding labels [{}] to PR#{}", added.join(", "), pr.number);
                    self.client.add_labels(owner, name, pr.number, &added).await?;
                }
            }
            LabelStrategy::Replace => {
                let target: Vec<String> = delta.target(&current).into_iter().collect();
                info!("Setting labels of PR#{} to [{}]", pr.number, target.join(", "));
                self.client
                    .replace_labels(owner, name, pr.number, &target)
                    .await?;
            }
        }

        Ok(delta)
    }

    /// Create each configured status context missing on the head commit
    async fn apply_statuses(&self, pr: &PullRequest, rules: &RuleConfig) -> anyhow::Result<Vec<String>> {
        if rules.commit_status.is_empty() {
            return Ok(Vec::new());
        }
        let (owner, name) = (self.repo.owner.as_str(), self.repo.name.as_str());

        let existing = self
            .client
            .fetch_status_contexts(owner, name, &pr.head_sha)
            .await?;

        let mut created = Vec::new();
        for (context, description) in &rules.commit_status {
            if existing.contains(context) {
                info!("Skipping setting commit status {}, already set.", context);
                continue;
            }
            info!(
                "Setting commit status {} on PR#{} ({})",
                context, pr.number, pr.head_sha
            );
            self.client
                .create_status(
                    owner,
                    name,
                    &pr.head_sha,
                    StatusState::Pending,
                    context,
                    description,
                )
                .await?;
            created.push(context.clone());
        }

        Ok(created)
    }
}
