//! Monitoring session
//!
//! One session watches one repository: it indexes the open pull requests,
//! then feeds every new event to the reconciler, strictly one after another,
//! until the shutdown signal fires.

use crate::error::LabelerError;
use crate::poller::{Cursor, EventPoller, PollerSettings};
use crate::reconciler::Reconciler;
use crate::tracker::PullRequestTracker;
use gh_client::GitHubClient;
use gh_pr_config::{LabelStrategy, Repository, RuleRegistry};
use log::{error, info, warn};
use std::future::Future;
use std::sync::Arc;

pub struct Session {
    repo: Repository,
    poller: EventPoller,
    reconciler: Reconciler,
}

/// Prepare a session for `repo`
///
/// Fails with [`LabelerError::UnknownRepository`] when the open pull requests
/// of the repository cannot be listed.
pub async fn start(
    client: Arc<dyn GitHubClient>,
    repo: Repository,
    registry: Arc<RuleRegistry>,
    strategy: LabelStrategy,
    cursor: Cursor,
    settings: PollerSettings,
) -> Result<Session, LabelerError> {
    if !registry.is_monitored(&repo.full_name()) {
        warn!("No rules configured for {}, nothing will be labeled", repo);
    }

    let tracker = PullRequestTracker::load(client.as_ref(), &repo)
        .await
        .map_err(|err| LabelerError::UnknownRepository {
            repo: repo.full_name(),
            reason: format!("{:#}", err),
        })?;
    if tracker.is_empty() {
        info!("No open PRs in {}", repo);
    }

    let poller = EventPoller::new(client.clone(), repo.clone(), cursor, settings);
    let reconciler = Reconciler::new(client, repo.clone(), registry, tracker, strategy);

    Ok(Session {
        repo,
        poller,
        reconciler,
    })
}

impl Session {
    /// Process events until `shutdown` completes
    ///
    /// Shutdown is only observed between batches: every event of a fetched
    /// batch is handled before the session stops, so the high-water mark
    /// printed on exit never skips an unhandled event. A failure handling one
    /// event is logged and the session moves on; a permanent failure of the
    /// events feed ends it.
    pub async fn run(&mut self, shutdown: impl Future<Output = ()>) -> Result<(), LabelerError> {
        tokio::pin!(shutdown);
        info!("Monitoring {}", self.repo);

        loop {
            let event = match self.poller.next_buffered() {
                Some(event) => event,
                None => {
                    let next = tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!("Stopping monitor of {}", self.repo);
                            break;
                        }
                        next = self.poller.next_event() => next,
                    };
                    match next? {
                        Some(event) => event,
                        None => break,
                    }
                }
            };
            if let Err(err) = self.reconciler.handle(&event).await {
                error!("Failed to handle event {}: {:#}", event.id, err);
            }
        }

        self.poller.stop();
        if let Some(mark) = self.poller.high_water_mark() {
            info!("Last event seen: {} (resume with --start {})", mark, mark + 1);
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    #[cfg(test)]
    pub fn high_water_mark(&self) -> Option<u64> {
        self.poller.high_water_mark()
    }
}
