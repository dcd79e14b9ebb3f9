//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab library.
//! This client makes real API calls; wrap it in `DryRunClient` to suppress
//! mutations.

use crate::client::GitHubClient;
use crate::error::TransportError;
use crate::types::{ChangedFile, EventsPage, PullRequest, StatusState};
use crate::wire;
use async_trait::async_trait;
use http::header::{HeaderMap, HeaderValue, ETAG, IF_NONE_MATCH, LINK};
use http::StatusCode;
use log::debug;
use octocrab::Octocrab;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

const EVENTS_PER_PAGE: u8 = 100;
const POLL_INTERVAL_HEADER: &str = "x-poll-interval";

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_events(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        etag: Option<&str>,
    ) -> anyhow::Result<EventsPage> {
        let route = format!(
            "/repos/{}/{}/events?per_page={}&page={}",
            owner, repo, EVENTS_PER_PAGE, page
        );
        debug!("Fetching events page {} for {}/{}", page, owner, repo);

        let mut headers = HeaderMap::new();
        if let Some(etag) = etag {
            headers.insert(IF_NONE_MATCH, HeaderValue::from_str(etag)?);
        }

        let response = self
            .octocrab
            ._get_with_headers(route.as_str(), Some(headers))
            .await
            .map_err(|e| classify_error(e, &route))?;

        let status = response.status();
        let poll_interval = response
            .headers()
            .get(POLL_INTERVAL_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        if status == StatusCode::NOT_MODIFIED {
            debug!("Events for {}/{} not modified", owner, repo);
            return Ok(EventsPage {
                etag: etag.map(str::to_string),
                poll_interval,
                not_modified: true,
                ..EventsPage::default()
            });
        }

        if status.is_server_error() {
            return Err(TransportError::Server {
                status: status.as_u16(),
                route,
            }
            .into());
        }

        if !status.is_success() {
            anyhow::bail!("GitHub answered {} for {}", status, route);
        }

        let new_etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let has_next = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|link| link.contains("rel=\"next\""));

        let body = self
            .octocrab
            .body_to_string(response)
            .await
            .map_err(|e| classify_error(e, &route))?;
        let events = wire::parse_events(&body)?;

        debug!(
            "Fetched {} events (page {}) for {}/{}",
            events.len(),
            page,
            owner,
            repo
        );

        Ok(EventsPage {
            events,
            etag: new_etag,
            poll_interval,
            next_page: has_next.then_some(page + 1),
            not_modified: false,
        })
    }

    async fn fetch_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        debug!("Fetching open PRs for {}/{}", owner, repo);

        let first_page = self
            .octocrab
            .pulls(owner, repo)
            .list()
            .state(octocrab::params::State::Open)
            .per_page(100)
            .send()
            .await?;
        let pulls = self.octocrab.all_pages(first_page).await?;

        let mut prs: Vec<PullRequest> = pulls.iter().map(convert_pull_request).collect();
        prs.sort_by_key(|pr| pr.number);

        debug!("Fetched {} open PRs for {}/{}", prs.len(), owner, repo);
        Ok(prs)
    }

    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR #{} for {}/{}", pr_number, owner, repo);
        let pr = self.octocrab.pulls(owner, repo).get(pr_number).await?;
        Ok(convert_pull_request(&pr))
    }

    async fn fetch_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>> {
        debug!("Fetching changed files of PR #{} for {}/{}", pr_number, owner, repo);
        let first_page = self.octocrab.pulls(owner, repo).list_files(pr_number).await?;
        let entries = self.octocrab.all_pages(first_page).await?;

        Ok(entries
            .into_iter()
            .map(|entry| ChangedFile {
                path: entry.filename,
            })
            .collect())
    }

    async fn fetch_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<BTreeSet<String>> {
        let first_page = self
            .octocrab
            .issues(owner, repo)
            .list_labels_for_issue(issue_number)
            .per_page(100)
            .send()
            .await?;
        let labels = self.octocrab.all_pages(first_page).await?;

        Ok(labels.into_iter().map(|label| label.name).collect())
    }

    async fn replace_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .replace_all_labels(issue_number, labels)
            .await?;
        Ok(())
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .add_labels(issue_number, labels)
            .await?;
        Ok(())
    }

    async fn remove_label(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        self.octocrab
            .issues(owner, repo)
            .remove_label(issue_number, label)
            .await?;
        Ok(())
    }

    async fn fetch_status_contexts(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<BTreeSet<String>> {
        debug!(
            "Fetching commit statuses for {}/{} @ {}",
            owner, repo, commit_sha
        );

        // Use raw GET request since octocrab's Reference type doesn't support commit SHAs
        let route = format!(
            "/repos/{}/{}/commits/{}/status?per_page=100",
            owner, repo, commit_sha
        );
        let status: octocrab::models::CombinedStatus =
            self.octocrab.get(route, None::<&()>).await?;

        Ok(status
            .statuses
            .into_iter()
            .filter_map(|s| s.context)
            .collect())
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
        self.octocrab
            .repos(owner, repo)
            .create_status(commit_sha.to_string(), convert_status_state(state))
            .context(context.to_string())
            .description(description.to_string())
            .send()
            .await?;
        Ok(())
    }
}

/// Sort octocrab errors into transient transport failures and everything else
fn classify_error(err: octocrab::Error, route: &str) -> anyhow::Error {
    match err {
        octocrab::Error::Hyper { source, .. } => {
            TransportError::Connection(source.to_string()).into()
        }
        octocrab::Error::Service { source, .. } => {
            TransportError::Connection(source.to_string()).into()
        }
        octocrab::Error::GitHub { source, .. } if source.status_code.is_server_error() => {
            TransportError::Server {
                status: source.status_code.as_u16(),
                route: route.to_string(),
            }
            .into()
        }
        other => anyhow::Error::new(other),
    }
}

/// Convert octocrab PullRequest to our PullRequest type
fn convert_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        head_sha: pr.head.sha.clone(),
        base_branch: pr.base.ref_field.clone(),
        head_branch: pr.head.ref_field.clone(),
        base_repository: pr
            .base
            .repo
            .as_ref()
            .and_then(|r| r.full_name.clone())
            .unwrap_or_default(),
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
    }
}

/// Convert our StatusState to octocrab's
fn convert_status_state(state: StatusState) -> octocrab::models::StatusState {
    match state {
        StatusState::Pending => octocrab::models::StatusState::Pending,
        StatusState::Success => octocrab::models::StatusState::Success,
        StatusState::Failure => octocrab::models::StatusState::Failure,
        StatusState::Error => octocrab::models::StatusState::Error,
    }
}
