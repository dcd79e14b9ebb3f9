//! In-memory GitHub client and fixtures for tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use gh_client::{
    ChangedFile, EventPayload, EventsPage, GitHubClient, PullRequest, PullRequestAction,
    RepoEvent, StatusState,
};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Mutex;

pub const REPO_FULL_NAME: &str = "appfolio/landa";

pub fn pull_request(number: u64, author: &str, head_branch: &str) -> PullRequest {
    PullRequest {
        number,
        title: format!("Test PR {}", number),
        author: author.to_string(),
        head_sha: format!("sha-{}", number),
        base_branch: "main".to_string(),
        head_branch: head_branch.to_string(),
        base_repository: REPO_FULL_NAME.to_string(),
        html_url: format!("https://github.com/{}/pull/{}", REPO_FULL_NAME, number),
    }
}

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap()
}

pub fn pr_event(id: u64, action: PullRequestAction, pr: PullRequest) -> RepoEvent {
    RepoEvent {
        id,
        created_at: at(id as i64),
        actor: pr.author.clone(),
        payload: EventPayload::PullRequest {
            action,
            pull_request: pr,
        },
    }
}

pub fn push_event(id: u64, branch: &str) -> RepoEvent {
    RepoEvent {
        id,
        created_at: at(id as i64),
        actor: "pusher".to_string(),
        payload: EventPayload::Push {
            git_ref: format!("refs/heads/{}", branch),
        },
    }
}

pub fn other_event(id: u64, event_type: &str) -> RepoEvent {
    RepoEvent {
        id,
        created_at: at(id as i64),
        actor: "someone".to_string(),
        payload: EventPayload::Other {
            event_type: event_type.to_string(),
        },
    }
}

/// A single-page response, events given newest first
pub fn page(events: Vec<RepoEvent>) -> EventsPage {
    EventsPage {
        events,
        ..EventsPage::default()
    }
}

/// A mutating call that reached the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    AddLabels { number: u64, labels: Vec<String> },
    RemoveLabel { number: u64, label: String },
    ReplaceLabels { number: u64, labels: Vec<String> },
    CreateStatus {
        sha: String,
        state: StatusState,
        context: String,
        description: String,
    },
}

#[derive(Default)]
struct FakeState {
    event_script: VecDeque<anyhow::Result<EventsPage>>,
    event_requests: Vec<(u32, Option<String>)>,
    open: Vec<PullRequest>,
    pulls: HashMap<u64, PullRequest>,
    files: HashMap<u64, Vec<String>>,
    labels: HashMap<u64, BTreeSet<String>>,
    statuses: HashMap<String, BTreeSet<String>>,
    calls: Vec<Call>,
    reads: usize,
    fail_listing: bool,
}

/// Mock client that serves scripted data and records every mutation
///
/// Mutations are applied to the in-memory state, so a second labeling pass
/// sees the labels and statuses the first one created.
#[derive(Default)]
pub struct FakeClient {
    state: Mutex<FakeState>,
}

impl FakeClient {
    /// Queue a response of the events feed; once the script runs out every
    /// fetch returns an empty page without an interval hint
    pub fn script_events(&self, page: EventsPage) {
        self.state.lock().unwrap().event_script.push_back(Ok(page));
    }

    pub fn script_event_error(&self, err: anyhow::Error) {
        self.state.lock().unwrap().event_script.push_back(Err(err));
    }

    pub fn add_open_pull_request(&self, pr: PullRequest) {
        let mut state = self.state.lock().unwrap();
        state.pulls.insert(pr.number, pr.clone());
        state.open.push(pr);
    }

    pub fn add_pull_request(&self, pr: PullRequest) {
        self.state.lock().unwrap().pulls.insert(pr.number, pr);
    }

    pub fn set_files(&self, number: u64, files: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(number, files.iter().map(|f| f.to_string()).collect());
    }

    pub fn set_labels(&self, number: u64, labels: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .labels
            .insert(number, labels.iter().map(|l| l.to_string()).collect());
    }

    pub fn set_statuses(&self, sha: &str, contexts: &[&str]) {
        self.state
            .lock()
            .unwrap()
            .statuses
            .insert(sha.to_string(), contexts.iter().map(|c| c.to_string()).collect());
    }

    pub fn fail_listing(&self) {
        self.state.lock().unwrap().fail_listing = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// `(page, etag)` of every events request, in order
    pub fn event_requests(&self) -> Vec<(u32, Option<String>)> {
        self.state.lock().unwrap().event_requests.clone()
    }

    pub fn labels_of(&self, number: u64) -> BTreeSet<String> {
        self.state
            .lock()
            .unwrap()
            .labels
            .get(&number)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of non-events read calls
    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }
}

#[async_trait]
impl GitHubClient for FakeClient {
    async fn fetch_events(
        &self,
        _owner: &str,
        _repo: &str,
        page: u32,
        etag: Option<&str>,
    ) -> anyhow::Result<EventsPage> {
        let mut state = self.state.lock().unwrap();
        state
            .event_requests
            .push((page, etag.map(str::to_string)));
        state
            .event_script
            .pop_front()
            .unwrap_or_else(|| Ok(EventsPage::default()))
    }

    async fn fetch_pull_requests(
        &self,
        _owner: &str,
        _repo: &str,
    ) -> anyhow::Result<Vec<PullRequest>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        if state.fail_listing {
            anyhow::bail!("Not Found");
        }
        Ok(state.open.clone())
    }

    async fn fetch_pull_request(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        state
            .pulls
            .get(&pr_number)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("PR #{} not found", pr_number))
    }

    async fn fetch_changed_files(
        &self,
        _owner: &str,
        _repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<Vec<ChangedFile>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        Ok(state
            .files
            .get(&pr_number)
            .into_iter()
            .flatten()
            .map(|path| ChangedFile { path: path.clone() })
            .collect())
    }

    async fn fetch_labels(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
    ) -> anyhow::Result<BTreeSet<String>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        Ok(state.labels.get(&issue_number).cloned().unwrap_or_default())
    }

    async fn replace_labels(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ReplaceLabels {
            number: issue_number,
            labels: labels.to_vec(),
        });
        state
            .labels
            .insert(issue_number, labels.iter().cloned().collect());
        Ok(())
    }

    async fn add_labels(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::AddLabels {
            number: issue_number,
            labels: labels.to_vec(),
        });
        state
            .labels
            .entry(issue_number)
            .or_default()
            .extend(labels.iter().cloned());
        Ok(())
    }

    async fn remove_label(
        &self,
        _owner: &str,
        _repo: &str,
        issue_number: u64,
        label: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::RemoveLabel {
            number: issue_number,
            label: label.to_string(),
        });
        if let Some(labels) = state.labels.get_mut(&issue_number) {
            labels.remove(label);
        }
        Ok(())
    }

    async fn fetch_status_contexts(
        &self,
        _owner: &str,
        _repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<BTreeSet<String>> {
        let mut state = self.state.lock().unwrap();
        state.reads += 1;
        Ok(state.statuses.get(commit_sha).cloned().unwrap_or_default())
    }

    async fn create_status(
        &self,
        _owner: &str,
        _repo: &str,
        commit_sha: &str,
        status: StatusState,
        context: &str,
        description: &str,
    ) -> anyhow::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateStatus {
            sha: commit_sha.to_string(),
            state: status,
            context: context.to_string(),
            description: description.to_string(),
        });
        state
            .statuses
            .entry(commit_sha.to_string())
            .or_default()
            .insert(context.to_string());
        Ok(())
    }
}
