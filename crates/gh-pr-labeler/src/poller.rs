//! Repository events poller
//!
//! Turns the paginated, newest-first events feed into an ordered stream of
//! pull request and push events. Each poll walks the feed until it reaches
//! an event it has already seen, then hands out the new events oldest first.
//!
//! The cursor (high-water mark, cache token, poll interval) only moves after
//! a poll succeeded as a whole, so a failed fetch is simply repeated.

use chrono::{DateTime, Utc};
use gh_client::{is_transient, GitHubClient, RepoEvent};
use gh_pr_config::Repository;
use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Where a session starts reading the events feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    /// Emit events with an id of `start_event_id` or higher
    Resume { start_event_id: u64 },
    /// Emit events created at or after `since`
    Fresh { since: DateTime<Utc> },
}

#[derive(Debug, Clone, Copy)]
pub struct PollerSettings {
    /// Delay between polls until GitHub sends an `X-Poll-Interval` hint
    pub default_interval: Duration,
    /// Delay before retrying a poll that failed with a transport error
    pub retry_backoff: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_secs(60),
            retry_backoff: Duration::from_secs(1),
        }
    }
}

pub struct EventPoller {
    client: Arc<dyn GitHubClient>,
    repo: Repository,
    /// Highest event id walked so far
    high_water: Option<u64>,
    /// Session start time in fresh mode
    since: Option<DateTime<Utc>>,
    etag: Option<String>,
    interval: Duration,
    retry_backoff: Duration,
    pending: VecDeque<RepoEvent>,
    /// Delay before the next fetch; `None` before the first one
    next_delay: Option<Duration>,
    stopped: bool,
}

impl EventPoller {
    pub fn new(
        client: Arc<dyn GitHubClient>,
        repo: Repository,
        cursor: Cursor,
        settings: PollerSettings,
    ) -> Self {
        let (high_water, since) = match cursor {
            Cursor::Resume { start_event_id } => (Some(start_event_id.saturating_sub(1)), None),
            Cursor::Fresh { since } => (None, Some(since)),
        };

        Self {
            client,
            repo,
            high_water,
            since,
            etag: None,
            interval: settings.default_interval,
            retry_backoff: settings.retry_backoff,
            pending: VecDeque::new(),
            next_delay: None,
            stopped: false,
        }
    }

    /// Next relevant event, polling (and sleeping) as long as necessary
    ///
    /// Transport errors are retried forever after a short backoff. Any other
    /// fetch error is returned; the cursor is left untouched so the caller
    /// may call again. Returns `None` once the poller has been stopped.
    pub async fn next_event(&mut self) -> anyhow::Result<Option<RepoEvent>> {
        loop {
            if self.stopped {
                return Ok(None);
            }
            if let Some(event) = self.pending.pop_front() {
                return Ok(Some(event));
            }

            if let Some(delay) = self.next_delay.take() {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            match self.poll_once().await {
                Ok(batch) => {
                    self.pending.extend(batch);
                    self.next_delay = Some(self.interval);
                }
                Err(err) if is_transient(&err) => {
                    warn!(
                        "Fetching events of {} failed, retrying in {:?}: {:#}",
                        self.repo, self.retry_backoff, err
                    );
                    self.next_delay = Some(self.retry_backoff);
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Next event of the last fetched batch, without polling
    pub fn next_buffered(&mut self) -> Option<RepoEvent> {
        if self.stopped {
            return None;
        }
        self.pending.pop_front()
    }

    /// End the event sequence; pending events are dropped
    pub fn stop(&mut self) {
        self.stopped = true;
        self.pending.clear();
    }

    pub fn high_water_mark(&self) -> Option<u64> {
        self.high_water
    }

    /// Current delay between polls
    #[cfg(test)]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn is_seen(&self, event: &RepoEvent) -> bool {
        self.high_water.is_some_and(|mark| event.id <= mark)
            || self.since.is_some_and(|since| event.created_at < since)
    }

    /// Fetch every new event, returned oldest first
    async fn poll_once(&mut self) -> anyhow::Result<Vec<RepoEvent>> {
        let mut page = 1;
        let mut newest: Option<u64> = None;
        let mut etag = None;
        let mut interval = None;
        let mut retained = Vec::new();

        loop {
            let sent_etag = if page == 1 { self.etag.as_deref() } else { None };
            let response = self
                .client
                .fetch_events(&self.repo.owner, &self.repo.name, page, sent_etag)
                .await?;

            if page == 1 {
                etag = response.etag.clone();
                interval = response.poll_interval;
                if response.not_modified {
                    debug!("No new events for {}", self.repo);
                    break;
                }
            }

            let mut reached_seen = false;
            for event in response.events {
                if self.is_seen(&event) {
                    reached_seen = true;
                    break;
                }
                debug!(
                    "EVENT {} {} {} by {}",
                    event.id,
                    event.created_at,
                    event.event_type(),
                    event.actor
                );
                newest = Some(newest.map_or(event.id, |id| id.max(event.id)));
                if event.is_tracked() {
                    retained.push(event);
                }
            }

            match response.next_page {
                Some(next) if !reached_seen => page = next,
                _ => break,
            }
        }

        if etag.is_some() {
            self.etag = etag;
        }
        if let Some(interval) = interval {
            self.interval = interval;
        }
        if let Some(newest) = newest {
            self.high_water = Some(self.high_water.map_or(newest, |mark| mark.max(newest)));
        }

        retained.reverse();
        Ok(retained)
    }
}
