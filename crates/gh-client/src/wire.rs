//! Wire format of the events feed and of `pull_request` payloads
//!
//! The events feed and webhook deliveries share the same pull request
//! representation, so both are decoded here into the types of [`crate::types`].

use crate::types::{EventPayload, PullRequest, PullRequestAction, RepoEvent};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::warn;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WireEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    actor: WireUser,
    created_at: DateTime<Utc>,
    #[serde(default)]
    payload: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct WireUser {
    login: String,
}

#[derive(Debug, Deserialize)]
struct WireRepository {
    #[serde(default)]
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireBranch {
    #[serde(rename = "ref")]
    git_ref: String,
    sha: String,
    repo: Option<WireRepository>,
}

#[derive(Debug, Deserialize)]
struct WirePullRequest {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    user: Option<WireUser>,
    head: WireBranch,
    base: WireBranch,
    #[serde(default)]
    html_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WirePullRequestPayload {
    action: Option<String>,
    pull_request: Option<WirePullRequest>,
}

#[derive(Debug, Deserialize)]
struct WirePushPayload {
    #[serde(rename = "ref")]
    git_ref: String,
}

impl From<WirePullRequest> for PullRequest {
    fn from(pr: WirePullRequest) -> Self {
        PullRequest {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            author: pr
                .user
                .map(|u| u.login)
                .unwrap_or_else(|| "unknown".to_string()),
            head_sha: pr.head.sha,
            base_branch: pr.base.git_ref,
            head_branch: pr.head.git_ref,
            base_repository: pr
                .base
                .repo
                .and_then(|r| r.full_name)
                .unwrap_or_default(),
            html_url: pr.html_url.unwrap_or_default(),
        }
    }
}

/// Decode one page of `GET /repos/{owner}/{repo}/events`
///
/// Only a page that is not a JSON array fails. Entries are decoded one by
/// one: an entry without a usable id or timestamp is dropped, and an entry
/// whose payload cannot be decoded is kept as [`EventPayload::Other`] so the
/// feed can still be walked past it.
pub fn parse_events(body: &str) -> Result<Vec<RepoEvent>> {
    let raw: Vec<serde_json::Value> =
        serde_json::from_str(body).context("Failed to decode events feed")?;
    Ok(raw.into_iter().filter_map(decode_event).collect())
}

fn decode_event(value: serde_json::Value) -> Option<RepoEvent> {
    let event: WireEvent = match serde_json::from_value(value) {
        Ok(event) => event,
        Err(err) => {
            warn!("Dropping undecodable feed entry: {}", err);
            return None;
        }
    };
    let Ok(id) = event.id.parse::<u64>() else {
        warn!("Dropping feed entry with invalid id '{}'", event.id);
        return None;
    };

    let payload = match decode_payload(&event.event_type, event.payload) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(
                "Event {} ({}) has an undecodable payload, ignoring it: {:#}",
                id, event.event_type, err
            );
            EventPayload::Other {
                event_type: event.event_type,
            }
        }
    };

    Some(RepoEvent {
        id,
        created_at: event.created_at,
        actor: event.actor.login,
        payload,
    })
}

fn decode_payload(event_type: &str, payload: serde_json::Value) -> Result<EventPayload> {
    let other = || EventPayload::Other {
        event_type: event_type.to_string(),
    };
    Ok(match event_type {
        "PullRequestEvent" => match parse_pull_request_payload(payload)? {
            Some((action, pull_request)) => EventPayload::PullRequest {
                action,
                pull_request,
            },
            None => other(),
        },
        "PushEvent" => {
            let push: WirePushPayload =
                serde_json::from_value(payload).context("Failed to decode push payload")?;
            EventPayload::Push {
                git_ref: push.git_ref,
            }
        }
        _ => other(),
    })
}

/// Decode a `pull_request` payload (events feed entry or webhook body)
///
/// Returns `None` when the payload carries no pull request at all.
pub fn parse_pull_request_payload(
    payload: serde_json::Value,
) -> Result<Option<(PullRequestAction, PullRequest)>> {
    let payload: WirePullRequestPayload =
        serde_json::from_value(payload).context("Failed to decode pull request payload")?;

    Ok(payload.pull_request.map(|pr| {
        let action = PullRequestAction::parse(payload.action.as_deref().unwrap_or_default());
        (action, pr.into())
    }))
}
