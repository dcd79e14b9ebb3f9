//! Single-payload mode
//!
//! Processes one `pull_request` webhook delivery instead of polling, either
//! the raw GitHub payload or the SNS notification wrapping it.

use crate::reconciler::{CycleOutcome, Reconciler};
use crate::tracker::PullRequestTracker;
use anyhow::Context;
use gh_client::{wire, GitHubClient, PullRequestAction};
use gh_pr_config::{LabelStrategy, Repository, RuleRegistry};
use log::info;
use serde_json::Value;
use std::sync::Arc;

/// Decode a delivery, unwrapping an SNS envelope if present
pub fn parse_delivery(body: &str) -> anyhow::Result<Value> {
    let value: Value = serde_json::from_str(body).context("Delivery is not valid JSON")?;

    match value.pointer("/Records/0/Sns/Message") {
        Some(Value::String(message)) => {
            serde_json::from_str(message).context("SNS message is not valid JSON")
        }
        Some(_) => anyhow::bail!("SNS message is not a string"),
        None => Ok(value),
    }
}

/// Run the label and status cycles for one delivery
///
/// Returns `None` when the delivery is not something the labeler acts on.
pub async fn handle_delivery(
    client: Arc<dyn GitHubClient>,
    registry: Arc<RuleRegistry>,
    strategy: LabelStrategy,
    body: &str,
) -> anyhow::Result<Option<CycleOutcome>> {
    let payload = parse_delivery(body)?;

    let Some((action, pr)) = wire::parse_pull_request_payload(payload)? else {
        info!("Delivery carries no pull request, skipping");
        return Ok(None);
    };
    if !matches!(
        action,
        PullRequestAction::Opened | PullRequestAction::Synchronize
    ) {
        info!("Skipping PR#{}: action {}", pr.number, action);
        return Ok(None);
    }

    let repo: Repository = pr
        .base_repository
        .parse()
        .with_context(|| format!("PR#{} has no usable base repository", pr.number))?;

    let reconciler = Reconciler::new(
        client,
        repo,
        registry,
        PullRequestTracker::new(),
        strategy,
    );
    Ok(Some(reconciler.process_pull_request(&pr).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Call, FakeClient};
    use gh_pr_config::AppConfig;
    use serde_json::json;

    fn payload(action: &str, author: &str) -> Value {
        json!({
            "action": action,
            "number": 12,
            "pull_request": {
                "number": 12,
                "title": "Speed up the ledger",
                "user": { "login": author },
                "head": { "ref": "perf/ledger", "sha": "c0ffee" },
                "base": { "ref": "main", "sha": "beef", "repo": { "full_name": "appfolio/landa" } },
                "labels": [],
                "html_url": "https://github.com/appfolio/landa/pull/12"
            }
        })
    }

    fn registry() -> Arc<RuleRegistry> {
        let config = AppConfig::from_toml(
            r#"
            [repos."appfolio/landa"]
            ignored_authors = ["bot"]
            head_branch_labels = { performance = "perf/*" }
            "#,
        )
        .unwrap();
        Arc::new(config.registry().unwrap())
    }

    #[test]
    fn test_parse_raw_delivery() {
        let raw = payload("opened", "alice").to_string();
        assert_eq!(parse_delivery(&raw).unwrap()["action"], "opened");
    }

    #[test]
    fn test_parse_sns_delivery() {
        let inner = payload("synchronize", "alice").to_string();
        let envelope = json!({ "Records": [ { "Sns": { "Message": inner } } ] }).to_string();

        let value = parse_delivery(&envelope).unwrap();
        assert_eq!(value["action"], "synchronize");
        assert_eq!(value["pull_request"]["number"], 12);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_delivery("not json").is_err());
    }

    #[tokio::test]
    async fn test_opened_delivery_is_labeled() {
        let fake = Arc::new(FakeClient::default());
        let body = payload("opened", "alice").to_string();

        let outcome = handle_delivery(fake.clone(), registry(), LabelStrategy::Granular, &body)
            .await
            .unwrap();

        assert!(matches!(outcome, Some(CycleOutcome::Processed { .. })));
        assert_eq!(
            fake.calls(),
            vec![Call::AddLabels {
                number: 12,
                labels: vec!["performance".to_string()]
            }]
        );
    }

    #[tokio::test]
    async fn test_other_actions_are_skipped() {
        let fake = Arc::new(FakeClient::default());
        let body = payload("closed", "alice").to_string();

        let outcome = handle_delivery(fake.clone(), registry(), LabelStrategy::Granular, &body)
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ignored_author_delivery() {
        let fake = Arc::new(FakeClient::default());
        let body = payload("opened", "bot").to_string();

        let outcome = handle_delivery(fake.clone(), registry(), LabelStrategy::Granular, &body)
            .await
            .unwrap();

        assert_eq!(outcome, Some(CycleOutcome::IgnoredAuthor));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_non_pull_request_delivery() {
        let fake = Arc::new(FakeClient::default());
        let body = json!({ "zen": "Keep it logically awesome." }).to_string();

        let outcome = handle_delivery(fake.clone(), registry(), LabelStrategy::Granular, &body)
            .await
            .unwrap();
        assert!(outcome.is_none());
    }
}
