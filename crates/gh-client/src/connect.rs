//! Host selection, token lookup and client construction
//!
//! Builds the client a labeling session talks to: an authenticated
//! `OctocrabClient` for github.com or a GitHub Enterprise host, optionally
//! wrapped in a `DryRunClient`.

use crate::{DryRunClient, GitHubClient, OctocrabClient, DEFAULT_HOST};
use anyhow::{Context, Result};
use log::{debug, info};
use octocrab::Octocrab;
use std::sync::Arc;

/// The GitHub instance a session talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitHubHost {
    name: String,
}

impl GitHubHost {
    /// `None` or an empty name selects github.com. A scheme or trailing
    /// slash given with the name is ignored.
    pub fn new(name: Option<&str>) -> Self {
        let name = name
            .map(|n| n.trim().trim_start_matches("https://").trim_end_matches('/'))
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_HOST);
        Self {
            name: name.to_ascii_lowercase(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_github_com(&self) -> bool {
        self.name == DEFAULT_HOST
    }

    /// REST root of an Enterprise host; github.com keeps octocrab's default
    pub fn api_base_uri(&self) -> Option<String> {
        (!self.is_github_com()).then(|| format!("https://{}/api/v3", self.name))
    }

    /// Per-host token variable, e.g. `GITHUB_TOKEN_GHE_EXAMPLE_COM`
    pub fn token_var(&self) -> String {
        format!(
            "GITHUB_TOKEN_{}",
            self.name.replace(['.', '-'], "_").to_uppercase()
        )
    }

    /// Find a token, first match wins:
    ///
    /// 1. the per-host variable ([`GitHubHost::token_var`])
    /// 2. `gh auth token --hostname <host>`
    /// 3. `GITHUB_TOKEN`, then `GH_TOKEN` (github.com only)
    pub async fn resolve_token(&self) -> Result<String> {
        let lookup = |key: &str| std::env::var(key).ok();

        if let Some(token) = self.host_token(lookup) {
            return Ok(token);
        }
        if let Some(token) = self.gh_cli_token().await? {
            return Ok(token);
        }
        if let Some(token) = self.generic_token(lookup) {
            return Ok(token);
        }

        Err(anyhow::anyhow!(
            "No token found for host '{}'. Set {} or run 'gh auth login --hostname {}'",
            self.name,
            self.token_var(),
            self.name
        ))
    }

    fn host_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        let key = self.token_var();
        let token = lookup(&key).filter(|t| !t.trim().is_empty())?;
        debug!("Using token from {} for {}", key, self.name);
        Some(token)
    }

    fn generic_token(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        if !self.is_github_com() {
            return None;
        }
        ["GITHUB_TOKEN", "GH_TOKEN"].into_iter().find_map(|key| {
            let token = lookup(key).filter(|t| !t.trim().is_empty())?;
            debug!("Using token from {}", key);
            Some(token)
        })
    }

    /// Ask the gh CLI; a missing or logged-out CLI is not an error
    async fn gh_cli_token(&self) -> Result<Option<String>> {
        let output = match tokio::process::Command::new("gh")
            .args(["auth", "token", "--hostname", &self.name])
            .output()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                debug!("Could not run 'gh auth token': {}", err);
                return Ok(None);
            }
        };
        if !output.status.success() {
            debug!("gh has no token for {}", self.name);
            return Ok(None);
        }

        let token = String::from_utf8(output.stdout)
            .context("Invalid UTF-8 in gh auth token output")?
            .trim()
            .to_string();
        if token.is_empty() {
            return Ok(None);
        }
        debug!("Using token from gh CLI for {}", self.name);
        Ok(Some(token))
    }
}

/// Build an authenticated client for `host`
///
/// With `dry_run` set, every mutating call is logged instead of sent.
pub async fn connect(host: &GitHubHost, dry_run: bool) -> Result<Arc<dyn GitHubClient>> {
    info!("Creating GitHub client for host: {}", host.name());

    let token = host.resolve_token().await?;

    let mut builder = Octocrab::builder().personal_token(token);
    if let Some(uri) = host.api_base_uri() {
        builder = builder
            .base_uri(uri.as_str())
            .with_context(|| format!("Failed to set base URI {}", uri))?;
    }

    let octocrab = builder.build().context("Failed to build Octocrab client")?;
    let client = OctocrabClient::new(Arc::new(octocrab));

    if dry_run {
        info!("Dry-run enabled: mutations will only be logged");
        Ok(Arc::new(DryRunClient::new(client)))
    } else {
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_host_uses_public_api() {
        for name in [None, Some(""), Some("github.com"), Some("https://GitHub.com/")] {
            let host = GitHubHost::new(name);
            assert!(host.is_github_com(), "{:?} should select github.com", name);
            assert_eq!(host.api_base_uri(), None);
        }
    }

    #[test]
    fn test_enterprise_host_gets_api_v3_root() {
        let host = GitHubHost::new(Some("https://ghe.example.com/"));
        assert_eq!(host.name(), "ghe.example.com");
        assert_eq!(
            host.api_base_uri().as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn test_token_var_names() {
        let hosts = [
            ("github.com", "GITHUB_TOKEN_GITHUB_COM"),
            ("ghe.example.com", "GITHUB_TOKEN_GHE_EXAMPLE_COM"),
            (
                "github-enterprise.corp.com",
                "GITHUB_TOKEN_GITHUB_ENTERPRISE_CORP_COM",
            ),
        ];

        for (name, expected) in hosts {
            assert_eq!(GitHubHost::new(Some(name)).token_var(), expected);
        }
    }

    #[test]
    fn test_host_token_ignores_blank_values() {
        let host = GitHubHost::new(Some("ghe.example.com"));
        assert_eq!(
            host.host_token(env(&[("GITHUB_TOKEN_GHE_EXAMPLE_COM", "ghe-secret")])),
            Some("ghe-secret".to_string())
        );
        assert_eq!(
            host.host_token(env(&[("GITHUB_TOKEN_GHE_EXAMPLE_COM", "  ")])),
            None
        );
    }

    #[test]
    fn test_generic_token_only_for_github_com() {
        let vars = env(&[("GH_TOKEN", "gh-secret")]);
        assert_eq!(
            GitHubHost::new(None).generic_token(&vars),
            Some("gh-secret".to_string())
        );
        assert_eq!(GitHubHost::new(Some("ghe.example.com")).generic_token(&vars), None);

        let both = env(&[("GITHUB_TOKEN", "first"), ("GH_TOKEN", "second")]);
        assert_eq!(
            GitHubHost::new(None).generic_token(both),
            Some("first".to_string())
        );
    }
}
