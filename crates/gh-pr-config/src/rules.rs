//! Layered labeling rules
//!
//! Rules come in blocks: one block per repository plus one default block.
//! Every key of a block is optional. Resolving a repository picks each key
//! from the most specific layer that defines it:
//!
//! 1. the repository's own block
//! 2. the default block
//! 3. an empty value
//!
//! Resolution happens once per repository when the registry is built; the
//! resulting [`RuleConfig`] snapshots are immutable.

use crate::error::ConfigError;
use crate::pattern::{OneOrMany, Pattern, PatternSpec};
use log::warn;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// One layer of rules as written in the config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RuleBlock {
    /// PRs from these users are ignored
    #[serde(default, alias = "ignore_login")]
    pub ignored_authors: Option<BTreeSet<String>>,

    /// PRs targeting these branches are ignored
    #[serde(default, alias = "ignore_base_branch")]
    pub ignored_base_branches: Option<BTreeSet<String>>,

    /// label -> authors whose PRs get the label
    #[serde(default, alias = "team_labels")]
    pub author_team_labels: Option<BTreeMap<String, BTreeSet<String>>>,

    /// label -> patterns of changed files that trigger the label
    #[serde(default)]
    pub file_pattern_labels: Option<BTreeMap<String, OneOrMany<PatternSpec>>>,

    /// label -> pattern of the base branch
    #[serde(default)]
    pub base_branch_labels: Option<BTreeMap<String, PatternSpec>>,

    /// label -> pattern of the head branch
    #[serde(default)]
    pub head_branch_labels: Option<BTreeMap<String, PatternSpec>>,

    /// status context -> description of the pending status to create
    #[serde(default, alias = "commit_status_contexts")]
    pub commit_status: Option<BTreeMap<String, String>>,
}

/// Resolved, compiled rules for one repository
#[derive(Debug, Clone, Default)]
pub struct RuleConfig {
    pub ignored_authors: BTreeSet<String>,
    pub ignored_base_branches: BTreeSet<String>,
    pub author_team_labels: BTreeMap<String, BTreeSet<String>>,
    pub file_pattern_labels: BTreeMap<String, Vec<Pattern>>,
    pub base_branch_labels: BTreeMap<String, Pattern>,
    pub head_branch_labels: BTreeMap<String, Pattern>,
    pub commit_status: BTreeMap<String, String>,
}

/// First layer defining the key wins
fn pick<'a, T>(repo: &'a Option<T>, default: &'a Option<T>) -> Option<&'a T> {
    repo.as_ref().or(default.as_ref())
}

fn compile_map(
    specs: Option<&BTreeMap<String, PatternSpec>>,
) -> Result<BTreeMap<String, Pattern>, ConfigError> {
    specs
        .into_iter()
        .flatten()
        .map(|(label, spec)| Ok((label.clone(), Pattern::try_from(spec)?)))
        .collect()
}

impl RuleConfig {
    /// Resolve a repository block against the default block
    pub fn resolve(repo: &RuleBlock, default: &RuleBlock) -> Result<Self, ConfigError> {
        let file_pattern_labels: BTreeMap<String, Vec<Pattern>> =
            pick(&repo.file_pattern_labels, &default.file_pattern_labels)
                .into_iter()
                .flatten()
                .map(|(label, specs)| {
                    let patterns = specs
                        .clone()
                        .into_vec()
                        .iter()
                        .map(Pattern::try_from)
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok((label.clone(), patterns))
                })
                .collect::<Result<_, ConfigError>>()?;

        Ok(Self {
            ignored_authors: pick(&repo.ignored_authors, &default.ignored_authors)
                .cloned()
                .unwrap_or_default(),
            ignored_base_branches: pick(
                &repo.ignored_base_branches,
                &default.ignored_base_branches,
            )
            .cloned()
            .unwrap_or_default(),
            author_team_labels: pick(&repo.author_team_labels, &default.author_team_labels)
                .cloned()
                .unwrap_or_default(),
            file_pattern_labels,
            base_branch_labels: compile_map(pick(
                &repo.base_branch_labels,
                &default.base_branch_labels,
            ))?,
            head_branch_labels: compile_map(pick(
                &repo.head_branch_labels,
                &default.head_branch_labels,
            ))?,
            commit_status: pick(&repo.commit_status, &default.commit_status)
                .cloned()
                .unwrap_or_default(),
        })
    }
}

/// Monitored repositories and their resolved rules
///
/// Repository names are compared case-insensitively: they are lower-cased
/// once when the registry is built and once per lookup.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<RuleConfig>>,
}

impl RuleRegistry {
    /// Build the registry, resolving and compiling every repository's rules
    pub fn new(
        default: &RuleBlock,
        repos: &HashMap<String, RuleBlock>,
    ) -> Result<Self, ConfigError> {
        let mut rules = HashMap::with_capacity(repos.len());

        for (name, block) in repos {
            let key = name.to_lowercase();
            let resolved = Arc::new(RuleConfig::resolve(block, default)?);
            if rules.insert(key, resolved).is_some() {
                warn!("Repository {} is configured more than once", name);
            }
        }

        Ok(Self { rules })
    }

    /// Rules for `full_name` (`owner/name`), or `None` if it is not monitored
    pub fn rules_for(&self, full_name: &str) -> Option<Arc<RuleConfig>> {
        self.rules.get(&full_name.to_lowercase()).cloned()
    }

    pub fn is_monitored(&self, full_name: &str) -> bool {
        self.rules.contains_key(&full_name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
