//! Label decision engine
//!
//! Computes which labels a pull request should carry from the resolved rules
//! of its repository, and the minimal delta against the labels it has now.
//! Pure: no I/O, the caller applies the delta.

use gh_pr_config::RuleConfig;
use std::collections::{BTreeMap, BTreeSet};

/// Labels to add and remove to reach the target label set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelDelta {
    pub add: BTreeSet<String>,
    pub remove: BTreeSet<String>,
}

impl LabelDelta {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    /// The label set after applying this delta to `current`
    pub fn target(&self, current: &BTreeSet<String>) -> BTreeSet<String> {
        current
            .difference(&self.remove)
            .chain(self.add.iter())
            .cloned()
            .collect()
    }
}

/// Evaluate every rule stage for a pull request
///
/// Returns each label mentioned by any stage with its verdict. A label is
/// wanted if any stage wants it:
///
/// 1. author-team labels: the author is a member of the label's team
/// 2. file-pattern labels: a pattern matches at least one changed file
/// 3. base-branch labels: the base branch matches the label's pattern
/// 4. head-branch labels: the head branch matches the label's pattern
pub fn wanted_labels(
    author: &str,
    changed_files: &[String],
    base_branch: &str,
    head_branch: &str,
    rules: &RuleConfig,
) -> BTreeMap<String, bool> {
    let mut wanted: BTreeMap<String, bool> = BTreeMap::new();
    let mut vote = |label: &String, yes: bool| {
        *wanted.entry(label.clone()).or_insert(false) |= yes;
    };

    for (label, authors) in &rules.author_team_labels {
        vote(label, authors.contains(author));
    }

    for (label, patterns) in &rules.file_pattern_labels {
        let hit = patterns
            .iter()
            .any(|pattern| changed_files.iter().any(|path| pattern.is_match(path)));
        vote(label, hit);
    }

    for (label, pattern) in &rules.base_branch_labels {
        vote(label, pattern.is_match(base_branch));
    }

    for (label, pattern) in &rules.head_branch_labels {
        vote(label, pattern.is_match(head_branch));
    }

    wanted
}

/// Decide which labels to add and remove
///
/// The target label set is exactly the set of wanted labels: wanted labels
/// missing from the PR are added, every other current label is removed,
/// including labels no rule mentions. Deciding again after applying the
/// delta yields an empty delta.
pub fn decide(
    author: &str,
    changed_files: &[String],
    base_branch: &str,
    head_branch: &str,
    current_labels: &BTreeSet<String>,
    rules: &RuleConfig,
) -> LabelDelta {
    let target: BTreeSet<String> =
        wanted_labels(author, changed_files, base_branch, head_branch, rules)
            .into_iter()
            .filter_map(|(label, want)| want.then_some(label))
            .collect();

    LabelDelta {
        add: target.difference(current_labels).cloned().collect(),
        remove: current_labels.difference(&target).cloned().collect(),
    }
}
