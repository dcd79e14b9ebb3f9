//! Application configuration
//!
//! Configuration loaded from the gh-pr-labeler TOML file:
//!
//! ```toml
//! repository = "appfolio/landa"
//! log_level = "info"
//! label_strategy = "granular"
//!
//! [default]
//! ignored_authors = ["dependabot[bot]"]
//!
//! [repos."appfolio/landa".file_pattern_labels]
//! db_review = "db/*"
//! ```

use crate::error::ConfigError;
use crate::rules::{RuleBlock, RuleRegistry};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// How a label delta is written back to GitHub
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelStrategy {
    /// One removal per dropped label, one addition call for new labels
    #[default]
    Granular,

    /// A single call replacing the whole label set
    Replace,
}

/// Application configuration loaded from the config file
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Repository to monitor when none is given on the command line
    #[serde(default)]
    pub repository: Option<String>,

    /// Log level name (e.g. "info", "WARNING")
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub label_strategy: LabelStrategy,

    /// Poll interval used until GitHub sends its own hint
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Rules shared by all repositories
    #[serde(default)]
    pub default: RuleBlock,

    /// Per-repository rules, keyed by `owner/name`
    #[serde(default)]
    pub repos: HashMap<String, RuleBlock>,
}

fn default_poll_interval_secs() -> u64 {
    60
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            repository: None,
            log_level: None,
            label_strategy: LabelStrategy::default(),
            poll_interval_secs: default_poll_interval_secs(),
            default: RuleBlock::default(),
            repos: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load config from `path`, or from the first config file found
    ///
    /// An explicitly given path must exist. Without one, a missing config
    /// file yields the default (empty) configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match crate::find_config_file() {
                Some(found) => found,
                None => {
                    log::debug!("No config file found, using default app config");
                    return Ok(Self::default());
                }
            },
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        log::info!("Loaded app config from {}", path.display());
        Ok(config)
    }

    /// Parse a config document
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Resolve and compile the rules of every configured repository
    pub fn registry(&self) -> Result<RuleRegistry, ConfigError> {
        RuleRegistry::new(&self.default, &self.repos)
    }
}
