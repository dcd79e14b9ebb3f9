//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can make a configuration unusable
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid repository: {0} (expected owner/name)")]
    InvalidRepository(String),

    #[error("Invalid glob pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        source: globset::Error,
    },

    #[error("Invalid regex pattern '{pattern}': {source}")]
    Regex {
        pattern: String,
        source: regex::Error,
    },
}
