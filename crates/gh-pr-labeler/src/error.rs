//! Fatal errors of a labeling run and their exit codes

use gh_pr_config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LabelerError {
    /// No repository on the command line nor in the config file
    #[error("No repository specified")]
    NoRepository,

    #[error("Invalid log level '{0}'")]
    InvalidLogLevel(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The repository's open pull requests could not be listed at startup
    #[error("Unknown repository {repo}: {reason}")]
    UnknownRepository { repo: String, reason: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LabelerError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            LabelerError::NoRepository => 2,
            _ => 1,
        }
    }
}
