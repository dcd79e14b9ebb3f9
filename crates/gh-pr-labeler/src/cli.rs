//! Command line interface

use clap::Parser;
use std::path::PathBuf;

/// Watch a GitHub repository and label its pull requests
#[derive(Debug, Parser)]
#[command(name = "gh-pr-labeler", version, about)]
pub struct Cli {
    /// Repository to monitor (owner/name); defaults to the config file's `repository`
    pub repository: Option<String>,

    /// Log intended label and status changes instead of making them
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Log level (critical, error, warning, info, debug)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Start from this event id (inclusive) instead of the current time
    #[arg(short, long, value_name = "ID")]
    pub start: Option<u64>,

    /// Process these pull requests and exit (repeatable, comma separated)
    #[arg(short, long = "pr", value_name = "N", value_delimiter = ',')]
    pub pull_requests: Vec<u64>,

    /// Process a single pull_request webhook payload and exit
    #[arg(long, value_name = "PATH", conflicts_with_all = ["start", "pull_requests"])]
    pub event_file: Option<PathBuf>,

    /// GitHub Enterprise host to talk to instead of github.com
    #[arg(long, value_name = "HOST", env = "GH_HOST")]
    pub host: Option<String>,

    /// Config file to use instead of the discovered one
    #[arg(short, long, value_name = "PATH", env = "GH_PR_LABELER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Requested pull request numbers, ascending and without duplicates
    pub fn pull_request_numbers(&self) -> Vec<u64> {
        let mut numbers = self.pull_requests.clone();
        numbers.sort_unstable();
        numbers.dedup();
        numbers
    }
}
