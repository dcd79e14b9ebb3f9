//! Run settings resolved from the command line and the config file

use crate::cli::Cli;
use crate::error::LabelerError;
use crate::poller::PollerSettings;
use gh_client::GitHubHost;
use gh_pr_config::{AppConfig, LabelStrategy, Repository};
use log::LevelFilter;
use std::path::PathBuf;
use std::time::Duration;

/// What to do in this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Poll the events feed until interrupted
    Monitor { start_event_id: Option<u64> },
    /// Process the given pull requests once
    PullRequests(Vec<u64>),
    /// Process one webhook payload read from a file
    EventFile(PathBuf),
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// Monitored repository; optional only in event-file mode
    pub repository: Option<Repository>,
    pub host: GitHubHost,
    /// Explicit level; `None` leaves the choice to `RUST_LOG`
    pub log_level: Option<LevelFilter>,
    pub dry_run: bool,
    pub label_strategy: LabelStrategy,
    pub poller: PollerSettings,
    pub mode: Mode,
}

/// Map a level name onto a filter
///
/// Accepts the `log` crate names plus `critical`, `warning` and `notset`.
pub fn parse_log_level(name: &str) -> Result<LevelFilter, LabelerError> {
    match name.trim().to_lowercase().as_str() {
        "critical" | "error" => Ok(LevelFilter::Error),
        "warning" | "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "notset" | "off" => Ok(LevelFilter::Off),
        _ => Err(LabelerError::InvalidLogLevel(name.to_string())),
    }
}

impl Settings {
    pub fn resolve(cli: &Cli, config: &AppConfig) -> Result<Self, LabelerError> {
        let log_level = if cli.debug {
            Some(LevelFilter::Debug)
        } else {
            cli.log_level
                .as_deref()
                .or(config.log_level.as_deref())
                .map(parse_log_level)
                .transpose()?
        };

        let repository = cli
            .repository
            .as_deref()
            .or(config.repository.as_deref())
            .map(str::parse::<Repository>)
            .transpose()?;

        let mode = if let Some(path) = &cli.event_file {
            Mode::EventFile(path.clone())
        } else if !cli.pull_requests.is_empty() {
            Mode::PullRequests(cli.pull_request_numbers())
        } else {
            Mode::Monitor {
                start_event_id: cli.start,
            }
        };

        if repository.is_none() && !matches!(mode, Mode::EventFile(_)) {
            return Err(LabelerError::NoRepository);
        }

        Ok(Self {
            repository,
            host: GitHubHost::new(cli.host.as_deref()),
            log_level,
            dry_run: cli.debug,
            label_strategy: config.label_strategy,
            poller: PollerSettings {
                default_interval: Duration::from_secs(config.poll_interval_secs),
                ..PollerSettings::default()
            },
            mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("gh-pr-labeler").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_parse_log_level_names() {
        assert_eq!(parse_log_level("CRITICAL").unwrap(), LevelFilter::Error);
        assert_eq!(parse_log_level("Warning").unwrap(), LevelFilter::Warn);
        assert_eq!(parse_log_level("debug").unwrap(), LevelFilter::Debug);
        assert_eq!(parse_log_level("NOTSET").unwrap(), LevelFilter::Off);
        assert!(matches!(
            parse_log_level("loud"),
            Err(LabelerError::InvalidLogLevel(_))
        ));
    }

    #[test]
    fn test_debug_flag_wins_over_log_level() {
        let config = AppConfig {
            log_level: Some("error".into()),
            ..AppConfig::default()
        };
        let settings =
            Settings::resolve(&cli(&["-D", "--log-level", "info", "o/r"]), &config).unwrap();

        assert_eq!(settings.log_level, Some(LevelFilter::Debug));
        assert!(settings.dry_run);
    }

    #[test]
    fn test_cli_level_wins_over_config() {
        let config = AppConfig {
            log_level: Some("error".into()),
            ..AppConfig::default()
        };
        let settings = Settings::resolve(&cli(&["--log-level", "info", "o/r"]), &config).unwrap();
        assert_eq!(settings.log_level, Some(LevelFilter::Info));

        let settings = Settings::resolve(&cli(&["o/r"]), &config).unwrap();
        assert_eq!(settings.log_level, Some(LevelFilter::Error));

        let settings = Settings::resolve(&cli(&["o/r"]), &AppConfig::default()).unwrap();
        assert_eq!(settings.log_level, None);
    }

    #[test]
    fn test_invalid_level_is_fatal() {
        let err = Settings::resolve(&cli(&["--log-level", "loud", "o/r"]), &AppConfig::default())
            .unwrap_err();
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_missing_repository() {
        let err = Settings::resolve(&cli(&[]), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, LabelerError::NoRepository));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_repository_falls_back_to_config() {
        let config = AppConfig {
            repository: Some("appfolio/landa".into()),
            poll_interval_secs: 30,
            ..AppConfig::default()
        };
        let settings = Settings::resolve(&cli(&[]), &config).unwrap();

        assert_eq!(settings.repository, Some(Repository::new("appfolio", "landa")));
        assert_eq!(settings.poller.default_interval, Duration::from_secs(30));
        assert_eq!(settings.poller.retry_backoff, Duration::from_secs(1));
    }

    #[test]
    fn test_enterprise_host_reaches_api_v3() {
        let settings = Settings::resolve(
            &cli(&["--host", "ghe.example.com", "o/r"]),
            &AppConfig::default(),
        )
        .unwrap();

        assert_eq!(settings.host.name(), "ghe.example.com");
        assert_eq!(
            settings.host.api_base_uri().as_deref(),
            Some("https://ghe.example.com/api/v3")
        );
    }

    #[test]
    fn test_invalid_repository_is_fatal() {
        let err = Settings::resolve(&cli(&["landa"]), &AppConfig::default()).unwrap_err();
        assert!(matches!(err, LabelerError::Config(_)));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_modes() {
        let config = AppConfig::default();

        let settings = Settings::resolve(&cli(&["-s", "42", "o/r"]), &config).unwrap();
        assert_eq!(
            settings.mode,
            Mode::Monitor {
                start_event_id: Some(42)
            }
        );

        let settings = Settings::resolve(&cli(&["-p", "5,2", "o/r"]), &config).unwrap();
        assert_eq!(settings.mode, Mode::PullRequests(vec![2, 5]));

        // No repository needed: it comes from the payload
        let settings = Settings::resolve(&cli(&["--event-file", "e.json"]), &config).unwrap();
        assert_eq!(settings.mode, Mode::EventFile(PathBuf::from("e.json")));
    }
}
