//! gh-pr-labeler
//!
//! Watches a GitHub repository and labels its pull requests by author,
//! changed files and branches. Optionally creates pending commit statuses
//! for configured contexts.

mod cli;
mod error;
mod labels;
mod logger;
mod monitor;
mod poller;
mod reconciler;
mod settings;
#[cfg(test)]
mod test_support;
mod tracker;
mod webhook;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use cli::Cli;
use error::LabelerError;
use gh_pr_config::AppConfig;
use log::{error, info};
use poller::Cursor;
use reconciler::{CycleOutcome, Reconciler};
use settings::{Mode, Settings};
use std::process::ExitCode;
use std::sync::Arc;
use tracker::PullRequestTracker;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

async fn run(cli: Cli) -> Result<(), LabelerError> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, &config)?;

    logger::init(settings.log_level);
    info!("Logging enabled at level {}", log::max_level());

    let registry = Arc::new(config.registry()?);
    let client = gh_client::connect(&settings.host, settings.dry_run).await?;

    match settings.mode {
        Mode::EventFile(path) => {
            let body = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read event file {}", path.display()))?;
            let outcome =
                webhook::handle_delivery(client, registry, settings.label_strategy, &body).await?;
            if let Some(CycleOutcome::Processed {
                labels,
                created_statuses,
            }) = outcome
            {
                info!(
                    "Added {} and removed {} labels, created {} statuses",
                    labels.add.len(),
                    labels.remove.len(),
                    created_statuses.len()
                );
            }
        }
        Mode::PullRequests(numbers) => {
            let repo = settings.repository.ok_or(LabelerError::NoRepository)?;
            let reconciler = Reconciler::new(
                client,
                repo,
                registry,
                PullRequestTracker::new(),
                settings.label_strategy,
            );
            reconciler.process_numbers(&numbers).await;
        }
        Mode::Monitor { start_event_id } => {
            let repo = settings.repository.ok_or(LabelerError::NoRepository)?;
            let cursor = match start_event_id {
                Some(start_event_id) => Cursor::Resume { start_event_id },
                None => Cursor::Fresh { since: Utc::now() },
            };

            let mut session = monitor::start(
                client,
                repo,
                registry,
                settings.label_strategy,
                cursor,
                settings.poller,
            )
            .await?;
            session.run(interrupted()).await?;
        }
    }

    Ok(())
}

/// Completes on Ctrl-C
async fn interrupted() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => println!("shutting down. Goodbye!"),
        Err(err) => {
            error!("Unable to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
