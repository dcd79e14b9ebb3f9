//! Configuration for gh-pr-labeler
//!
//! This crate provides:
//! - Config file discovery and paths
//! - Application configuration (AppConfig)
//! - Layered labeling rules (RuleBlock -> RuleConfig) and the registry of
//!   monitored repositories
//! - Glob / regex patterns for file and branch rules

pub mod app_config;
pub mod config_file;
pub mod error;
pub mod paths;
pub mod pattern;
pub mod repository;
pub mod rules;

pub use app_config::{AppConfig, LabelStrategy};
pub use config_file::find_config_file;
pub use error::ConfigError;
pub use pattern::{OneOrMany, Pattern, PatternSpec};
pub use repository::Repository;
pub use rules::{RuleBlock, RuleConfig, RuleRegistry};
