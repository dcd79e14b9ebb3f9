//! Configuration file locations
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/gh-pr-labeler/config.toml`
//! - macOS: `~/Library/Application Support/gh-pr-labeler/config.toml`
//! - Windows: `%APPDATA%\gh-pr-labeler\config.toml`

use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_NAME: &str = "gh-pr-labeler";

/// Name of the config file looked up in the working and home directories
pub const LOCAL_CONFIG_FILE: &str = ".gh-pr-labeler.toml";

/// Get the application config directory
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get path to app config file in the config directory
pub fn app_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get path to the config file in the current working directory
pub fn local_config_path() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(LOCAL_CONFIG_FILE))
}

/// Get path to the config file in the home directory
pub fn home_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LOCAL_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_path() {
        if let Ok(path) = app_config_path() {
            assert!(path.ends_with("gh-pr-labeler/config.toml"));
        }
    }

    #[test]
    fn test_local_config_path() {
        let local = local_config_path().unwrap();
        assert!(local.ends_with(LOCAL_CONFIG_FILE));
    }
}
