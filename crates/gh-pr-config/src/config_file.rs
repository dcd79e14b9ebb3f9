use crate::paths;
use std::path::PathBuf;

/// Find the config file to use
///
/// Searches in:
/// 1. Current working directory (`.gh-pr-labeler.toml`)
/// 2. Config directory (`~/.config/gh-pr-labeler/config.toml` on Linux)
/// 3. Home directory (`~/.gh-pr-labeler.toml`)
///
/// Returns the first path that exists, None otherwise.
pub fn find_config_file() -> Option<PathBuf> {
    let candidates = [
        paths::local_config_path().ok(),
        paths::app_config_path().ok(),
        paths::home_config_path(),
    ];

    candidates.into_iter().flatten().find(|path| {
        let exists = path.is_file();
        if !exists {
            log::trace!("No config at {}", path.display());
        }
        exists
    })
}
