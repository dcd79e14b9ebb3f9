//! Logging setup
//!
//! Logs go to stderr as `timestamp level message`. An explicit level
//! overrides `RUST_LOG`; without either only errors are shown.

use env_logger::{Builder, Env};
use log::LevelFilter;

/// Initialize the global logger once, at startup
pub fn init(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("error"));
    if let Some(level) = level {
        builder.filter_level(level);
    }

    // A logger installed earlier (tests) stays in place
    let _ = builder
        .format_timestamp_secs()
        .format_target(false)
        .try_init();
}
