use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::utils::{self, Profile};

/// Initialize tracing with a log file in the platform data directory.
///
/// Stdout belongs to the TUI, so diagnostics go to `sprig.log` instead. The
/// `SPRIG_LOG` environment variable overrides the default `info` filter.
/// Returns the log path, or None when no writable location exists — the
/// application keeps running without logs in that case.
pub fn init(profile: Profile) -> Option<PathBuf> {
    let dir = utils::get_data_dir(profile)?;
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("sprig.log");
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;

    let filter = EnvFilter::try_from_env("SPRIG_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();

    // try_init fails when a subscriber is already set (tests); not fatal
    result.ok().map(|_| path)
}
