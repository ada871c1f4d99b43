//! Tracing subscriber setup.

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// Pick the log filter: `--quiet` wins, then `--verbose`, then `RUST_LOG`.
pub fn env_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Log to stderr.
pub fn init(verbose: bool, quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet))
        .with_writer(std::io::stderr)
        .init();
}

/// Default log file for the dashboard.
pub fn log_file_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("spinrig")
        .join("dashboard.log")
}

/// Log to a file so output does not corrupt the terminal UI.
///
/// Returns the path written to.
pub fn init_file(verbose: bool, quiet: bool) -> Result<PathBuf> {
    let path = log_file_path();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, quiet))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_overrides_verbose() {
        use tracing_subscriber::filter::LevelFilter;

        assert_eq!(env_filter(true, true).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(env_filter(true, false).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_log_file_path() {
        assert!(log_file_path().ends_with("spinrig/dashboard.log"));
    }
}
