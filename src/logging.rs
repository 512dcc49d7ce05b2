//! Structured logging to a file in the data directory.
//!
//! The terminal belongs to the UI while the app runs, so log lines go to
//! `<data_dir>/gymrat.log` instead of stdout.

use std::fs::{self, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open log file: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to install log subscriber: {0}")]
    Init(#[from] tracing_subscriber::util::TryInitError),
}

/// Builds the filter from a directive string, keeping HTTP client noise at warn.
pub fn build_filter(directive: &str) -> EnvFilter {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
    match "reqwest=warn".parse() {
        Ok(quiet) => filter.add_directive(quiet),
        Err(_) => filter,
    }
}

/// Installs the global subscriber. Appends to `path`, creating parents as needed.
pub fn init(path: &Path, directive: &str) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(Mutex::new(file));

    tracing_subscriber::registry()
        .with(build_filter(directive))
        .with(layer)
        .try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_directive_falls_back_to_default() {
        let filter = build_filter("gymrat=loud");
        assert!(filter.to_string().contains("info"));
        assert!(filter.to_string().contains("reqwest=warn"));
    }

    #[test]
    fn test_filter_keeps_requested_level() {
        let filter = build_filter("gymrat=debug");
        assert!(filter.to_string().contains("gymrat=debug"));
    }
}
