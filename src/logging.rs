//! Tracing setup.
//!
//! Text subcommands log to stderr. The TUI owns the terminal, so it only logs
//! when a log file is given.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::AppError;

const DEFAULT_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy)]
pub enum LogTarget<'a> {
    Stderr,
    File(&'a Path),
    Disabled,
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
pub fn init(target: LogTarget<'_>) -> Result<(), AppError> {
    // A subscriber may already be installed (tests, embedding); keep it.
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match target {
        LogTarget::Disabled => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter())
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| AppError::new(2, format!("Failed to open log file '{}': {e}", path.display())))?;
            tracing_subscriber::registry()
                .with(filter())
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
    };

    result.map_err(|e| AppError::new(4, format!("Failed to install logging: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_keeps_existing_subscriber() {
        init(LogTarget::Stderr).unwrap();
        assert!(tracing::dispatcher::has_been_set());
        init(LogTarget::Stderr).unwrap();
    }
}
