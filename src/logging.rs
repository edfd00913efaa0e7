// Logging - tracing subscriber setup
//
// RUST_LOG takes precedence; otherwise the level is `info`, or `debug` with
// the debug toggle. Output goes to stderr unless a log file is configured.

use crate::config::LoggingConfig;
use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filter used when RUST_LOG is unset
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "pro_term=debug,info"
    } else {
        "info"
    }
}

/// Install the global subscriber
///
/// Returns false if a subscriber was already installed.
///
/// # Errors
/// Returns `ConfigError::Io` if the log file cannot be opened
pub fn init(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(config.debug)));

    let installed = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
                .is_ok()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!("logging initialized");
    }
    Ok(installed)
}
