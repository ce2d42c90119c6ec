//! Tracing setup.
//!
//! Logging is off unless `SIFT_LOG` holds a filter directive. The terminal is
//! owned by the picker, so `SIFT_LOG_FILE` redirects output to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SIFT_LOG";
pub const LOG_FILE_ENV: &str = "SIFT_LOG_FILE";

/// Install the global subscriber. Safe to call when logging is disabled.
pub fn init_tracing() {
    let Ok(directives) = std::env::var(LOG_ENV) else {
        return;
    };
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("sift=info"));

    if let Some(path) = std::env::var_os(LOG_FILE_ENV).map(PathBuf::from) {
        if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
            let file_layer = tracing_subscriber::fmt::layer()
                .with_writer(file)
                .with_ansi(false)
                .with_target(true);

            let _ = tracing_subscriber::registry()
                .with(filter)
                .with(file_layer)
                .try_init();

            tracing::info!(path = %path.display(), "tracing initialized");
            return;
        }
    }

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
