//! Tracing subscriber setup for the binary.
//!
//! Events go to stderr, and for `fit` runs also to `<output_dir>/fit_pipeline.log`.
//! The level defaults to `info` and follows `RUST_LOG` when set.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::AppError;

/// Name of the run log written next to the fit results.
pub const LOG_FILE_NAME: &str = "fit_pipeline.log";

/// Install the global subscriber. A second call is a no-op.
pub fn init_logging(log_file: Option<&Path>) -> Result<(), AppError> {
    let file_layer = match log_file {
        Some(path) => {
            crate::io::ensure_parent_dir(path)?;
            let file = File::create(path)
                .map_err(|e| AppError::output(format!("Failed to create log file '{}': {e}", path.display())))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Tests and repeated calls may already have a subscriber installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    Ok(())
}
