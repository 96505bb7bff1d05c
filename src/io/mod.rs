//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - params JSON read/write (`params`)
//! - residual exports (`export`)

use std::path::Path;

use crate::error::AppError;

pub mod export;
pub mod ingest;
pub mod params;

pub use export::*;
pub use ingest::*;
pub use params::*;

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent_dir(path: &Path) -> Result<(), AppError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .map_err(|e| AppError::output(format!("Failed to create directory '{}': {e}", dir.display()))),
        _ => Ok(()),
    }
}
