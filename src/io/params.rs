//! Read/write `params.json`.
//!
//! The params file is the portable result of a fit:
//! `{ "theta_deg", "theta_rad", "M", "X", "l1" }`.
//! It can be reloaded later to re-render plots without refitting.

use std::fs::File;
use std::path::Path;

use crate::domain::FitResult;
use crate::error::AppError;
use crate::io::ensure_parent_dir;

/// Write the fit result as pretty-printed JSON, creating parent directories.
pub fn save_params_json(path: &Path, result: &FitResult) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create params JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, result)
        .map_err(|e| AppError::output(format!("Failed to write params JSON: {e}")))?;
    Ok(())
}

/// Read a params JSON file produced by [`save_params_json`].
pub fn load_params_json(path: &Path) -> Result<FitResult, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open params JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::input(format!("Failed to parse params JSON '{}': {e}", path.display())))
}
