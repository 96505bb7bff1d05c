//! Export per-observation residuals to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::ResidualRow;
use crate::error::AppError;
use crate::io::ensure_parent_dir;

/// Write residual rows (`index,t,x_obs,y_obs,x_pred,y_pred,residual`).
pub fn write_residuals_csv(path: &Path, rows: &[ResidualRow]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create residuals CSV '{}': {e}", path.display())))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::output(format!("Failed to write residuals CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush residuals CSV: {e}")))?;
    Ok(())
}
