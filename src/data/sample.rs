//! Synthetic observation generation from known curve parameters.
//!
//! Used by `pcfit generate` and the validation script: sample the curve at
//! uniform t values and add independent Gaussian noise to x and y.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{Observation, Params, T_MAX, T_MIN};
use crate::error::AppError;
use crate::io::ensure_parent_dir;
use crate::math::uniform_t_values;
use crate::models::predict;

/// Settings for synthetic data generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerateConfig {
    pub params: Params,
    pub n_points: usize,
    /// Standard deviation of the Gaussian noise added to each coordinate.
    pub noise: f64,
    pub seed: u64,
    pub t_min: f64,
    pub t_max: f64,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            params: Params::new(25.0, 0.01, 50.0),
            n_points: 100,
            noise: 0.1,
            seed: 42,
            t_min: T_MIN,
            t_max: T_MAX,
        }
    }
}

/// Generate noisy observations in t order.
pub fn generate_sample(config: &GenerateConfig) -> Result<Vec<Observation>, AppError> {
    if config.n_points == 0 {
        return Err(AppError::input("Sample count must be > 0."));
    }
    if !config.params.is_finite() {
        return Err(AppError::input("Generating parameters must be finite."));
    }
    if !(config.t_min.is_finite() && config.t_max.is_finite() && config.t_max > config.t_min) {
        return Err(AppError::input("Invalid t range for sample generation."));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(AppError::input(format!(
            "Noise must be a finite, non-negative standard deviation (got {}).",
            config.noise
        )));
    }
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| AppError::input(format!("Noise distribution error: {e}")))?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let ts = uniform_t_values(config.n_points, config.t_min, config.t_max);
    Ok(predict(&ts, &config.params)
        .into_iter()
        .map(|(x, y)| Observation::new(x + normal.sample(&mut rng), y + normal.sample(&mut rng)))
        .collect())
}

/// Write observations as an `x,y` CSV.
pub fn write_observations_csv(path: &Path, observations: &[Observation]) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create data CSV '{}': {e}", path.display())))?;
    for o in observations {
        writer
            .serialize(o)
            .map_err(|e| AppError::output(format!("Failed to write data CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush data CSV: {e}")))?;
    Ok(())
}
