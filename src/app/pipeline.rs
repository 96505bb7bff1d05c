//! Shared "fit pipeline" logic used by the `fit` and `plot` commands.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> fit -> residuals -> artifacts
//!
//! The command handlers can then focus on presentation.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::{FitConfig, FitResult, Observation, Params, ResidualRow};
use crate::error::AppError;
use crate::fit::{FitOutcome, fit_params};
use crate::io::ingest::{IngestOptions, LoadedData, load_observations};
use crate::plot::{PlotConfig, render_fit_plot, render_residuals_plot};
use crate::report::residual_rows_for_loss;

pub const PARAMS_FILE_NAME: &str = "params.json";
pub const RESIDUALS_FILE_NAME: &str = "residuals.csv";
pub const FIT_PLOT_FILE_NAME: &str = "fit_plot.svg";
pub const RESIDUALS_PLOT_FILE_NAME: &str = "residuals_plot.svg";

/// All computed outputs of a single `pcfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub data: LoadedData,
    pub outcome: FitOutcome,
    pub residuals: Vec<ResidualRow>,
}

/// Load the data file, fit it, and compute per-observation residuals.
pub fn run_fit(path: &Path, ingest: &IngestOptions, config: &FitConfig) -> Result<RunOutput, AppError> {
    info!(path = %path.display(), "loading data");
    let data = load_observations(path, ingest)?;
    info!(
        n_points = data.stats.n_points,
        x_min = data.stats.x_min,
        x_max = data.stats.x_max,
        y_min = data.stats.y_min,
        y_max = data.stats.y_max,
        "loaded observations"
    );

    let outcome = fit_params(&data.observations, config)?;
    let residuals = residual_rows_for_loss(
        config.loss,
        &data.observations,
        &outcome.best.params(),
        &outcome.t_samples,
    )?;

    Ok(RunOutput {
        data,
        outcome,
        residuals,
    })
}

/// Paths of the files written by [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub params: Option<PathBuf>,
    pub residuals: Option<PathBuf>,
    pub fit_plot: Option<PathBuf>,
    pub residuals_plot: Option<PathBuf>,
}

impl Artifacts {
    pub fn written(&self) -> impl Iterator<Item = &PathBuf> {
        [&self.params, &self.residuals, &self.fit_plot, &self.residuals_plot]
            .into_iter()
            .flatten()
    }
}

/// Write `params.json`, `residuals.csv` and, if enabled, the SVG plots.
pub fn write_artifacts(
    output_dir: &Path,
    run: &RunOutput,
    config: &FitConfig,
    plots: &PlotConfig,
) -> Result<Artifacts, AppError> {
    let params = output_dir.join(PARAMS_FILE_NAME);
    crate::io::save_params_json(&params, &run.outcome.best)?;

    let residuals = output_dir.join(RESIDUALS_FILE_NAME);
    crate::io::write_residuals_csv(&residuals, &run.residuals)?;

    let mut artifacts = Artifacts {
        params: Some(params),
        residuals: Some(residuals),
        ..Artifacts::default()
    };

    if plots.svg {
        let (fit_plot, residuals_plot) = write_plots(
            output_dir,
            &run.data.observations,
            &run.outcome.best.params(),
            &run.residuals,
            (config.t_min, config.t_max),
            plots.curve_points,
        )?;
        artifacts.fit_plot = Some(fit_plot);
        artifacts.residuals_plot = Some(residuals_plot);
    }
    Ok(artifacts)
}

/// Render both SVG plots into `output_dir`.
pub fn write_plots(
    output_dir: &Path,
    observations: &[Observation],
    params: &Params,
    residuals: &[ResidualRow],
    t_range: (f64, f64),
    curve_points: usize,
) -> Result<(PathBuf, PathBuf), AppError> {
    let fit_plot = output_dir.join(FIT_PLOT_FILE_NAME);
    render_fit_plot(&fit_plot, observations, params, t_range, curve_points)?;
    info!(path = %fit_plot.display(), "saved fit plot");

    let residuals_plot = output_dir.join(RESIDUALS_PLOT_FILE_NAME);
    render_residuals_plot(&residuals_plot, residuals)?;
    info!(path = %residuals_plot.display(), "saved residuals plot");

    Ok((fit_plot, residuals_plot))
}

/// Residuals of a saved fit, pairing one uniform t sample per observation.
pub fn residuals_for_saved_fit(
    observations: &[Observation],
    result: &FitResult,
    config: &FitConfig,
) -> Result<Vec<ResidualRow>, AppError> {
    let ts = crate::math::uniform_t_values(observations.len(), config.t_min, config.t_max);
    residual_rows_for_loss(config.loss, observations, &result.params(), &ts)
}
