//! Command-line parsing for the parametric curve fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting code; `app` maps these structs onto plain config types.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::LossKind;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pcfit", version, about = "Parametric curve fitter (θ, M, X) with L1 loss")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the curve to a CSV of `x,y` observations and write results.
    Fit(FitArgs),
    /// Generate synthetic observations from known parameters.
    Generate(GenerateArgs),
    /// Re-render plots from a data file and a saved `params.json`.
    Plot(PlotArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct FitArgs {
    /// Input CSV with `x` and `y` columns.
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: PathBuf,

    /// Directory for params, residuals, plots and the run log.
    #[arg(short = 'o', long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Number of uniform t samples (defaults to the number of observations).
    #[arg(long)]
    pub n_samples: Option<usize>,

    /// Random seed for restarts and differential evolution.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Number of local-search restarts.
    #[arg(long, default_value_t = 10)]
    pub n_restarts: usize,

    /// How predictions are matched to observations.
    #[arg(long, value_enum, default_value_t = LossKind::Paired)]
    pub loss: LossKind,

    /// Field delimiter of the input file.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,

    /// Minimum number of data rows required.
    #[arg(long, default_value_t = crate::io::DEFAULT_MIN_ROWS)]
    pub min_rows: usize,

    /// Initial θ in degrees.
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    pub theta_init: f64,

    /// Initial M.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub m_init: f64,

    /// Initial X.
    #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
    pub x_init: f64,

    /// Skip writing SVG plots.
    #[arg(long)]
    pub no_plots: bool,

    /// Print an ASCII plot to the terminal.
    #[arg(long)]
    pub plot: bool,

    /// ASCII plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// ASCII plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Generation cap for differential evolution.
    #[arg(long, default_value_t = 1000)]
    pub max_generations: usize,
}

#[derive(Debug, Parser, Clone)]
pub struct GenerateArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub output: PathBuf,

    /// θ in degrees.
    #[arg(long, default_value_t = 25.0, allow_negative_numbers = true)]
    pub theta: f64,

    #[arg(long, default_value_t = 0.01, allow_negative_numbers = true)]
    pub m: f64,

    #[arg(long, default_value_t = 50.0, allow_negative_numbers = true)]
    pub x: f64,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 100)]
    pub n: usize,

    /// Standard deviation of the Gaussian noise on x and y.
    #[arg(long, default_value_t = 0.1)]
    pub noise: f64,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Input CSV with `x` and `y` columns.
    #[arg(short = 'd', long, value_name = "CSV")]
    pub data: PathBuf,

    /// `params.json` produced by `pcfit fit`.
    #[arg(short = 'p', long, value_name = "JSON")]
    pub params: PathBuf,

    #[arg(short = 'o', long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Field delimiter of the input file.
    #[arg(long, default_value_t = ',')]
    pub delimiter: char,
}
