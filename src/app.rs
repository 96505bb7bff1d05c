//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - runs the fit pipeline and prints the summary
//! - writes params, residuals and plots
//! - generates synthetic data and re-renders saved fits

use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, FitArgs, GenerateArgs, PlotArgs};
use crate::data::{GenerateConfig, generate_sample, write_observations_csv};
use crate::domain::{FitConfig, GlobalSearchOptions, Params};
use crate::error::AppError;
use crate::io::ingest::IngestOptions;
use crate::plot::PlotConfig;

pub mod logging;
pub mod pipeline;

/// Entry point for the `pcfit` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Generate(args) => handle_generate(args),
        Command::Plot(args) => handle_plot(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    logging::init_logging(Some(&args.output_dir.join(logging::LOG_FILE_NAME)))?;

    let ingest = ingest_options(args.delimiter, args.min_rows)?;
    let config = fit_config_from_args(&args);
    let plots = plot_config_from_args(&args);

    let run = pipeline::run_fit(&args.data, &ingest, &config)?;
    println!(
        "{}",
        crate::report::format_run_summary(&run.data.stats, &run.outcome, &config)
    );

    if plots.ascii {
        let plot = crate::plot::render_ascii_plot(
            &run.data.observations,
            &run.outcome.best.params(),
            (config.t_min, config.t_max),
            plots.width,
            plots.height,
        );
        println!("{plot}");
    }

    let artifacts = pipeline::write_artifacts(&args.output_dir, &run, &config, &plots)?;
    for path in artifacts.written() {
        info!(path = %path.display(), "wrote output");
    }
    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    logging::init_logging(None)?;

    let config = generate_config_from_args(&args);
    let observations = generate_sample(&config)?;
    write_observations_csv(&args.output, &observations)?;
    info!(
        path = %args.output.display(),
        n_points = observations.len(),
        theta_deg = config.params.theta_deg,
        m = config.params.m,
        x = config.params.x,
        noise = config.noise,
        "wrote synthetic observations"
    );
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    logging::init_logging(None)?;

    let ingest = ingest_options(args.delimiter, 1)?;
    let data = crate::io::load_observations(&args.data, &ingest)?;
    let result = crate::io::load_params_json(&args.params)?;

    let config = FitConfig::default();
    let residuals = pipeline::residuals_for_saved_fit(&data.observations, &result, &config)?;
    println!("{}", crate::report::format_result(&result));

    pipeline::write_plots(
        &args.output_dir,
        &data.observations,
        &result.params(),
        &residuals,
        (config.t_min, config.t_max),
        PlotConfig::default().curve_points,
    )?;
    Ok(())
}

pub fn fit_config_from_args(args: &FitArgs) -> FitConfig {
    let defaults = FitConfig::default();
    FitConfig {
        initial_guess: Params::new(args.theta_init, args.m_init, args.x_init),
        n_samples: args.n_samples,
        n_restarts: args.n_restarts,
        seed: args.seed,
        loss: args.loss,
        global: GlobalSearchOptions {
            max_generations: args.max_generations,
            ..defaults.global
        },
        ..defaults
    }
}

pub fn plot_config_from_args(args: &FitArgs) -> PlotConfig {
    PlotConfig {
        svg: !args.no_plots,
        ascii: args.plot,
        width: args.width,
        height: args.height,
        ..PlotConfig::default()
    }
}

pub fn generate_config_from_args(args: &GenerateArgs) -> GenerateConfig {
    GenerateConfig {
        params: Params::new(args.theta, args.m, args.x),
        n_points: args.n,
        noise: args.noise,
        seed: args.seed,
        ..GenerateConfig::default()
    }
}

fn ingest_options(delimiter: char, min_rows: usize) -> Result<IngestOptions, AppError> {
    if !delimiter.is_ascii() {
        return Err(AppError::input(format!("Delimiter must be a single ASCII character, got '{delimiter}'.")));
    }
    Ok(IngestOptions {
        delimiter: delimiter as u8,
        min_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LossKind;

    #[test]
    fn fit_args_map_onto_config() {
        let cli = Cli::parse_from([
            "pcfit",
            "fit",
            "--data",
            "d.csv",
            "--loss",
            "nearest",
            "--m-init",
            "-0.01",
            "--n-restarts",
            "0",
            "--max-generations",
            "50",
            "--no-plots",
            "--plot",
        ]);
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        let config = fit_config_from_args(&args);
        assert_eq!(config.loss, LossKind::Nearest);
        assert_eq!(config.initial_guess, Params::new(25.0, -0.01, 50.0));
        assert_eq!(config.n_restarts, 0);
        assert_eq!(config.global.max_generations, 50);
        assert_eq!(config.global.recombination, 0.7);

        let plots = plot_config_from_args(&args);
        assert!(!plots.svg && plots.ascii);
    }

    #[test]
    fn non_ascii_delimiter_is_rejected() {
        assert_eq!(ingest_options('é', 10).unwrap_err().exit_code(), AppError::INPUT);
        assert_eq!(ingest_options(';', 10).unwrap().delimiter, b';');
    }
}
