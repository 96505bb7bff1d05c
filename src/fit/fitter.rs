//! Fit orchestration: restarts, global search, refinement, selection.
//!
//! Given observations and a [`FitConfig`], we:
//!
//! 1. sample the curve parameter on a uniform t grid
//! 2. run one local search per restart (the first from the configured initial
//!    guess, the rest from uniform random starts inside the bounds)
//! 3. run the global search and refine its best member with a local search
//! 4. keep the candidate with the lowest loss
//!
//! Restart starting points are drawn up front from a seeded RNG and the
//! restarts then run in parallel, so results only depend on the seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{Candidate, CandidateSource, FitConfig, FitResult, LossKind, Observation, ParamBounds, Params};
use crate::error::AppError;
use crate::fit::evolution::global_search;
use crate::fit::loss::Objective;
use crate::fit::simplex::{SearchOutcome, local_search};
use crate::math::uniform_t_values;

/// Open validity region of the model parameters (wider than the search box).
const THETA_VALID: (f64, f64) = (0.0, 50.0);
const M_VALID: (f64, f64) = (-0.05, 0.05);
const X_VALID: (f64, f64) = (0.0, 100.0);

/// Output of [`fit_params`].
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub best: FitResult,
    /// Every candidate considered, in evaluation order.
    pub candidates: Vec<Candidate>,
    /// Index of the winner in `candidates`.
    pub best_index: usize,
    /// The t grid the loss was evaluated on.
    pub t_samples: Vec<f64>,
}

/// True if the parameters lie strictly inside the model's validity region.
pub fn validate_bounds(params: &Params) -> bool {
    let inside = |v: f64, (lo, hi): (f64, f64)| v > lo && v < hi;
    inside(params.theta_deg, THETA_VALID) && inside(params.m, M_VALID) && inside(params.x, X_VALID)
}

/// Number of t samples used for a run.
///
/// Index pairing needs one t per observation, so that is the default.
pub fn resolve_sample_count(config: &FitConfig, n_observations: usize) -> usize {
    config.n_samples.unwrap_or(n_observations)
}

/// Fit `(θ, M, X)` to the observations.
pub fn fit_params(observations: &[Observation], config: &FitConfig) -> Result<FitOutcome, AppError> {
    if observations.is_empty() {
        return Err(AppError::data("No observations to fit."));
    }
    validate_config(config)?;

    let n_samples = resolve_sample_count(config, observations.len());
    if n_samples != observations.len() && config.loss == LossKind::Paired {
        warn!(
            n_samples,
            n_observations = observations.len(),
            "sample count differs from observation count; paired loss uses the common prefix"
        );
    }
    let t_samples = uniform_t_values(n_samples, config.t_min, config.t_max);
    let objective = Objective::new(t_samples.clone(), observations.to_vec(), config.loss);

    info!(
        restarts = config.n_restarts,
        n_samples,
        loss = config.loss.display_name(),
        seed = config.seed,
        "starting optimization"
    );

    let mut candidates = run_restarts(&objective, config)?;
    for c in &candidates {
        info!(source = %c.source, loss = c.loss, iterations = c.iterations, "local search finished");
    }

    info!("running differential evolution for global search");
    candidates.push(run_global(&objective, config)?);

    let best_index = select_best(&candidates).ok_or_else(|| {
        AppError::fit("Every optimizer run produced a non-finite loss; no fit available.")
    })?;
    let winner = &candidates[best_index];
    info!(source = %winner.source, loss = winner.loss, "selected best candidate");

    if !validate_bounds(&winner.params) {
        warn!(params = ?winner.params, "optimal parameters are outside the expected bounds");
    }

    let best = FitResult::from_params(winner.params, winner.loss);
    info!(
        "optimization complete: theta={:.4} deg, M={:.6}, X={:.4}, L1={:.6}",
        best.theta_deg, best.m, best.x, best.l1
    );

    Ok(FitOutcome {
        best,
        candidates,
        best_index,
        t_samples,
    })
}

fn validate_config(config: &FitConfig) -> Result<(), AppError> {
    config.bounds.validate()?;
    if !config.bounds.contains(&config.initial_guess) {
        return Err(AppError::input(format!(
            "Initial guess {:?} lies outside the search bounds.",
            config.initial_guess
        )));
    }
    if !(config.t_min.is_finite() && config.t_max.is_finite() && config.t_max > config.t_min) {
        return Err(AppError::input(format!(
            "Invalid t range [{}, {}] (must be finite with t_min < t_max).",
            config.t_min, config.t_max
        )));
    }
    if config.n_samples == Some(0) {
        return Err(AppError::input("Number of t samples must be > 0."));
    }
    if !(config.local.tolerance.is_finite() && config.local.tolerance > 0.0) {
        return Err(AppError::input("Local search tolerance must be > 0."));
    }
    Ok(())
}

/// Starting points: the configured guess first, then uniform draws inside the box.
pub fn restart_points(initial_guess: &Params, bounds: &ParamBounds, n_restarts: usize, seed: u64) -> Vec<Params> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n_restarts)
        .map(|i| {
            if i == 0 {
                *initial_guess
            } else {
                let [t, m, x] = bounds.as_pairs().map(|(lo, hi)| rng.gen_range(lo..=hi));
                Params::new(t, m, x)
            }
        })
        .collect()
}

fn run_restarts(objective: &Objective, config: &FitConfig) -> Result<Vec<Candidate>, AppError> {
    let starts = restart_points(&config.initial_guess, &config.bounds, config.n_restarts, config.seed);
    let total = starts.len();
    starts
        .par_iter()
        .enumerate()
        .map(|(index, x0)| {
            let out = local_search(objective, x0, &config.bounds, &config.local)?;
            Ok(candidate(CandidateSource::Restart { index, total }, out))
        })
        .collect()
}

fn run_global(objective: &Objective, config: &FitConfig) -> Result<Candidate, AppError> {
    let global = global_search(objective, &config.bounds, &config.global, config.seed)?;
    info!(
        loss = global.loss,
        generations = global.iterations,
        converged = global.converged,
        "differential evolution finished"
    );
    if !config.global.polish {
        return Ok(candidate(CandidateSource::Global { polished: false }, global));
    }

    let polished = local_search(objective, &global.params, &config.bounds, &config.local)?;
    // Refinement must never make the global answer worse.
    if polished.loss <= global.loss {
        Ok(Candidate {
            iterations: global.iterations + polished.iterations,
            ..candidate(CandidateSource::Global { polished: true }, polished)
        })
    } else {
        Ok(candidate(CandidateSource::Global { polished: false }, global))
    }
}

fn candidate(source: CandidateSource, out: SearchOutcome) -> Candidate {
    Candidate {
        source,
        params: out.params,
        loss: out.loss,
        iterations: out.iterations,
        converged: out.converged,
    }
}

/// Lowest finite loss wins; ties go to the earlier candidate.
fn select_best(candidates: &[Candidate]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, c) in candidates.iter().enumerate() {
        if !c.loss.is_finite() {
            continue;
        }
        match best {
            Some(b) if candidates[b].loss <= c.loss => {}
            _ => best = Some(i),
        }
    }
    best
}
