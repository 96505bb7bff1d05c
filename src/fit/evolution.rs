//! Differential evolution (`best/1/bin`) over the bounded parameter box.
//!
//! - initial population: Latin hypercube, `pop_size_factor * dim` members
//! - mutation: `best + F * (a - b)`, with `F` redrawn once per generation
//! - crossover: binomial, at least one coordinate always taken from the mutant
//! - out-of-box trial coordinates are redrawn uniformly inside the box
//! - updates are generation-synchronous: all trials of a generation are built
//!   first (serially, from one seeded RNG), then evaluated in parallel
//!
//! Because every random draw happens on the calling thread, a given seed gives
//! the same result regardless of the rayon pool size.
//!
//! The search stops when the population costs have collapsed:
//! `std(costs) <= atol + tol * |mean(costs)|`.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;
use tracing::debug;

use crate::domain::{GlobalSearchOptions, ParamBounds, Params};
use crate::error::AppError;
use crate::fit::loss::Objective;
use crate::fit::simplex::SearchOutcome;
use crate::math::{mean, std_dev};

/// Smallest population that still allows picking the best plus two distinct donors.
const MIN_POPULATION: usize = 5;

struct Population {
    members: Vec<Vec<f64>>,
    costs: Vec<f64>,
    best: usize,
}

impl Population {
    fn new(members: Vec<Vec<f64>>, costs: Vec<f64>) -> Self {
        let best = argmin_index(&costs);
        Self { members, costs, best }
    }

    fn converged(&self, opts: &GlobalSearchOptions) -> bool {
        if self.costs.iter().any(|c| !c.is_finite()) {
            return false;
        }
        match (std_dev(&self.costs), mean(&self.costs)) {
            (Some(sd), Some(m)) => sd <= opts.atol + opts.tol * m.abs(),
            _ => false,
        }
    }
}

/// Run differential evolution and return the best member found.
pub fn global_search(
    objective: &Objective,
    bounds: &ParamBounds,
    opts: &GlobalSearchOptions,
    seed: u64,
) -> Result<SearchOutcome, AppError> {
    validate_options(opts)?;
    bounds.validate()?;

    let dim = Params::DIM;
    let pop_size = (opts.pop_size_factor * dim).max(MIN_POPULATION);
    let pairs = bounds.as_pairs();
    let mut rng = StdRng::seed_from_u64(seed);

    let initial = latin_hypercube(&mut rng, pop_size, &pairs);
    let costs = evaluate_all(objective, &initial);
    let mut pop = Population::new(initial, costs);

    let mut generations = 0u64;
    let mut converged = pop.converged(opts);

    while !converged && (generations as usize) < opts.max_generations {
        let f = draw_mutation(&mut rng, opts.mutation);
        let trials: Vec<Vec<f64>> = (0..pop_size)
            .map(|i| build_trial(&mut rng, &pop, i, f, opts.recombination, &pairs))
            .collect();
        let trial_costs = evaluate_all(objective, &trials);

        for (i, (trial, cost)) in trials.into_iter().zip(trial_costs).enumerate() {
            if cost <= pop.costs[i] {
                pop.members[i] = trial;
                pop.costs[i] = cost;
                if cost < pop.costs[pop.best] {
                    pop.best = i;
                }
            }
        }

        generations += 1;
        converged = pop.converged(opts);
        if generations % 100 == 0 {
            debug!(generations, best = pop.costs[pop.best], "differential evolution progress");
        }
    }

    let best = Params::from_slice(&pop.members[pop.best]);
    Ok(SearchOutcome {
        params: best,
        loss: pop.costs[pop.best],
        iterations: generations,
        converged,
    })
}

fn validate_options(opts: &GlobalSearchOptions) -> Result<(), AppError> {
    let (lo, hi) = opts.mutation;
    if !(lo.is_finite() && hi.is_finite() && 0.0 <= lo && lo <= hi && hi <= 2.0) {
        return Err(AppError::input(format!(
            "Invalid mutation range ({lo}, {hi}); expected 0 <= lo <= hi <= 2."
        )));
    }
    if !(0.0..=1.0).contains(&opts.recombination) {
        return Err(AppError::input(format!(
            "Invalid recombination {}; expected a probability in [0, 1].",
            opts.recombination
        )));
    }
    if !(opts.tol >= 0.0 && opts.atol >= 0.0) {
        return Err(AppError::input("Convergence tolerances must be non-negative."));
    }
    Ok(())
}

/// One sample per stratum in every dimension, strata shuffled independently.
fn latin_hypercube(rng: &mut StdRng, n: usize, pairs: &[(f64, f64)]) -> Vec<Vec<f64>> {
    let mut members = vec![vec![0.0; pairs.len()]; n];
    for (j, &(lo, hi)) in pairs.iter().enumerate() {
        let mut strata: Vec<usize> = (0..n).collect();
        strata.shuffle(rng);
        for (member, &stratum) in members.iter_mut().zip(&strata) {
            let u = (stratum as f64 + rng.gen_range(0.0..1.0)) / n as f64;
            member[j] = lo + u * (hi - lo);
        }
    }
    members
}

fn draw_mutation(rng: &mut StdRng, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo { rng.gen_range(lo..hi) } else { lo }
}

fn build_trial(
    rng: &mut StdRng,
    pop: &Population,
    target: usize,
    f: f64,
    recombination: f64,
    pairs: &[(f64, f64)],
) -> Vec<f64> {
    let n = pop.members.len();
    // Two donors distinct from each other and from the target.
    let donors: Vec<usize> = index::sample(rng, n - 1, 2)
        .into_iter()
        .map(|k| if k >= target { k + 1 } else { k })
        .collect();
    let best = &pop.members[pop.best];
    let a = &pop.members[donors[0]];
    let b = &pop.members[donors[1]];

    let dim = pairs.len();
    let forced = rng.gen_range(0..dim);
    let mut trial = pop.members[target].clone();
    for j in 0..dim {
        if j == forced || rng.gen_range(0.0..1.0) < recombination {
            trial[j] = best[j] + f * (a[j] - b[j]);
        }
    }

    for (v, &(lo, hi)) in trial.iter_mut().zip(pairs) {
        if !(*v >= lo && *v <= hi) {
            *v = rng.gen_range(lo..=hi);
        }
    }
    trial
}

fn evaluate_all(objective: &Objective, members: &[Vec<f64>]) -> Vec<f64> {
    members
        .par_iter()
        .map(|m| objective.evaluate_slice(m))
        .collect()
}

/// Index of the smallest cost; non-finite costs lose, ties go to the lowest index.
fn argmin_index(costs: &[f64]) -> usize {
    let mut best = 0;
    for (i, &c) in costs.iter().enumerate().skip(1) {
        let current = costs[best];
        if c < current || (!current.is_finite() && c.is_finite()) {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LossKind, Observation};
    use crate::math::uniform_t_values;
    use crate::models::predict;

    fn synthetic_objective(truth: &Params, n: usize) -> Objective {
        let ts = uniform_t_values(n, 6.0, 60.0);
        let observed = predict(&ts, truth)
            .into_iter()
            .map(|(x, y)| Observation::new(x, y))
            .collect();
        Objective::new(ts, observed, LossKind::Paired)
    }

    #[test]
    fn latin_hypercube_covers_every_stratum() {
        let mut rng = StdRng::seed_from_u64(7);
        let pairs = [(0.0, 10.0), (-1.0, 1.0)];
        let members = latin_hypercube(&mut rng, 10, &pairs);
        for (j, &(lo, hi)) in pairs.iter().enumerate() {
            let mut strata: Vec<usize> = members
                .iter()
                .map(|m| (((m[j] - lo) / (hi - lo)) * 10.0).floor() as usize)
                .collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..10).collect::<Vec<_>>());
        }
    }

    #[test]
    fn argmin_index_prefers_finite_and_first() {
        assert_eq!(argmin_index(&[f64::INFINITY, 2.0, 1.0, 1.0]), 2);
        assert_eq!(argmin_index(&[f64::NAN, 3.0]), 1);
    }

    #[test]
    fn finds_the_generating_parameters() {
        let truth = Params::new(30.0, 0.02, 55.0);
        let objective = synthetic_objective(&truth, 40);
        let opts = GlobalSearchOptions {
            max_generations: 300,
            ..GlobalSearchOptions::default()
        };
        let out = global_search(&objective, &ParamBounds::default(), &opts, 42).unwrap();
        assert!(out.loss < 0.5, "loss {}", out.loss);
        assert!((out.params.theta_deg - truth.theta_deg).abs() < 2.0);
        assert!((out.params.x - truth.x).abs() < 3.0);
        assert!(ParamBounds::default().contains(&out.params));
    }

    #[test]
    fn same_seed_same_answer() {
        let objective = synthetic_objective(&Params::new(15.0, -0.01, 20.0), 20);
        let opts = GlobalSearchOptions {
            max_generations: 20,
            ..GlobalSearchOptions::default()
        };
        let a = global_search(&objective, &ParamBounds::default(), &opts, 3).unwrap();
        let b = global_search(&objective, &ParamBounds::default(), &opts, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_seed_same_answer_across_pool_sizes() {
        let objective = synthetic_objective(&Params::new(35.0, 0.015, 70.0), 30);
        let opts = GlobalSearchOptions {
            max_generations: 50,
            ..GlobalSearchOptions::default()
        };
        let run_with = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| global_search(&objective, &ParamBounds::default(), &opts, 11).unwrap())
        };
        assert_eq!(run_with(1), run_with(4));
    }

    #[test]
    fn rejects_bad_options() {
        let objective = synthetic_objective(&Params::default(), 10);
        let opts = GlobalSearchOptions {
            recombination: 1.5,
            ..GlobalSearchOptions::default()
        };
        let err = global_search(&objective, &ParamBounds::default(), &opts, 0).unwrap_err();
        assert_eq!(err.exit_code(), AppError::INPUT);
    }
}
