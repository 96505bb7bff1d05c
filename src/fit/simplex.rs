//! Bounded local search using `argmin`'s Nelder-Mead solver.
//!
//! `argmin` works on unconstrained problems, so the objective is wrapped:
//! every vertex is clipped into the search box before the curve is evaluated,
//! and vertices outside the box pay a penalty proportional to their relative
//! excursion. The penalty keeps the simplex from drifting along a flat,
//! clipped plateau. The returned parameters are always inside the box.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;

use crate::domain::{LocalSearchOptions, ParamBounds, Params};
use crate::error::AppError;
use crate::fit::loss::Objective;

/// Relative offset applied to a non-zero coordinate when building the initial simplex.
const NONZERO_DELTA: f64 = 0.05;
/// Absolute offset applied to a zero coordinate.
const ZERO_DELTA: f64 = 0.00025;

/// Result of a single search run (local or global).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    pub params: Params,
    pub loss: f64,
    pub iterations: u64,
    pub converged: bool,
}

struct BoxedObjective<'a> {
    objective: &'a Objective,
    bounds: &'a ParamBounds,
}

impl CostFunction for BoxedObjective<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, Error> {
        let clipped = self.bounds.clamp(p);
        let excursion: f64 = p
            .iter()
            .zip(&clipped)
            .zip(self.bounds.as_pairs())
            .map(|((&raw, &c), (lo, hi))| (raw - c).abs() / (hi - lo))
            .sum();
        Ok(self.objective.evaluate_slice(&clipped) + excursion)
    }
}

/// Build the initial simplex around `x0`: `x0` plus one vertex per dimension.
///
/// If stepping up would leave the box, the vertex steps down instead.
pub fn initial_simplex(x0: &[f64], bounds: &ParamBounds) -> Vec<Vec<f64>> {
    let x0 = bounds.clamp(x0);
    let pairs = bounds.as_pairs();
    let mut simplex = Vec::with_capacity(x0.len() + 1);
    simplex.push(x0.clone());
    for i in 0..x0.len() {
        let mut vertex = x0.clone();
        let step = if x0[i].abs() > 1e-9 { x0[i] * NONZERO_DELTA } else { ZERO_DELTA };
        let (lo, hi) = pairs[i];
        let up = x0[i] + step;
        vertex[i] = if up <= hi { up } else { (x0[i] - step).max(lo) };
        simplex.push(vertex);
    }
    simplex
}

/// Run a bounded Nelder-Mead search starting at `x0`.
pub fn local_search(
    objective: &Objective,
    x0: &Params,
    bounds: &ParamBounds,
    opts: &LocalSearchOptions,
) -> Result<SearchOutcome, AppError> {
    let simplex = initial_simplex(&x0.to_vec(), bounds);
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(opts.tolerance)
        .map_err(|e| AppError::input(format!("Invalid local search tolerance: {e}")))?;

    let problem = BoxedObjective { objective, bounds };
    let res = Executor::new(problem, solver)
        .configure(|state| state.max_iters(opts.max_iters))
        .run()
        .map_err(|e| AppError::fit(format!("Local search failed: {e}")))?;

    let state = res.state();
    let best = state
        .get_best_param()
        .ok_or_else(|| AppError::fit("Local search returned no parameters."))?;
    let clipped = Params::from_slice(&bounds.clamp(best));
    let converged = matches!(
        state.get_termination_status(),
        TerminationStatus::Terminated(TerminationReason::SolverConverged)
    );

    Ok(SearchOutcome {
        params: clipped,
        // Re-evaluate without the excursion penalty.
        loss: objective.evaluate(&clipped),
        iterations: state.get_iter(),
        converged,
    })
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
    fn simplex_has_dim_plus_one_vertices_inside_bounds() {
        let bounds = ParamBounds::default();
        let simplex = initial_simplex(&[49.9, 0.0, 50.0], &bounds);
        assert_eq!(simplex.len(), 4);
        for v in &simplex {
            assert!(bounds.contains(&Params::from_slice(v)));
        }
        // θ sits on its upper bound, so its vertex steps down.
        assert!(simplex[1][0] < 49.9);
        // M is zero, so it gets the absolute offset.
        assert!((simplex[2][1] - ZERO_DELTA).abs() < 1e-15);
    }

    #[test]
    fn recovers_parameters_from_a_nearby_start() {
        let truth = Params::new(26.5, 0.005, 52.0);
        let objective = synthetic_objective(&truth, 60);
        let start = Params::new(25.0, 0.0, 50.0);
        let out = local_search(&objective, &start, &ParamBounds::default(), &LocalSearchOptions::default())
            .unwrap();
        assert!(out.loss < 0.5, "loss {}", out.loss);
        assert!((out.params.theta_deg - truth.theta_deg).abs() < 2.0);
        assert!((out.params.x - truth.x).abs() < 3.0);
    }

    #[test]
    fn result_never_leaves_the_box() {
        // Generating parameters outside the search box pull the simplex onto the edge.
        let truth = Params::new(45.0, 0.0, 99.0);
        let objective = synthetic_objective(&truth, 30);
        let bounds = ParamBounds {
            theta_deg: (0.1, 30.0),
            m: (-0.049, 0.049),
            x: (0.1, 80.0),
        };
        let out = local_search(&objective, &Params::new(20.0, 0.0, 50.0), &bounds, &LocalSearchOptions::default())
            .unwrap();
        assert!(bounds.contains(&out.params));
        assert!(out.loss.is_finite());
    }
}
