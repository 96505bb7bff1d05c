//! Loss functions: mean Euclidean distance between curve samples and observations.
//!
//! Two matchings are supported:
//!
//! - `Paired`: the i-th uniform t sample is compared with the i-th observation.
//!   Only the common prefix `min(n_pred, n_obs)` is used.
//! - `Nearest`: every observation is compared with its closest predicted sample.
//!
//! A loss that cannot be computed (empty input, non-finite predictions) is
//! reported as `f64::INFINITY` so optimizers simply reject the candidate.

use argmin::core::{CostFunction, Error};
use nalgebra::{Point2, distance};

use crate::domain::{LossKind, Observation, Params};
use crate::models::predict;

/// Mean distance over index-paired samples.
pub fn paired_l1(predicted: &[(f64, f64)], observed: &[Observation]) -> f64 {
    finite_mean(compute_residuals(predicted, observed))
}

/// Mean over observations of the distance to the closest predicted sample.
pub fn nearest_l1(predicted: &[(f64, f64)], observed: &[Observation]) -> f64 {
    if predicted.is_empty() {
        return f64::INFINITY;
    }
    let curve: Vec<Point2<f64>> = predicted.iter().map(|&(x, y)| Point2::new(x, y)).collect();
    finite_mean(observed.iter().map(|o| {
        let p = o.point();
        curve
            .iter()
            .map(|c| distance(c, &p))
            .fold(f64::INFINITY, f64::min)
    }))
}

/// Per-index Euclidean distances over the paired prefix.
pub fn compute_residuals(predicted: &[(f64, f64)], observed: &[Observation]) -> Vec<f64> {
    predicted
        .iter()
        .zip(observed)
        .map(|(&(x, y), o)| distance(&Point2::new(x, y), &o.point()))
        .collect()
}

fn finite_mean(distances: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut n = 0usize;
    for d in distances {
        if !d.is_finite() {
            return f64::INFINITY;
        }
        sum += d;
        n += 1;
    }
    if n == 0 { f64::INFINITY } else { sum / n as f64 }
}

/// Objective evaluated by every optimizer: fixed t grid + observations + matching rule.
#[derive(Debug, Clone)]
pub struct Objective {
    ts: Vec<f64>,
    observed: Vec<Observation>,
    kind: LossKind,
}

impl Objective {
    pub fn new(ts: Vec<f64>, observed: Vec<Observation>, kind: LossKind) -> Self {
        Self { ts, observed, kind }
    }

    pub fn evaluate(&self, params: &Params) -> f64 {
        if !params.is_finite() {
            return f64::INFINITY;
        }
        let predicted = predict(&self.ts, params);
        match self.kind {
            LossKind::Paired => paired_l1(&predicted, &self.observed),
            LossKind::Nearest => nearest_l1(&predicted, &self.observed),
        }
    }

    /// Evaluate a raw parameter vector in `[θ°, M, X]` order.
    pub fn evaluate_slice(&self, p: &[f64]) -> f64 {
        self.evaluate(&Params::from_slice(p))
    }
}

impl CostFunction for Objective {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.evaluate_slice(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::uniform_t_values;
    use approx::assert_relative_eq;

    fn obs(points: &[(f64, f64)]) -> Vec<Observation> {
        points.iter().map(|&(x, y)| Observation::new(x, y)).collect()
    }

    #[test]
    fn paired_uses_index_matching() {
        let pred = [(0.0, 0.0), (10.0, 0.0)];
        // Swapped order: paired distances are 10 each, nearest distances are 0.
        let o = obs(&[(10.0, 0.0), (0.0, 0.0)]);
        assert_relative_eq!(paired_l1(&pred, &o), 10.0);
        assert_relative_eq!(nearest_l1(&pred, &o), 0.0);
    }

    #[test]
    fn paired_truncates_to_common_prefix() {
        let pred = [(0.0, 0.0), (0.0, 0.0), (100.0, 100.0)];
        let o = obs(&[(3.0, 4.0), (0.0, 0.0)]);
        assert_eq!(compute_residuals(&pred, &o), vec![5.0, 0.0]);
        assert_relative_eq!(paired_l1(&pred, &o), 2.5);
    }

    #[test]
    fn degenerate_inputs_are_infinite() {
        assert_eq!(paired_l1(&[], &obs(&[(1.0, 1.0)])), f64::INFINITY);
        assert_eq!(nearest_l1(&[], &obs(&[(1.0, 1.0)])), f64::INFINITY);
        assert_eq!(paired_l1(&[(f64::NAN, 0.0)], &obs(&[(1.0, 1.0)])), f64::INFINITY);
    }

    #[test]
    fn objective_is_zero_at_generating_params() {
        let truth = Params::new(25.0, 0.01, 50.0);
        let ts = uniform_t_values(50, 6.0, 60.0);
        let observed: Vec<Observation> = predict(&ts, &truth)
            .into_iter()
            .map(|(x, y)| Observation::new(x, y))
            .collect();

        for kind in [LossKind::Paired, LossKind::Nearest] {
            let objective = Objective::new(ts.clone(), observed.clone(), kind);
            assert!(objective.evaluate(&truth) < 1e-9);
            assert!(objective.evaluate(&Params::new(30.0, 0.0, 40.0)) > 1.0);
        }
    }

    #[test]
    fn cost_function_matches_evaluate() {
        let ts = uniform_t_values(10, 6.0, 60.0);
        let observed = obs(&[(60.0, 50.0); 10]);
        let objective = Objective::new(ts, observed, LossKind::Paired);
        let p = Params::new(20.0, 0.0, 45.0);
        assert_eq!(objective.cost(&p.to_vec()).unwrap(), objective.evaluate(&p));
        assert_eq!(objective.evaluate(&Params::new(f64::NAN, 0.0, 0.0)), f64::INFINITY);
    }
}
