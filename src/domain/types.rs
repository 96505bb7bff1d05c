//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting

use clap::ValueEnum;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Lower end of the sampled curve parameter domain.
pub const T_MIN: f64 = 6.0;
/// Upper end of the sampled curve parameter domain.
pub const T_MAX: f64 = 60.0;

/// One observed `(x, y)` point. Row order of the input file is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub x: f64,
    pub y: f64,
}

impl Observation {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}

/// The three unknowns of the curve model.
///
/// `theta_deg` is stored in degrees; every consumer converts at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub theta_deg: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
}

impl Params {
    pub const DIM: usize = 3;

    pub fn new(theta_deg: f64, m: f64, x: f64) -> Self {
        Self { theta_deg, m, x }
    }

    /// Parameter vector in optimizer order: `[θ°, M, X]`.
    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.theta_deg, self.m, self.x]
    }

    /// Inverse of [`Params::to_vec`]. Missing trailing entries are treated as zero.
    pub fn from_slice(v: &[f64]) -> Self {
        let at = |i: usize| v.get(i).copied().unwrap_or(0.0);
        Self::new(at(0), at(1), at(2))
    }

    pub fn theta_rad(&self) -> f64 {
        crate::models::deg_to_rad(self.theta_deg)
    }

    pub fn is_finite(&self) -> bool {
        self.theta_deg.is_finite() && self.m.is_finite() && self.x.is_finite()
    }
}

impl Default for Params {
    /// Default starting point for the first local search.
    fn default() -> Self {
        Self::new(25.0, 0.0, 50.0)
    }
}

/// Closed search box for each parameter, `(lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub theta_deg: (f64, f64),
    #[serde(rename = "M")]
    pub m: (f64, f64),
    #[serde(rename = "X")]
    pub x: (f64, f64),
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            theta_deg: (0.1, 49.9),
            m: (-0.049, 0.049),
            x: (0.1, 99.9),
        }
    }
}

impl ParamBounds {
    /// Bounds in optimizer order.
    pub fn as_pairs(&self) -> [(f64, f64); Params::DIM] {
        [self.theta_deg, self.m, self.x]
    }

    /// Clip a parameter vector into the box.
    pub fn clamp(&self, v: &[f64]) -> Vec<f64> {
        v.iter()
            .zip(self.as_pairs())
            .map(|(&p, (lo, hi))| p.clamp(lo, hi))
            .collect()
    }

    pub fn contains(&self, params: &Params) -> bool {
        params
            .to_vec()
            .iter()
            .zip(self.as_pairs())
            .all(|(&p, (lo, hi))| p >= lo && p <= hi)
    }

    /// Reject inverted or non-finite boxes.
    pub fn validate(&self) -> Result<(), AppError> {
        let names = ["theta_deg", "M", "X"];
        for (name, (lo, hi)) in names.iter().zip(self.as_pairs()) {
            if !(lo.is_finite() && hi.is_finite() && lo < hi) {
                return Err(AppError::input(format!(
                    "Invalid bounds for {name}: [{lo}, {hi}] (must be finite with lower < upper)."
                )));
            }
        }
        Ok(())
    }
}

/// How predicted curve samples are matched against observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LossKind {
    /// Pair the i-th uniform t sample with the i-th observation.
    #[default]
    Paired,
    /// Match every observation to its closest predicted sample.
    Nearest,
}

impl LossKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            LossKind::Paired => "paired",
            LossKind::Nearest => "nearest",
        }
    }
}

/// Local (simplex) search settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSearchOptions {
    pub max_iters: u64,
    /// Stop once the standard deviation of the simplex costs falls below this.
    pub tolerance: f64,
}

impl Default for LocalSearchOptions {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            tolerance: 1e-6,
        }
    }
}

/// Global (differential evolution) search settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalSearchOptions {
    pub max_generations: usize,
    /// Population size is `pop_size_factor * dimension`.
    pub pop_size_factor: usize,
    /// Differential weight is drawn uniformly from this range once per generation.
    pub mutation: (f64, f64),
    /// Crossover probability.
    pub recombination: f64,
    pub tol: f64,
    pub atol: f64,
    /// Refine the best member with a local search afterwards.
    pub polish: bool,
}

impl Default for GlobalSearchOptions {
    fn default() -> Self {
        Self {
            max_generations: 1000,
            pop_size_factor: 15,
            mutation: (0.5, 1.0),
            recombination: 0.7,
            tol: 1e-6,
            atol: 1e-6,
            polish: true,
        }
    }
}

/// Full configuration of a fit run.
#[derive(Debug, Clone, PartialEq)]
pub struct FitConfig {
    pub bounds: ParamBounds,
    pub initial_guess: Params,
    /// Number of uniform t samples. `None` samples one t per observation.
    pub n_samples: Option<usize>,
    pub t_min: f64,
    pub t_max: f64,
    pub n_restarts: usize,
    pub seed: u64,
    pub loss: LossKind,
    pub local: LocalSearchOptions,
    pub global: GlobalSearchOptions,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            bounds: ParamBounds::default(),
            initial_guess: Params::default(),
            n_samples: None,
            t_min: T_MIN,
            t_max: T_MAX,
            n_restarts: 10,
            seed: 42,
            loss: LossKind::Paired,
            local: LocalSearchOptions::default(),
            global: GlobalSearchOptions::default(),
        }
    }
}

/// Best-fit parameters as written to `params.json`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub theta_deg: f64,
    pub theta_rad: f64,
    #[serde(rename = "M")]
    pub m: f64,
    #[serde(rename = "X")]
    pub x: f64,
    pub l1: f64,
}

impl FitResult {
    pub fn from_params(params: Params, l1: f64) -> Self {
        Self {
            theta_deg: params.theta_deg,
            theta_rad: params.theta_rad(),
            m: params.m,
            x: params.x,
            l1,
        }
    }

    pub fn params(&self) -> Params {
        Params::new(self.theta_deg, self.m, self.x)
    }
}

/// Which search produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Local search from the configured initial guess (`index == 0`) or a random start.
    Restart { index: usize, total: usize },
    /// Differential evolution, optionally polished by a local search.
    Global { polished: bool },
}

impl std::fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CandidateSource::Restart { index, total } => write!(f, "restart {}/{}", index + 1, total),
            CandidateSource::Global { polished: true } => write!(f, "global+polish"),
            CandidateSource::Global { polished: false } => write!(f, "global"),
        }
    }
}

/// One optimizer outcome considered for the final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub source: CandidateSource,
    pub params: Params,
    pub loss: f64,
    pub iterations: u64,
    pub converged: bool,
}

/// Per-observation diagnostic row (also the `residuals.csv` schema).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidualRow {
    pub index: usize,
    pub t: f64,
    pub x_obs: f64,
    pub y_obs: f64,
    pub x_pred: f64,
    pub y_pred: f64,
    pub residual: f64,
}
