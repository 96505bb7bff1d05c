//! Formatted terminal output.
//!
//! Formatting lives in one place so the math/fitting code stays clean and
//! output changes are localized.

use crate::domain::{FitConfig, FitResult};
use crate::fit::FitOutcome;
use crate::io::ingest::DatasetStats;

/// Format the full run summary (dataset stats + every candidate + chosen parameters).
pub fn format_run_summary(stats: &DatasetStats, outcome: &FitOutcome, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== pcfit - Parametric Curve Fit ===\n");
    out.push_str(&format!(
        "Points: n={} | x=[{:.3}, {:.3}] | y=[{:.3}, {:.3}]\n",
        stats.n_points, stats.x_min, stats.x_max, stats.y_min, stats.y_max
    ));
    out.push_str(&format!(
        "Sampling: {} t values in [{}, {}] | loss={} | seed={}\n",
        outcome.t_samples.len(),
        config.t_min,
        config.t_max,
        config.loss.display_name(),
        config.seed
    ));

    out.push_str("\nCandidates:\n");
    out.push_str(&format!(
        "  {:<14} {:>10} {:>10} {:>10} {:>12} {:>8}\n",
        "source", "theta_deg", "M", "X", "L1", "iters"
    ));
    for (i, c) in outcome.candidates.iter().enumerate() {
        let chosen = if i == outcome.best_index { "*" } else { " " };
        let flag = if c.converged { "" } else { " (not converged)" };
        out.push_str(&format!(
            "{chosen} {:<14} {:>10.4} {:>10.6} {:>10.4} {:>12.6} {:>8}{flag}\n",
            c.source.to_string(),
            c.params.theta_deg,
            c.params.m,
            c.params.x,
            c.loss,
            c.iterations,
        ));
    }

    out.push('\n');
    out.push_str(&format_result(&outcome.best));
    out
}

/// Format the chosen parameters.
pub fn format_result(result: &FitResult) -> String {
    format!(
        "Result:\n- theta = {:.4} deg ({:.6} rad)\n- M     = {:.6}\n- X     = {:.4}\n- L1    = {:.6}\n",
        result.theta_deg, result.theta_rad, result.m, result.x, result.l1
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Candidate, CandidateSource, Params};

    #[test]
    fn summary_marks_the_winner() {
        let stats = DatasetStats { n_points: 3, x_min: 0.0, x_max: 1.0, y_min: 2.0, y_max: 3.0 };
        let mk = |index: usize, loss: f64| Candidate {
            source: CandidateSource::Restart { index, total: 2 },
            params: Params::default(),
            loss,
            iterations: 10,
            converged: index == 0,
        };
        let outcome = FitOutcome {
            best: FitResult::from_params(Params::default(), 0.5),
            candidates: vec![mk(0, 1.0), mk(1, 0.5)],
            best_index: 1,
            t_samples: vec![6.0, 33.0, 60.0],
        };
        let txt = format_run_summary(&stats, &outcome, &FitConfig::default());

        assert!(txt.contains("Points: n=3"));
        assert!(txt.contains("* restart 2/2"));
        assert!(txt.contains("  restart 1/2"));
        assert!(txt.contains("(not converged)"));
        assert!(txt.contains("- theta = 25.0000 deg (0.436332 rad)"));
    }
}
