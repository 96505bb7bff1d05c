//! Reporting utilities: residual rows and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{LossKind, Observation, Params, ResidualRow};
use crate::error::AppError;
use crate::models::predict;

/// Pair the i-th t sample with the i-th observation and measure the gap.
///
/// Only the common prefix of `t_samples` and `observations` is reported.
pub fn compute_residual_rows(
    observations: &[Observation],
    params: &Params,
    t_samples: &[f64],
) -> Result<Vec<ResidualRow>, AppError> {
    let predicted = predict(t_samples, params);
    let mut out = Vec::with_capacity(predicted.len().min(observations.len()));
    for (index, ((&t, &(x_pred, y_pred)), o)) in t_samples.iter().zip(&predicted).zip(observations).enumerate() {
        if !(x_pred.is_finite() && y_pred.is_finite()) {
            return Err(AppError::fit("Non-finite model prediction during residual computation."));
        }
        out.push(ResidualRow {
            index,
            t,
            x_obs: o.x,
            y_obs: o.y,
            x_pred,
            y_pred,
            residual: (x_pred - o.x).hypot(y_pred - o.y),
        });
    }
    Ok(out)
}

/// Match every observation with its closest curve sample.
///
/// Rows follow observation order; `t` and the prediction come from the matched
/// sample, so the mean residual equals the nearest-point loss.
pub fn compute_nearest_residual_rows(
    observations: &[Observation],
    params: &Params,
    t_samples: &[f64],
) -> Result<Vec<ResidualRow>, AppError> {
    let predicted = predict(t_samples, params);
    if predicted.iter().any(|(x, y)| !(x.is_finite() && y.is_finite())) {
        return Err(AppError::fit("Non-finite model prediction during residual computation."));
    }
    observations
        .iter()
        .enumerate()
        .map(|(index, o)| {
            let (j, residual) = predicted
                .iter()
                .map(|&(x, y)| (x - o.x).hypot(y - o.y))
                .enumerate()
                .fold(None, |best: Option<(usize, f64)>, (j, d)| match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((j, d)),
                })
                .ok_or_else(|| AppError::fit("No curve samples to match observations against."))?;
            let (x_pred, y_pred) = predicted[j];
            Ok(ResidualRow {
                index,
                t: t_samples[j],
                x_obs: o.x,
                y_obs: o.y,
                x_pred,
                y_pred,
                residual,
            })
        })
        .collect()
}

/// Residual rows using the same matching rule as the loss.
pub fn residual_rows_for_loss(
    kind: LossKind,
    observations: &[Observation],
    params: &Params,
    t_samples: &[f64],
) -> Result<Vec<ResidualRow>, AppError> {
    match kind {
        LossKind::Paired => compute_residual_rows(observations, params, t_samples),
        LossKind::Nearest => compute_nearest_residual_rows(observations, params, t_samples),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::uniform_t_values;
    use approx::assert_relative_eq;

    #[test]
    fn residuals_are_zero_on_the_curve_and_truncate() {
        let params = Params::new(25.0, 0.01, 50.0);
        let ts = uniform_t_values(5, 6.0, 60.0);
        let mut obs: Vec<Observation> = predict(&ts, &params)
            .into_iter()
            .map(|(x, y)| Observation::new(x, y))
            .take(4)
            .collect();
        obs[1].x += 3.0;
        obs[1].y += 4.0;

        let rows = compute_residual_rows(&obs, &params, &ts).unwrap();
        assert_eq!(rows.len(), 4);
        assert_relative_eq!(rows[0].residual, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rows[1].residual, 5.0, epsilon = 1e-9);
        assert_eq!(rows[3].index, 3);
        assert_eq!(rows[3].t, ts[3]);
    }

    #[test]
    fn nearest_rows_cover_every_observation_and_match_the_loss() {
        let params = Params::new(25.0, 0.01, 50.0);
        let ts = uniform_t_values(200, 6.0, 60.0);
        let obs: Vec<Observation> = predict(&uniform_t_values(60, 6.0, 60.0), &params)
            .into_iter()
            .map(|(x, y)| Observation::new(x + 0.1, y - 0.05))
            .collect();

        let rows = residual_rows_for_loss(LossKind::Nearest, &obs, &params, &ts).unwrap();
        assert_eq!(rows.len(), 60);
        // Matches span the whole t range, not just the first 60 samples.
        assert!(rows.last().unwrap().t > 55.0);
        let mean = rows.iter().map(|r| r.residual).sum::<f64>() / rows.len() as f64;
        let loss = crate::fit::nearest_l1(&predict(&ts, &params), &obs);
        assert_relative_eq!(mean, loss, epsilon = 1e-12);

        let paired = residual_rows_for_loss(LossKind::Paired, &obs, &params, &ts).unwrap();
        assert!(paired.last().unwrap().t < 25.0);
    }
}
