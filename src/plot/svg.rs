//! Diagnostic charts written as SVG files with Plotters.
//!
//! - fit plot: observed points + fitted curve
//! - residuals plot: residual vs observation index, and residual histogram

use std::error::Error;
use std::path::Path;

use plotters::prelude::*;

use crate::domain::{Observation, Params, ResidualRow};
use crate::error::AppError;
use crate::io::ensure_parent_dir;
use crate::math::{histogram, mean, min_max, uniform_t_values};
use crate::models::predict;

/// Number of curve samples drawn in the fit plot.
pub const DEFAULT_CURVE_POINTS: usize = 500;
/// Histogram bins in the residuals plot.
pub const RESIDUAL_BINS: usize = 30;

const FIT_SIZE: (u32, u32) = (1000, 800);
const RESIDUALS_SIZE: (u32, u32) = (1400, 500);

type DrawResult = Result<(), Box<dyn Error>>;

/// Render the observations and the fitted curve sampled over `t_range`.
pub fn render_fit_plot(
    path: &Path,
    observations: &[Observation],
    params: &Params,
    t_range: (f64, f64),
    n_curve_points: usize,
) -> Result<(), AppError> {
    ensure_parent_dir(path)?;
    let ts = uniform_t_values(n_curve_points.max(2), t_range.0, t_range.1);
    let curve = predict(&ts, params);
    draw_fit(path, observations, &curve)
        .map_err(|e| AppError::output(format!("Failed to render fit plot '{}': {e}", path.display())))
}

/// Render residual diagnostics: residual vs index and a residual histogram.
pub fn render_residuals_plot(path: &Path, rows: &[ResidualRow]) -> Result<(), AppError> {
    if rows.is_empty() {
        return Err(AppError::output("No residuals to plot."));
    }
    ensure_parent_dir(path)?;
    let residuals: Vec<f64> = rows.iter().map(|r| r.residual).collect();
    draw_residuals(path, &residuals)
        .map_err(|e| AppError::output(format!("Failed to render residuals plot '{}': {e}", path.display())))
}

fn draw_fit(path: &Path, observations: &[Observation], curve: &[(f64, f64)]) -> DrawResult {
    let xs = observations.iter().map(|o| o.x).chain(curve.iter().map(|&(x, _)| x));
    let ys = observations.iter().map(|o| o.y).chain(curve.iter().map(|&(_, y)| y));
    let (x0, x1) = padded(min_max(xs));
    let (y0, y1) = padded(min_max(ys));

    let root = SVGBackend::new(path, FIT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Parametric Curve Fit", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("x")
        .y_desc("y")
        .light_line_style(BLACK.mix(0.05))
        .draw()?;

    chart
        .draw_series(
            observations
                .iter()
                .map(|o| Circle::new((o.x, o.y), 3, BLUE.mix(0.5).filled())),
        )?
        .label("Observed Data")
        .legend(|(x, y)| Circle::new((x, y), 3, BLUE.filled()));

    chart
        .draw_series(LineSeries::new(
            curve.iter().copied().filter(|(x, y)| x.is_finite() && y.is_finite()),
            RED.stroke_width(2),
        ))?
        .label("Fitted Curve")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn draw_residuals(path: &Path, residuals: &[f64]) -> DrawResult {
    let root = SVGBackend::new(path, RESIDUALS_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let panels = root.split_evenly((1, 2));

    // Left: residual vs index.
    let n = residuals.len() as f64;
    let (r0, r1) = padded(min_max(residuals.iter().copied()));
    let mut by_index = ChartBuilder::on(&panels[0])
        .caption("Residuals vs Data Point", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5..(n - 0.5).max(0.5), r0..r1)?;
    by_index
        .configure_mesh()
        .x_desc("Data Point Index")
        .y_desc("Residual Distance")
        .light_line_style(BLACK.mix(0.05))
        .draw()?;
    by_index.draw_series(LineSeries::new(
        residuals.iter().enumerate().map(|(i, &r)| (i as f64, r)),
        BLUE.mix(0.6).stroke_width(1),
    ))?;
    by_index.draw_series(
        residuals
            .iter()
            .enumerate()
            .map(|(i, &r)| Circle::new((i as f64, r), 2, BLUE.mix(0.6).filled())),
    )?;

    // Right: histogram with the mean marked.
    let (edges, counts) = histogram(residuals, RESIDUAL_BINS).ok_or("no finite residuals")?;
    let max_count = counts.iter().copied().max().unwrap_or(0) as f64;
    let lo = edges[0];
    let hi = edges[edges.len() - 1];
    let mut hist = ChartBuilder::on(&panels[1])
        .caption("Residual Distribution", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..hi, 0.0..(max_count * 1.1).max(1.0))?;
    hist.configure_mesh()
        .x_desc("Residual Distance")
        .y_desc("Frequency")
        .light_line_style(BLACK.mix(0.05))
        .draw()?;
    let bar_style = RGBColor(135, 206, 235).mix(0.7).filled();
    hist.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        Rectangle::new([(edges[i], 0.0), (edges[i + 1], c as f64)], bar_style)
    }))?;
    hist.draw_series(counts.iter().enumerate().map(|(i, &c)| {
        Rectangle::new([(edges[i], 0.0), (edges[i + 1], c as f64)], BLACK.stroke_width(1))
    }))?;

    if let Some(m) = mean(residuals) {
        hist.draw_series(LineSeries::new(
            [(m, 0.0), (m, (max_count * 1.1).max(1.0))],
            RED.stroke_width(2),
        ))?
        .label(format!("Mean: {m:.4}"))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        hist.configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

fn padded(range: Option<(f64, f64)>) -> (f64, f64) {
    let (lo, hi) = match range {
        Some((lo, hi)) if hi > lo => (lo, hi),
        Some((lo, _)) => (lo - 0.5, lo + 0.5),
        None => (0.0, 1.0),
    };
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("pcfit-svg-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn fit_plot_writes_an_svg() {
        let params = Params::new(25.0, 0.01, 50.0);
        let ts = uniform_t_values(20, 6.0, 60.0);
        let obs: Vec<Observation> = predict(&ts, &params)
            .into_iter()
            .map(|(x, y)| Observation::new(x, y))
            .collect();
        let path = temp_path("fit_plot.svg");
        render_fit_plot(&path, &obs, &params, (6.0, 60.0), 100).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Parametric Curve Fit"));
    }

    #[test]
    fn residuals_plot_writes_an_svg() {
        let rows: Vec<ResidualRow> = (0..40)
            .map(|i| ResidualRow {
                index: i,
                t: i as f64,
                x_obs: 0.0,
                y_obs: 0.0,
                x_pred: 0.0,
                y_pred: 0.0,
                residual: (i % 7) as f64 * 0.1,
            })
            .collect();
        let path = temp_path("residuals_plot.svg");
        render_residuals_plot(&path, &rows).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("Residual Distribution"));
    }

    #[test]
    fn empty_residuals_are_rejected() {
        let err = render_residuals_plot(&temp_path("empty.svg"), &[]).unwrap_err();
        assert_eq!(err.exit_code(), AppError::OUTPUT);
    }

    #[test]
    fn padded_handles_degenerate_ranges() {
        let (lo, hi) = padded(None);
        assert!((lo + 0.05).abs() < 1e-12 && (hi - 1.05).abs() < 1e-12);
        let (lo, hi) = padded(Some((2.0, 2.0)));
        assert!(lo < 2.0 && hi > 2.0);
    }
}
