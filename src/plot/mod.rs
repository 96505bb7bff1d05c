//! Plot rendering: terminal ASCII previews and SVG diagnostic charts.

pub mod ascii;
pub mod svg;

pub use ascii::*;
pub use svg::*;

/// Which plots a run produces, and at what size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotConfig {
    /// Write `fit_plot.svg` and `residuals_plot.svg`.
    pub svg: bool,
    /// Print an ASCII preview to stdout.
    pub ascii: bool,
    pub width: usize,
    pub height: usize,
    pub curve_points: usize,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            svg: true,
            ascii: false,
            width: 100,
            height: 25,
            curve_points: DEFAULT_CURVE_POINTS,
        }
    }
}
