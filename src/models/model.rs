//! Curve evaluation.
//!
//! ```text
//! x(t) = t·cos θ − e^{M·|t|}·sin(0.3·t)·sin θ + X
//! y(t) = 42 + t·sin θ + e^{M·|t|}·sin(0.3·t)·cos θ
//! ```
//!
//! θ is supplied in degrees.

use crate::domain::Params;

/// Constant vertical offset of the curve.
pub const Y_OFFSET: f64 = 42.0;

/// Angular frequency of the oscillating term.
const OSC_FREQ: f64 = 0.3;

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Evaluate `(x(t), y(t))` for a single `t`.
pub fn predict_point(t: f64, params: &Params) -> (f64, f64) {
    let (sin_theta, cos_theta) = deg_to_rad(params.theta_deg).sin_cos();
    curve_point(t, sin_theta, cos_theta, params)
}

/// Evaluate the curve at every `t`, preserving order.
pub fn predict(ts: &[f64], params: &Params) -> Vec<(f64, f64)> {
    // Trig of θ is hoisted out of the loop; this runs inside every cost evaluation.
    let (sin_theta, cos_theta) = deg_to_rad(params.theta_deg).sin_cos();
    ts.iter()
        .map(|&t| curve_point(t, sin_theta, cos_theta, params))
        .collect()
}

fn curve_point(t: f64, sin_theta: f64, cos_theta: f64, params: &Params) -> (f64, f64) {
    let wave = (params.m * t.abs()).exp() * (OSC_FREQ * t).sin();
    (
        t * cos_theta - wave * sin_theta + params.x,
        Y_OFFSET + t * sin_theta + wave * cos_theta,
    )
}
