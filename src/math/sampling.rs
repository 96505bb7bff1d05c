//! Uniform sampling of the curve parameter `t`.

/// `n` evenly spaced values in `[t_min, t_max]`, endpoints inclusive.
///
/// `n == 1` yields `[t_min]`; `n == 0` yields an empty vector.
pub fn uniform_t_values(n: usize, t_min: f64, t_max: f64) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![t_min],
        _ => {
            let step = (t_max - t_min) / (n as f64 - 1.0);
            (0..n)
                .map(|i| if i == n - 1 { t_max } else { t_min + step * i as f64 })
                .collect()
        }
    }
}
