//! Basis functions for the additive forecast model.
//!
//! - Fourier terms for seasonality:
//!   `sin(2π n t / P)`, `cos(2π n t / P)` for `n = 1..=order`
//! - hinge terms for the piecewise-linear trend: `(t - s)+`

use std::f64::consts::PI;

/// Fill `out` with the `2 * order` Fourier features of `t_days` for period `period`.
///
/// Layout: `[sin(1), cos(1), sin(2), cos(2), ...]`.
///
/// # Panics
/// Panics if `out.len() < 2 * order`.
pub fn fourier_row(t_days: f64, period: f64, order: usize, out: &mut [f64]) {
    for n in 0..order {
        let x = 2.0 * PI * (n as f64 + 1.0) * t_days / period;
        out[2 * n] = x.sin();
        out[2 * n + 1] = x.cos();
    }
}

/// Evaluate a Fourier series with coefficients laid out as in `fourier_row`.
pub fn fourier_value(t_days: f64, period: f64, betas: &[f64]) -> f64 {
    let order = betas.len() / 2;
    let mut acc = 0.0;
    for n in 0..order {
        let x = 2.0 * PI * (n as f64 + 1.0) * t_days / period;
        acc += betas[2 * n] * x.sin() + betas[2 * n + 1] * x.cos();
    }
    acc
}

/// Hinge `(t - s)+`.
pub fn hinge(t: f64, s: f64) -> f64 {
    (t - s).max(0.0)
}

/// Piecewise-linear trend `k t + m + Σ δ_j (t - s_j)+`.
pub fn piecewise_linear(t: f64, k: f64, m: f64, deltas: &[f64], changepoints: &[f64]) -> f64 {
    let mut y = k * t + m;
    for (d, &s) in deltas.iter().zip(changepoints) {
        y += d * hinge(t, s);
    }
    y
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fourier_is_periodic() {
        let betas = [0.3, -1.2, 0.5, 0.25];
        let a = fourier_value(3.0, 7.0, &betas);
        let b = fourier_value(10.0, 7.0, &betas);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn fourier_row_matches_value() {
        let betas = [0.3, -1.2, 0.5, 0.25, 2.0, -0.1];
        let mut row = [0.0; 6];
        fourier_row(123.4, 365.25, 3, &mut row);
        let dot: f64 = row.iter().zip(betas.iter()).map(|(a, b)| a * b).sum();
        assert!((dot - fourier_value(123.4, 365.25, &betas)).abs() < 1e-12);
    }

    #[test]
    fn piecewise_linear_bends_at_changepoints() {
        // slope 1 until 0.5, then slope 3
        let y0 = piecewise_linear(0.25, 1.0, 0.0, &[2.0], &[0.5]);
        let y1 = piecewise_linear(0.75, 1.0, 0.0, &[2.0], &[0.5]);
        assert!((y0 - 0.25).abs() < 1e-12);
        assert!((y1 - (0.75 + 0.5)).abs() < 1e-12);
    }
}
