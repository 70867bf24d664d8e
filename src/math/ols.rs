//! Least squares solver.
//!
//! The forecaster solves one regression of the form
//!
//! ```text
//! minimize Σ (y_i - x_i^T β)^2 + Σ λ_j β_j^2
//! ```
//!
//! where the ridge terms are appended to the design matrix as extra rows
//! (`sqrt(λ_j)` on the diagonal, target 0). The result is an ordinary, tall
//! least-squares problem.
//!
//! We use SVD because the design matrix is tall (more rows than columns), and
//! Fourier/changepoint columns can be close to collinear on short histories.
//! (Nalgebra's `QR::solve` is intended for square systems and will panic for
//! non-square matrices.)

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Append ridge rows `sqrt(λ_j) * e_j` (target 0) below a design matrix.
///
/// `penalties` must have one entry per column; a zero leaves that column free.
pub fn with_ridge_rows(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    penalties: &[f64],
) -> (DMatrix<f64>, DVector<f64>) {
    let (n, p) = x.shape();
    let extra: Vec<usize> = (0..p).filter(|&j| penalties.get(j).copied().unwrap_or(0.0) > 0.0).collect();

    let mut xa = DMatrix::<f64>::zeros(n + extra.len(), p);
    xa.view_mut((0, 0), (n, p)).copy_from(x);
    let mut ya = DVector::<f64>::zeros(n + extra.len());
    ya.rows_mut(0, n).copy_from(y);

    for (row, &j) in extra.iter().enumerate() {
        xa[(n + row, j)] = penalties[j].sqrt();
    }

    (xa, ya)
}
