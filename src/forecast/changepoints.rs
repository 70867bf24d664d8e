//! Trend changepoint placement.
//!
//! Potential changepoints sit at evenly spaced history indices inside the
//! first `range` fraction of the history. The trend is allowed to bend at each
//! of them; the ridge prior in the fitter decides how much it actually does.

use crate::error::AppError;

/// History indices at which trend changepoints are placed.
///
/// With `hist = floor(n * range)` rows eligible, at most `hist - 1`
/// changepoints are used; the first eligible index (the history start) is
/// never a changepoint.
pub fn changepoint_indices(n: usize, n_changepoints: usize, range: f64) -> Result<Vec<usize>, AppError> {
    if !(range.is_finite() && range > 0.0 && range <= 1.0) {
        return Err(AppError::new(
            2,
            format!("Invalid changepoint range: {range} (must be in (0, 1])."),
        ));
    }

    let hist = (n as f64 * range).floor() as usize;
    let count = n_changepoints.min(hist.saturating_sub(1));
    if count == 0 {
        return Ok(Vec::new());
    }

    let last = (hist - 1) as f64;
    let step = last / count as f64;
    Ok((1..=count).map(|i| (step * i as f64).round() as usize).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_stay_inside_the_range() {
        let idx = changepoint_indices(100, 25, 0.8).unwrap();
        assert_eq!(idx.len(), 25);
        assert_eq!(*idx.last().unwrap(), 79);
        assert!(idx.windows(2).all(|w| w[0] < w[1]));
        assert!(idx[0] > 0);
    }

    #[test]
    fn short_history_gets_fewer_changepoints() {
        assert_eq!(changepoint_indices(10, 25, 0.8).unwrap(), (1..=7).collect::<Vec<_>>());
        assert!(changepoint_indices(2, 25, 0.8).unwrap().is_empty());
        assert!(changepoint_indices(100, 0, 0.8).unwrap().is_empty());
    }

    #[test]
    fn invalid_range_is_rejected() {
        assert!(changepoint_indices(100, 25, 0.0).is_err());
        assert!(changepoint_indices(100, 25, 1.5).is_err());
    }
}
