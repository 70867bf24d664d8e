//! Small descriptive statistics helpers.

use std::cmp::Ordering;

/// Linear-interpolated quantile (`q` in `[0, 1]`), sorting `values` in place.
pub fn quantile_mut(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let q = q.clamp(0.0, 1.0);
    let pos = q * (values.len() as f64 - 1.0);
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(values[lo] + (values[hi] - values[lo]) * frac)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Root mean square of `values`.
pub fn rms(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some((values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantile_interpolates() {
        let mut v = vec![4.0, 1.0, 3.0, 2.0];
        assert_eq!(quantile_mut(&mut v, 0.0), Some(1.0));
        assert_eq!(quantile_mut(&mut v, 1.0), Some(4.0));
        assert_eq!(quantile_mut(&mut v, 0.5), Some(2.5));
        let mut empty: Vec<f64> = Vec::new();
        assert_eq!(quantile_mut(&mut empty, 0.5), None);
    }

    #[test]
    fn rms_and_mean() {
        assert_eq!(mean(&[1.0, 3.0]), Some(2.0));
        assert_eq!(rms(&[3.0, -3.0]), Some(3.0));
        assert_eq!(rms(&[]), None);
    }
}
