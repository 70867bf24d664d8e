//! Prediction and interval simulation.
//!
//! Point estimates come straight from the fitted coefficients. Interval
//! bounds come from simulated paths:
//!
//! - past the history, new trend changes arrive as a Poisson process with
//!   the historical changepoint rate; their sizes are Laplace(0, mean|δ|)
//! - every path adds Normal(0, σ) observation noise
//!
//! Paths are independent, so they are generated in parallel, each with its own
//! RNG seeded from `(seed, path index)`. The result does not depend on the
//! number of threads.

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson, Uniform};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::domain::{FittedModel, ForecastConfig, ForecastRow, HistoryPoint};
use crate::error::AppError;
use crate::forecast::fitter::trend_at;
use crate::forecast::seasonality::{days_since_epoch, WEEKLY, YEARLY};
use crate::math::{fourier_value, hinge, mean, quantile_mut};

/// History dates followed by `periods` consecutive days after the last one.
pub fn make_future_dates(history: &[HistoryPoint], periods: usize) -> Vec<NaiveDate> {
    let mut dates: Vec<NaiveDate> = history.iter().map(|h| h.ds).collect();
    dates.sort();
    dates.dedup();
    if let Some(&last) = dates.last() {
        dates.extend((1..=periods as i64).map(|d| last + Duration::days(d)));
    }
    dates
}

/// Predict every date in `dates` (point estimates plus interval bounds).
pub fn predict(model: &FittedModel, dates: &[NaiveDate], config: &ForecastConfig) -> Result<Vec<ForecastRow>, AppError> {
    let ts: Vec<f64> = dates.iter().map(|d| scaled_time(model, *d)).collect();

    let mut rows: Vec<ForecastRow> = dates
        .iter()
        .zip(&ts)
        .map(|(&ds, &t)| point_row(model, ds, t))
        .collect();

    if config.uncertainty_samples > 0 && !rows.is_empty() {
        let bounds = simulate_bounds(model, &ts, &rows, config)?;
        for (row, b) in rows.iter_mut().zip(bounds) {
            row.trend_lower = b.trend_lower;
            row.trend_upper = b.trend_upper;
            row.yhat_lower = b.yhat_lower;
            row.yhat_upper = b.yhat_upper;
        }
    }

    info!(
        rows = rows.len(),
        samples = config.uncertainty_samples,
        "predicted forecast frame"
    );
    Ok(rows)
}

/// Time on the model's scaled axis (0 at history start, 1 at history end).
pub fn scaled_time(model: &FittedModel, date: NaiveDate) -> f64 {
    (date - model.history_start).num_days() as f64 / model.t_scale_days
}

/// Seasonal component `name` at `date`, in original units (0 if not fitted).
pub fn seasonal_at(model: &FittedModel, name: &str, date: NaiveDate) -> f64 {
    model
        .seasonality(name)
        .map(|s| fourier_value(days_since_epoch(date), s.spec.period, &s.betas) * model.y_scale)
        .unwrap_or(0.0)
}

fn point_row(model: &FittedModel, ds: NaiveDate, t: f64) -> ForecastRow {
    let trend = trend_at(model, t) * model.y_scale;
    let weekly = seasonal_at(model, WEEKLY, ds);
    let yearly = seasonal_at(model, YEARLY, ds);
    let additive_terms = weekly + yearly;
    let yhat = trend + additive_terms;
    ForecastRow {
        ds,
        trend,
        trend_lower: trend,
        trend_upper: trend,
        yhat_lower: yhat,
        yhat_upper: yhat,
        weekly,
        yearly,
        additive_terms,
        yhat,
    }
}

struct Bounds {
    trend_lower: f64,
    trend_upper: f64,
    yhat_lower: f64,
    yhat_upper: f64,
}

/// One simulated path: trend and yhat for every row (original units).
struct Path {
    trend: Vec<f64>,
    yhat: Vec<f64>,
}

fn simulate_bounds(
    model: &FittedModel,
    ts: &[f64],
    rows: &[ForecastRow],
    config: &ForecastConfig,
) -> Result<Vec<Bounds>, AppError> {
    let noise = Normal::new(0.0, model.sigma_obs.max(0.0))
        .map_err(|e| AppError::new(4, format!("Invalid noise scale {}: {e}", model.sigma_obs)))?;

    let t_max = ts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let change_scale = mean(&model.deltas.iter().map(|d| d.abs()).collect::<Vec<_>>()).unwrap_or(0.0) + 1e-8;
    let change_rate = model.changepoints.len() as f64;
    debug!(t_max, change_rate, change_scale, "simulating forecast paths");

    let paths: Vec<Path> = (0..config.uncertainty_samples)
        .into_par_iter()
        .map(|s| {
            let mut rng = StdRng::seed_from_u64(path_seed(config.seed, s));
            simulate_path(model, ts, rows, &noise, t_max, change_rate, change_scale, &mut rng)
        })
        .collect();

    let lo_q = (1.0 - config.interval_width) / 2.0;
    let hi_q = (1.0 + config.interval_width) / 2.0;

    let bounds = (0..rows.len())
        .into_par_iter()
        .map(|i| {
            let mut trend: Vec<f64> = paths.iter().map(|p| p.trend[i]).collect();
            let mut yhat: Vec<f64> = paths.iter().map(|p| p.yhat[i]).collect();
            let trend_lower = quantile_mut(&mut trend, lo_q).unwrap_or(rows[i].trend);
            let trend_upper = quantile_mut(&mut trend, hi_q).unwrap_or(rows[i].trend);
            let yhat_lower = quantile_mut(&mut yhat, lo_q).unwrap_or(rows[i].yhat);
            let yhat_upper = quantile_mut(&mut yhat, hi_q).unwrap_or(rows[i].yhat);
            Bounds {
                trend_lower,
                trend_upper,
                yhat_lower,
                yhat_upper,
            }
        })
        .collect();

    Ok(bounds)
}

#[allow(clippy::too_many_arguments)]
fn simulate_path(
    model: &FittedModel,
    ts: &[f64],
    rows: &[ForecastRow],
    noise: &Normal<f64>,
    t_max: f64,
    change_rate: f64,
    change_scale: f64,
    rng: &mut StdRng,
) -> Path {
    let changes = sample_future_changes(t_max, change_rate, change_scale, rng);

    let mut trend = Vec::with_capacity(ts.len());
    let mut yhat = Vec::with_capacity(ts.len());
    for (row, &t) in rows.iter().zip(ts) {
        let shift: f64 = changes.iter().map(|&(s, d)| d * hinge(t, s)).sum();
        let tr = row.trend + shift * model.y_scale;
        trend.push(tr);
        yhat.push(tr + row.additive_terms + noise.sample(rng) * model.y_scale);
    }
    Path { trend, yhat }
}

/// New `(location, delta)` trend changes beyond the history (`t > 1`).
fn sample_future_changes(t_max: f64, rate: f64, scale: f64, rng: &mut StdRng) -> Vec<(f64, f64)> {
    let expected = rate * (t_max - 1.0);
    if !(expected > 0.0 && expected.is_finite()) {
        return Vec::new();
    }
    let Ok(poisson) = Poisson::new(expected) else {
        return Vec::new();
    };
    let Ok(magnitude) = Exp::new(1.0 / scale) else {
        return Vec::new();
    };
    let location = Uniform::new(1.0, t_max);

    let n: f64 = poisson.sample(rng);
    (0..n as usize)
        .map(|_| {
            let s = location.sample(rng);
            // Laplace(0, scale) as a symmetric exponential.
            let d: f64 = magnitude.sample(rng);
            (s, if rng.gen_bool(0.5) { d } else { -d })
        })
        .collect()
}

fn path_seed(seed: u64, path: usize) -> u64 {
    seed ^ (path as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::fitter::fit;
    use chrono::NaiveDate;

    fn history(n: i64) -> Vec<HistoryPoint> {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let pattern = [3.0, -1.0, 0.5, 2.0, -4.0, 1.0, -1.5];
        (0..n)
            .map(|i| {
                // Deterministic wiggle so the fit has non-zero noise.
                let wiggle = ((i * 37) % 11) as f64 - 5.0;
                HistoryPoint {
                    ds: start + Duration::days(i),
                    y: 100.0 + 0.5 * i as f64 + pattern[(i % 7) as usize] + wiggle,
                }
            })
            .collect()
    }

    #[test]
    fn future_dates_extend_daily() {
        let h = history(10);
        let dates = make_future_dates(&h, 365);
        assert_eq!(dates.len(), 375);
        assert_eq!(dates[10], h[9].ds + Duration::days(1));
        assert_eq!(*dates.last().unwrap(), h[9].ds + Duration::days(365));
    }

    #[test]
    fn components_add_up_and_bounds_bracket() {
        let h = history(120);
        let config = ForecastConfig {
            uncertainty_samples: 200,
            ..ForecastConfig::default()
        };
        let model = fit(&h, &config).unwrap();
        let dates = make_future_dates(&h, 60);
        let rows = predict(&model, &dates, &config).unwrap();

        assert_eq!(rows.len(), 180);
        for r in &rows {
            assert!((r.yhat - (r.trend + r.weekly + r.yearly)).abs() < 1e-9);
            assert!((r.additive_terms - (r.weekly + r.yearly)).abs() < 1e-9);
            assert!(r.yhat_lower <= r.yhat_upper);
            assert!(r.trend_lower <= r.trend + 1e-9 && r.trend <= r.trend_upper + 1e-9);
        }

        // Inside the history there are no simulated trend changes.
        let first = &rows[0];
        assert!((first.trend_upper - first.trend_lower).abs() < 1e-9);

        // Trend uncertainty grows with the horizon.
        let near = &rows[121];
        let far = rows.last().unwrap();
        assert!(far.trend_upper - far.trend_lower >= near.trend_upper - near.trend_lower);
    }

    #[test]
    fn simulation_is_deterministic_for_a_seed() {
        let h = history(90);
        let config = ForecastConfig {
            uncertainty_samples: 100,
            ..ForecastConfig::default()
        };
        let model = fit(&h, &config).unwrap();
        let dates = make_future_dates(&h, 30);
        let a = predict(&model, &dates, &config).unwrap();
        let b = predict(&model, &dates, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn zero_samples_collapse_bounds() {
        let h = history(40);
        let config = ForecastConfig {
            uncertainty_samples: 0,
            ..ForecastConfig::default()
        };
        let model = fit(&h, &config).unwrap();
        let rows = predict(&model, &make_future_dates(&h, 10), &config).unwrap();
        assert!(rows.iter().all(|r| r.yhat_lower == r.yhat && r.yhat_upper == r.yhat));
    }
}
