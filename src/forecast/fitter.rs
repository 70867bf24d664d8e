//! Model fitting.
//!
//! Given a daily history `(ds_i, y_i)` we:
//!
//! 1. scale time to `[0, 1]` over the history and `y` by `max|y|`
//! 2. build one design matrix: `[t, 1, (t - s_j)+ ..., fourier ...]`
//! 3. estimate the noise scale from a pass without changepoints
//! 4. solve once more with Gaussian priors expressed as ridge rows
//!
//! Prior scales (scaled units): `k`, `m` → 5; changepoint deltas →
//! `changepoint_prior_scale`; Fourier coefficients → `seasonality_prior_scale`.
//! With noise `σ`, a prior scale `τ` becomes the ridge penalty `σ² / τ²`.

use nalgebra::{DMatrix, DVector};
use tracing::{debug, info};

use crate::domain::{FittedModel, ForecastConfig, HistoryPoint, SeasonalityFit, SeasonalitySpec};
use crate::error::AppError;
use crate::forecast::changepoints::changepoint_indices;
use crate::forecast::seasonality::{days_since_epoch, resolve_seasonalities};
use crate::math::{fourier_row, hinge, piecewise_linear, rms, solve_least_squares, with_ridge_rows};

/// Prior scale on the base growth rate and offset.
const TREND_PRIOR_SCALE: f64 = 5.0;

/// Lower bound for the noise scale, so a perfect fit still yields finite penalties.
const SIGMA_FLOOR: f64 = 1e-6;

/// Column layout of the design matrix.
struct Layout {
    n_deltas: usize,
    seasonal: Vec<SeasonalitySpec>,
}

impl Layout {
    fn width(&self) -> usize {
        2 + self.n_deltas + self.seasonal.iter().map(|s| 2 * s.order).sum::<usize>()
    }
}

/// Fit the additive model to `history`.
pub fn fit(history: &[HistoryPoint], config: &ForecastConfig) -> Result<FittedModel, AppError> {
    validate_config(config)?;

    let mut history = history.to_vec();
    history.sort_by_key(|h| h.ds);
    history.dedup_by_key(|h| h.ds);

    if history.len() < 2 {
        return Err(AppError::new(
            3,
            format!("Need at least 2 distinct dates to forecast, got {}.", history.len()),
        ));
    }
    if history.iter().any(|h| !h.y.is_finite()) {
        return Err(AppError::new(3, "History contains non-finite values."));
    }

    let start = history[0].ds;
    let end = history[history.len() - 1].ds;
    let t_scale_days = (end - start).num_days() as f64;

    let y_max = history.iter().map(|h| h.y.abs()).fold(0.0, f64::max);
    let y_scale = if y_max > 0.0 { y_max } else { 1.0 };

    let ts: Vec<f64> = history
        .iter()
        .map(|h| (h.ds - start).num_days() as f64 / t_scale_days)
        .collect();
    let epoch_days: Vec<f64> = history.iter().map(|h| days_since_epoch(h.ds)).collect();
    let ys = DVector::from_iterator(history.len(), history.iter().map(|h| h.y / y_scale));

    let changepoints: Vec<f64> = changepoint_indices(history.len(), config.n_changepoints, config.changepoint_range)?
        .into_iter()
        .map(|i| ts[i])
        .collect();
    let seasonal = resolve_seasonalities(&history, config);

    // Pass 1: no changepoints, no priors; only used to size the noise.
    let base = Layout {
        n_deltas: 0,
        seasonal: seasonal.clone(),
    };
    let x0 = design_matrix(&base, &ts, &epoch_days, &[]);
    let beta0 = solve_least_squares(&x0, &ys)
        .ok_or_else(|| AppError::new(4, "Forecast pre-fit is numerically singular."))?;
    let sigma0 = residual_rms(&x0, &beta0, &ys).max(SIGMA_FLOOR);
    debug!(sigma0, "noise scale from pre-fit");

    // Pass 2: full model with ridge priors.
    let layout = Layout {
        n_deltas: changepoints.len(),
        seasonal,
    };
    let x = design_matrix(&layout, &ts, &epoch_days, &changepoints);
    let penalties = penalties(&layout, sigma0, config);
    let (xa, ya) = with_ridge_rows(&x, &ys, &penalties);
    let beta = solve_least_squares(&xa, &ya)
        .ok_or_else(|| AppError::new(4, "Forecast fit is numerically singular."))?;

    let sigma_obs = residual_rms(&x, &beta, &ys);
    let (k, m, deltas, seasonalities) = unpack(&layout, &beta);

    let model = FittedModel {
        history_start: start,
        history_end: end,
        history_len: history.len(),
        t_scale_days,
        y_scale,
        changepoints,
        k,
        m,
        deltas,
        seasonalities,
        sigma_obs,
        rmse: sigma_obs * y_scale,
    };

    info!(
        n = model.history_len,
        changepoints = model.changepoints.len(),
        seasonalities = model.seasonalities.len(),
        rmse = model.rmse,
        "fitted forecast model"
    );

    Ok(model)
}

fn validate_config(config: &ForecastConfig) -> Result<(), AppError> {
    if !(config.changepoint_prior_scale.is_finite() && config.changepoint_prior_scale > 0.0) {
        return Err(AppError::new(2, "changepoint prior scale must be > 0."));
    }
    if !(config.seasonality_prior_scale.is_finite() && config.seasonality_prior_scale > 0.0) {
        return Err(AppError::new(2, "seasonality prior scale must be > 0."));
    }
    if !(config.interval_width.is_finite() && config.interval_width > 0.0 && config.interval_width < 1.0) {
        return Err(AppError::new(2, "interval width must be in (0, 1)."));
    }
    Ok(())
}

fn design_matrix(layout: &Layout, ts: &[f64], epoch_days: &[f64], changepoints: &[f64]) -> DMatrix<f64> {
    let n = ts.len();
    let p = layout.width();
    let mut x = DMatrix::<f64>::zeros(n, p);
    let max_order = layout.seasonal.iter().map(|s| s.order).max().unwrap_or(0);
    let mut fourier = vec![0.0; 2 * max_order];

    for i in 0..n {
        x[(i, 0)] = ts[i];
        x[(i, 1)] = 1.0;
        for (j, &s) in changepoints.iter().take(layout.n_deltas).enumerate() {
            x[(i, 2 + j)] = hinge(ts[i], s);
        }
        let mut col = 2 + layout.n_deltas;
        for spec in &layout.seasonal {
            fourier_row(epoch_days[i], spec.period, spec.order, &mut fourier);
            for v in &fourier[..2 * spec.order] {
                x[(i, col)] = *v;
                col += 1;
            }
        }
    }
    x
}

fn penalties(layout: &Layout, sigma: f64, config: &ForecastConfig) -> Vec<f64> {
    let var = sigma * sigma;
    let mut out = Vec::with_capacity(layout.width());
    out.push(var / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE));
    out.push(var / (TREND_PRIOR_SCALE * TREND_PRIOR_SCALE));
    let cps = config.changepoint_prior_scale;
    out.extend(std::iter::repeat_n(var / (cps * cps), layout.n_deltas));
    let sps = config.seasonality_prior_scale;
    for spec in &layout.seasonal {
        out.extend(std::iter::repeat_n(var / (sps * sps), 2 * spec.order));
    }
    out
}

fn residual_rms(x: &DMatrix<f64>, beta: &DVector<f64>, y: &DVector<f64>) -> f64 {
    let fitted = x * beta;
    let resid: Vec<f64> = y.iter().zip(fitted.iter()).map(|(a, b)| a - b).collect();
    rms(&resid).unwrap_or(0.0)
}

fn unpack(layout: &Layout, beta: &DVector<f64>) -> (f64, f64, Vec<f64>, Vec<SeasonalityFit>) {
    let k = beta[0];
    let m = beta[1];
    let deltas = beta.rows(2, layout.n_deltas).iter().copied().collect();

    let mut col = 2 + layout.n_deltas;
    let mut seasonalities = Vec::with_capacity(layout.seasonal.len());
    for spec in &layout.seasonal {
        let width = 2 * spec.order;
        seasonalities.push(SeasonalityFit {
            spec: spec.clone(),
            betas: beta.rows(col, width).iter().copied().collect(),
        });
        col += width;
    }

    (k, m, deltas, seasonalities)
}

/// Scaled trend at scaled time `t`.
pub fn trend_at(model: &FittedModel, t: f64) -> f64 {
    piecewise_linear(t, model.k, model.m, &model.deltas, &model.changepoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SeasonalityToggle;
    use crate::math::fourier_value;
    use chrono::{Duration, NaiveDate};

    fn series(n: i64, f: impl Fn(i64) -> f64) -> Vec<HistoryPoint> {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        (0..n)
            .map(|i| HistoryPoint {
                ds: start + Duration::days(i),
                y: f(i),
            })
            .collect()
    }

    #[test]
    fn fits_a_straight_line() {
        let history = series(60, |i| 100.0 + 2.0 * i as f64);
        let config = ForecastConfig {
            weekly: SeasonalityToggle::Off,
            ..ForecastConfig::default()
        };
        let model = fit(&history, &config).unwrap();

        assert_eq!(model.history_len, 60);
        assert!((model.t_scale_days - 59.0).abs() < 1e-12);
        assert!(model.rmse < 1e-3, "rmse={}", model.rmse);

        // Slope in original units per day.
        let t1 = 1.0 / model.t_scale_days;
        let per_day = (trend_at(&model, t1) - trend_at(&model, 0.0)) * model.y_scale;
        assert!((per_day - 2.0).abs() < 1e-3, "per_day={per_day}");
    }

    #[test]
    fn recovers_weekly_pattern() {
        let pattern = [10.0, 20.0, 30.0, 15.0, 5.0, 25.0, 40.0];
        let history = series(140, |i| 200.0 + pattern[(i % 7) as usize]);
        let model = fit(&history, &ForecastConfig::default()).unwrap();

        let weekly = model.seasonality("weekly").unwrap();
        assert_eq!(weekly.betas.len(), 6);
        assert!(model.seasonality("yearly").is_none());

        // Day-to-day difference of the weekly component should track the pattern.
        let d0 = days_since_epoch(history[0].ds);
        let w = |d: f64| fourier_value(d, 7.0, &weekly.betas) * model.y_scale;
        let observed = pattern[6] - pattern[4];
        let fitted = w(d0 + 6.0) - w(d0 + 4.0);
        assert!((observed - fitted).abs() < 5.0, "observed={observed} fitted={fitted}");
    }

    #[test]
    fn unsorted_and_duplicate_dates_are_normalized() {
        let mut history = series(30, |i| i as f64);
        history.reverse();
        history.push(history[0]);
        let model = fit(&history, &ForecastConfig::default()).unwrap();
        assert_eq!(model.history_len, 30);
        assert_eq!(model.history_start, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
    }

    #[test]
    fn too_little_history_is_an_error() {
        let err = fit(&series(1, |_| 5.0), &ForecastConfig::default()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn invalid_interval_width_is_rejected() {
        let config = ForecastConfig {
            interval_width: 1.0,
            ..ForecastConfig::default()
        };
        assert_eq!(fit(&series(30, |i| i as f64), &config).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn all_zero_history_uses_unit_scale() {
        let model = fit(&series(20, |_| 0.0), &ForecastConfig::default()).unwrap();
        assert_eq!(model.y_scale, 1.0);
        assert!(model.rmse.abs() < 1e-9);
    }
}
