//! Shared domain types.
//!
//! These types are intentionally kept lightweight; the forecast-side ones are
//! serializable so a run can be exported to JSON and plotted again later.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const COL_CATEGORY: &str = "Category";
pub const COL_SUB_CATEGORY: &str = "Sub-Category";
pub const COL_ORDER_DATE: &str = "Order Date";
pub const COL_SALES: &str = "Sales";
pub const COL_PROFIT: &str = "Profit";

/// Columns the overview table shows until the user picks others.
pub const DEFAULT_OVERVIEW_COLUMNS: [&str; 4] = [COL_CATEGORY, COL_SUB_CATEGORY, COL_SALES, COL_PROFIT];

/// Horizon limits offered by the forecast page (years).
pub const MIN_FORECAST_YEARS: u32 = 1;
pub const MAX_FORECAST_YEARS: u32 = 4;

/// One parsed row of the sales CSV.
#[derive(Debug, Clone)]
pub struct SalesRecord {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub category: String,
    pub sub_category: String,
    pub order_date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
    /// Every raw field of the row, aligned with `SalesTable::columns`.
    pub fields: Vec<String>,
}

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// The whole dataset, loaded once at startup.
#[derive(Debug, Clone)]
pub struct SalesTable {
    pub source: PathBuf,
    /// Header names as spelled in the file (BOM stripped, trimmed).
    pub columns: Vec<String>,
    pub records: Vec<SalesRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

impl SalesTable {
    /// Position of a column by name (case-insensitive).
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = name.trim();
        self.columns.iter().position(|c| c.eq_ignore_ascii_case(wanted))
    }

    pub fn rows_used(&self) -> usize {
        self.records.len()
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.order_date).min()?;
        let last = self.records.iter().map(|r| r.order_date).max()?;
        Some((first, last))
    }
}

/// The two cascading sidebar choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub category: String,
    pub sub_category: String,
}

/// Headline metrics for a filtered view.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    pub sales: f64,
    pub profit: f64,
    pub rows: usize,
}

/// Per-date sums of the two numeric columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyTotals {
    pub date: NaiveDate,
    pub sales: f64,
    pub profit: f64,
}

/// One observation of the series the forecaster is fitted on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub ds: NaiveDate,
    pub y: f64,
}

/// Whether a seasonal component is included in the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalityToggle {
    /// Decide from the span and spacing of the history.
    Auto,
    On,
    Off,
}

/// Forecast run settings.
///
/// Derived from CLI flags (plus defaults); the TUI only changes `years`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Horizon in years; each year is 365 daily periods.
    pub years: u32,
    pub n_changepoints: usize,
    /// Fraction of the history in which changepoints may be placed.
    pub changepoint_range: f64,
    pub changepoint_prior_scale: f64,
    pub seasonality_prior_scale: f64,
    pub yearly: SeasonalityToggle,
    pub weekly: SeasonalityToggle,
    pub yearly_order: usize,
    pub weekly_order: usize,
    pub interval_width: f64,
    /// Number of simulated paths behind the interval bounds (0 disables them).
    pub uncertainty_samples: usize,
    pub seed: u64,
}

impl ForecastConfig {
    pub fn periods(&self) -> usize {
        self.years as usize * 365
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            years: MIN_FORECAST_YEARS,
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            yearly: SeasonalityToggle::Auto,
            weekly: SeasonalityToggle::Auto,
            yearly_order: 10,
            weekly_order: 3,
            interval_width: 0.8,
            uncertainty_samples: 1000,
            seed: 42,
        }
    }
}

/// A Fourier seasonality term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalitySpec {
    pub name: String,
    /// Period in days.
    pub period: f64,
    pub order: usize,
}

/// A seasonality term with its fitted coefficients (`2 * order` of them).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonalityFit {
    pub spec: SeasonalitySpec,
    pub betas: Vec<f64>,
}

/// Fitted additive model parameters.
///
/// Trend and seasonal coefficients live on the scaled axis: time is mapped to
/// `[0, 1]` over the history and `y` is divided by `y_scale`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    pub history_start: NaiveDate,
    pub history_end: NaiveDate,
    pub history_len: usize,
    /// History span in days (the unit of scaled time).
    pub t_scale_days: f64,
    pub y_scale: f64,
    /// Changepoint locations on the scaled time axis.
    pub changepoints: Vec<f64>,
    pub k: f64,
    pub m: f64,
    pub deltas: Vec<f64>,
    pub seasonalities: Vec<SeasonalityFit>,
    /// Observation noise (scaled units).
    pub sigma_obs: f64,
    /// In-sample RMSE in original units.
    pub rmse: f64,
}

impl FittedModel {
    pub fn seasonality(&self, name: &str) -> Option<&SeasonalityFit> {
        self.seasonalities.iter().find(|s| s.spec.name == name)
    }
}

/// One row of the forecast frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub ds: NaiveDate,
    pub trend: f64,
    pub trend_lower: f64,
    pub trend_upper: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
    pub weekly: f64,
    pub yearly: f64,
    pub additive_terms: f64,
    pub yhat: f64,
}

/// A saved forecast file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastFile {
    pub tool: String,
    pub source: PathBuf,
    pub config: ForecastConfig,
    pub model: FittedModel,
    pub history: Vec<HistoryPoint>,
    pub forecast: Vec<ForecastRow>,
}
