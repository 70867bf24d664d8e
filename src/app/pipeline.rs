//! Shared overview/forecast logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! - overview: select -> totals -> project columns -> group by date
//! - forecast: group whole table by date -> fit -> extend dates -> predict -> components
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::info;

use crate::domain::{
    DailyTotals, FittedModel, ForecastConfig, ForecastRow, HistoryPoint, SalesTable, Selection, Totals,
};
use crate::error::AppError;
use crate::forecast::{components, fit, make_future_dates, predict, Components};
use crate::query::{self, Projection};

/// Everything the overview page shows for one selection.
#[derive(Debug, Clone)]
pub struct OverviewOutput {
    pub selection: Selection,
    pub totals: Totals,
    pub table: Projection,
    pub series: Vec<DailyTotals>,
}

/// All computed outputs of a single forecast run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    pub config: ForecastConfig,
    pub history: Vec<HistoryPoint>,
    pub model: FittedModel,
    pub forecast: Vec<ForecastRow>,
    pub components: Components,
}

impl ForecastRun {
    /// The last `n` rows of the forecast frame.
    pub fn tail(&self, n: usize) -> &[ForecastRow] {
        let start = self.forecast.len().saturating_sub(n);
        &self.forecast[start..]
    }
}

/// Filter, aggregate, and project the table for `selection`.
pub fn run_overview(table: &SalesTable, selection: &Selection, columns: &[String]) -> Result<OverviewOutput, AppError> {
    let indices = query::resolve_columns(table, columns)?;
    let rows = query::select(table, selection);

    let totals = query::totals(&rows);
    let series = query::daily_totals(&rows);
    let projection = query::project_columns(table, &rows, &indices);

    info!(
        category = %selection.category,
        sub_category = %selection.sub_category,
        rows = totals.rows,
        "computed overview"
    );

    Ok(OverviewOutput {
        selection: selection.clone(),
        totals,
        table: projection,
        series,
    })
}

/// Fit the forecaster on the whole table's daily sales.
pub fn fit_forecast(table: &SalesTable, config: &ForecastConfig) -> Result<(Vec<HistoryPoint>, FittedModel), AppError> {
    let history = query::daily_sales(table);
    let model = fit(&history, config)?;
    Ok((history, model))
}

/// Execute the full forecast pipeline.
pub fn run_forecast(table: &SalesTable, config: &ForecastConfig) -> Result<ForecastRun, AppError> {
    let (history, model) = fit_forecast(table, config)?;
    run_forecast_with_model(history, model, config)
}

/// Predict with an already fitted model.
///
/// The fit does not depend on the horizon, so the TUI refits only once and
/// calls this whenever the years slider moves.
pub fn run_forecast_with_model(
    history: Vec<HistoryPoint>,
    model: FittedModel,
    config: &ForecastConfig,
) -> Result<ForecastRun, AppError> {
    let dates = make_future_dates(&history, config.periods());
    let forecast = predict(&model, &dates, config)?;
    let components = components(&model, &forecast);

    Ok(ForecastRun {
        config: config.clone(),
        history,
        model,
        forecast,
        components,
    })
}
