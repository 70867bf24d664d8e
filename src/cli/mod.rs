//! Command-line parsing for the sales dashboard.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the query/forecast code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{ForecastConfig, SeasonalityToggle, DEFAULT_OVERVIEW_COLUMNS, MAX_FORECAST_YEARS, MIN_FORECAST_YEARS};

pub mod picker;

/// Dataset used when neither `--data` nor `SALES_CSV` is given.
pub const DEFAULT_DATA_PATH: &str = "superstore.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "salesdash", version, about = "Sales dashboard and forecaster")]
pub struct Cli {
    /// Append logs to this file (the TUI logs nowhere else).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive dashboard.
    Tui(TuiArgs),
    /// Print totals, the selected rows, and the sales/profit chart for one selection.
    Overview(OverviewArgs),
    /// List categories and their sub-categories.
    Categories(DataArgs),
    /// Fit the forecaster on daily sales and print the forecast.
    Forecast(ForecastArgs),
    /// Plot a previously exported forecast JSON.
    Plot(PlotArgs),
}

/// Dataset location.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Sales CSV (needs Category, Sub-Category, Order Date, Sales, Profit).
    #[arg(short = 'f', long = "data", env = "SALES_CSV", value_name = "CSV")]
    pub data: Option<PathBuf>,
}

/// Sidebar equivalents.
#[derive(Debug, Args, Clone)]
pub struct SelectionArgs {
    /// Category to filter on (defaults to the first in the file).
    #[arg(short = 'c', long)]
    pub category: Option<String>,

    /// Sub-category to filter on (defaults to the first of the category).
    #[arg(short = 's', long = "sub-category")]
    pub sub_category: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct TuiArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub model: ModelArgs,
}

#[derive(Debug, Args, Clone)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Columns of the overview table (comma-separated).
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_OVERVIEW_COLUMNS.map(String::from))]
    pub columns: Vec<String>,

    /// Maximum table rows to print (0 prints all).
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the selected rows (all columns) to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}

/// Forecast model knobs.
#[derive(Debug, Args, Clone)]
pub struct ModelArgs {
    /// Years of prediction.
    #[arg(short = 'y', long, default_value_t = MIN_FORECAST_YEARS,
          value_parser = clap::value_parser!(u32).range(MIN_FORECAST_YEARS as i64..=MAX_FORECAST_YEARS as i64))]
    pub years: u32,

    /// Number of potential trend changepoints.
    #[arg(long, default_value_t = 25)]
    pub changepoints: usize,

    /// Fraction of history eligible for changepoints.
    #[arg(long, default_value_t = 0.8)]
    pub changepoint_range: f64,

    /// Prior scale of trend changes (larger = more flexible trend).
    #[arg(long, default_value_t = 0.05)]
    pub changepoint_prior_scale: f64,

    /// Prior scale of seasonal coefficients.
    #[arg(long, default_value_t = 10.0)]
    pub seasonality_prior_scale: f64,

    /// Yearly seasonality.
    #[arg(long, value_enum, default_value_t = SeasonalityToggle::Auto)]
    pub yearly: SeasonalityToggle,

    /// Weekly seasonality.
    #[arg(long, value_enum, default_value_t = SeasonalityToggle::Auto)]
    pub weekly: SeasonalityToggle,

    /// Width of the uncertainty interval.
    #[arg(long, default_value_t = 0.8)]
    pub interval_width: f64,

    /// Simulated paths for the interval (0 disables it).
    #[arg(long, default_value_t = 1000)]
    pub samples: usize,

    /// Random seed for the interval simulation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

#[derive(Debug, Args, Clone)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Rows of the forecast frame to print (from the end).
    #[arg(long, default_value_t = 5)]
    pub tail: usize,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Export the forecast frame to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export config + model + history + forecast to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

/// Options for plotting a saved forecast.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Forecast JSON file produced by `salesdash forecast --export-json`.
    #[arg(long, value_name = "JSON")]
    pub forecast: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

impl ModelArgs {
    pub fn to_config(&self) -> ForecastConfig {
        ForecastConfig {
            years: self.years,
            n_changepoints: self.changepoints,
            changepoint_range: self.changepoint_range,
            changepoint_prior_scale: self.changepoint_prior_scale,
            seasonality_prior_scale: self.seasonality_prior_scale,
            yearly: self.yearly,
            weekly: self.weekly,
            interval_width: self.interval_width,
            uncertainty_samples: self.samples,
            seed: self.seed,
            ..ForecastConfig::default()
        }
    }
}
