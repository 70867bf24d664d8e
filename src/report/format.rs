//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the query/forecast code stays clean and testable
//! - output changes are localized

use chrono::Weekday;

use crate::app::pipeline::{ForecastRun, OverviewOutput};
use crate::domain::{FittedModel, ForecastConfig, ForecastRow, SalesTable};
use crate::forecast::Components;
use crate::query::{self, Projection};

/// Widest cell printed in the overview table.
const MAX_CELL_WIDTH: usize = 28;

/// `$1,234.56`; negatives keep the sign after the currency symbol (`$-1,234.56`).
pub fn format_money(v: f64) -> String {
    let cents = (v.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let frac = cents % 100;
    let sign = if v < 0.0 && cents > 0 { "-" } else { "" };
    format!("${sign}{}.{frac:02}", group_thousands(whole))
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Dataset header shared by the text commands.
pub fn format_dataset_summary(table: &SalesTable) -> String {
    let mut out = String::new();
    out.push_str("=== salesdash - Sales Dashboard ===\n");
    out.push_str(&format!("Data: {}\n", table.source.display()));
    out.push_str(&format!(
        "Rows: read={} used={} skipped={}\n",
        table.rows_read,
        table.rows_used(),
        table.row_errors.len()
    ));
    if let Some((first, last)) = table.date_range() {
        out.push_str(&format!("Order dates: {first} .. {last}\n"));
    }
    out
}

/// Selection, metric boxes, and the projected table.
pub fn format_overview(overview: &OverviewOutput, row_limit: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Category: {} | Sub-Category: {}\n\n",
        overview.selection.category, overview.selection.sub_category
    ));
    out.push_str(&format!("Total Sales : {}\n", format_money(overview.totals.sales)));
    out.push_str(&format!("Total Profit: {}\n", format_money(overview.totals.profit)));
    out.push_str(&format!("Rows        : {}\n\n", overview.totals.rows));

    out.push_str("Dataset Overview:\n");
    out.push_str(&format_table(&overview.table, row_limit));
    out
}

/// Render a projection as aligned columns. `limit == 0` prints every row.
pub fn format_table(table: &Projection, limit: usize) -> String {
    let shown = if limit == 0 { table.rows.len() } else { limit.min(table.rows.len()) };

    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.chars().count()).collect();
    for row in &table.rows[..shown] {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }
    for w in &mut widths {
        *w = (*w).min(MAX_CELL_WIDTH);
    }

    let mut out = String::new();
    push_row(&mut out, &table.headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths);
    for row in &table.rows[..shown] {
        push_row(&mut out, row, &widths);
    }

    if shown < table.rows.len() {
        out.push_str(&format!("... {} more row(s)\n", table.rows.len() - shown));
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let parts: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, w)| format!("{:<w$}", truncate(cell, *w), w = *w))
        .collect();
    out.push_str(parts.join("  ").trim_end());
    out.push('\n');
}

/// Categories with their sub-categories, in file order.
pub fn format_categories(table: &SalesTable) -> String {
    let mut out = String::new();
    for category in query::categories(table) {
        out.push_str(&format!("{category}\n"));
        for sub in query::sub_categories(table, &category) {
            out.push_str(&format!("  - {sub}\n"));
        }
    }
    out
}

/// Model description and fit diagnostics.
pub fn format_forecast_summary(run: &ForecastRun) -> String {
    let model = &run.model;
    let config = &run.config;
    let mut out = String::new();

    out.push_str("Forecast (daily total sales):\n");
    out.push_str(&format!(
        "- history: n={} | {} .. {}\n",
        model.history_len, model.history_start, model.history_end
    ));
    out.push_str(&format!(
        "- horizon: {} year(s) = {} day(s)\n",
        config.years,
        config.periods()
    ));
    out.push_str(&format!(
        "- trend: piecewise linear, {} changepoint(s), prior scale {}\n",
        model.changepoints.len(),
        config.changepoint_prior_scale
    ));
    out.push_str(&format!("- seasonality: {}\n", describe_seasonalities(model)));
    out.push_str(&format!(
        "- interval: {:.0}% from {} simulated path(s)\n",
        config.interval_width * 100.0,
        config.uncertainty_samples
    ));
    out.push_str(&format!("- in-sample RMSE: {}\n", format_money(model.rmse)));
    out
}

fn describe_seasonalities(model: &FittedModel) -> String {
    if model.seasonalities.is_empty() {
        return "none".to_string();
    }
    let parts: Vec<String> = model
        .seasonalities
        .iter()
        .map(|s| format!("{} (period {:.2}d, order {})", s.spec.name, s.spec.period, s.spec.order))
        .collect();
    parts.join(", ")
}

/// The last rows of the forecast frame, like `forecast.tail()`.
pub fn format_forecast_tail(rows: &[ForecastRow]) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<10} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12}\n",
            "ds", "yhat", "yhat_lower", "yhat_upper", "trend", "weekly", "yearly"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<10} {:-<12} {:-<12} {:-<12} {:-<12} {:-<12} {:-<12}\n",
            "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for r in rows {
        out.push_str(
            format!(
                "{:<10} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2}\n",
                r.ds, r.yhat, r.yhat_lower, r.yhat_upper, r.trend, r.weekly, r.yearly
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// One-line summaries of each component.
pub fn format_components(components: &Components) -> String {
    let mut out = String::new();
    out.push_str("Components:\n");

    if let (Some(first), Some(last)) = (components.trend.first(), components.trend.last()) {
        out.push_str(&format!(
            "- trend : {:.2} ({}) -> {:.2} ({})\n",
            first.1, first.0, last.1, last.0
        ));
    }

    match &components.weekly {
        Some(weekly) => {
            let parts: Vec<String> = weekly
                .iter()
                .map(|(day, v)| format!("{}={v:+.2}", weekday_label(*day)))
                .collect();
            out.push_str(&format!("- weekly: {}\n", parts.join(" ")));
        }
        None => out.push_str("- weekly: off\n"),
    }

    match &components.yearly {
        Some(yearly) => {
            let peak = yearly
                .iter()
                .copied()
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            let trough = yearly
                .iter()
                .copied()
                .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
            if let (Some(peak), Some(trough)) = (peak, trough) {
                out.push_str(&format!(
                    "- yearly: peak {:+.2} on {} | trough {:+.2} on {}\n",
                    peak.1,
                    peak.0.format("%b %d"),
                    trough.1,
                    trough.0.format("%b %d")
                ));
            }
        }
        None => out.push_str("- yearly: off\n"),
    }

    out
}

/// Saved-file header for `salesdash plot`.
pub fn format_forecast_file_header(source: &std::path::Path, config: &ForecastConfig, rows: usize) -> String {
    format!(
        "Forecast of {} | {} year(s) | {} row(s)\n",
        source.display(),
        config.years,
        rows
    )
}

pub fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
