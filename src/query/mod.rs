//! Sidebar options, the equality filter, and group-and-sum aggregates.
//!
//! Everything here is a pure function of the loaded table, so the TUI can
//! recompute on every keypress without caching.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DailyTotals, HistoryPoint, SalesRecord, SalesTable, Selection, Totals};
use crate::error::AppError;

pub mod projection;

pub use projection::*;

/// Distinct categories in first-appearance order.
pub fn categories(table: &SalesTable) -> Vec<String> {
    distinct(table.records.iter().map(|r| r.category.as_str()))
}

/// Distinct sub-categories among rows of `category`, first-appearance order.
pub fn sub_categories(table: &SalesTable, category: &str) -> Vec<String> {
    distinct(
        table
            .records
            .iter()
            .filter(|r| r.category == category)
            .map(|r| r.sub_category.as_str()),
    )
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for v in values {
        if seen.insert(v) {
            out.push(v.to_string());
        }
    }
    out
}

/// Resolve the sidebar choices, defaulting each widget to its first option.
pub fn resolve_selection(
    table: &SalesTable,
    category: Option<&str>,
    sub_category: Option<&str>,
) -> Result<Selection, AppError> {
    let options = categories(table);
    let category = match category {
        Some(wanted) => options
            .iter()
            .find(|c| c.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!("Unknown category '{wanted}'. Options: {}", options.join(", ")),
                )
            })?,
        None => options
            .first()
            .cloned()
            .ok_or_else(|| AppError::new(3, "Dataset has no categories."))?,
    };

    let sub_options = sub_categories(table, &category);
    let sub_category = match sub_category {
        Some(wanted) => sub_options
            .iter()
            .find(|s| s.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                AppError::new(
                    2,
                    format!(
                        "Sub-category '{wanted}' does not belong to '{category}'. Options: {}",
                        sub_options.join(", ")
                    ),
                )
            })?,
        None => sub_options
            .first()
            .cloned()
            .ok_or_else(|| AppError::new(3, format!("Category '{category}' has no sub-categories.")))?,
    };

    Ok(Selection {
        category,
        sub_category,
    })
}

/// Rows matching both fields exactly (case-sensitive).
pub fn select<'a>(table: &'a SalesTable, selection: &Selection) -> Vec<&'a SalesRecord> {
    let rows: Vec<&SalesRecord> = table
        .records
        .iter()
        .filter(|r| r.category == selection.category && r.sub_category == selection.sub_category)
        .collect();
    debug!(
        category = %selection.category,
        sub_category = %selection.sub_category,
        rows = rows.len(),
        "applied selection"
    );
    rows
}

pub fn totals(rows: &[&SalesRecord]) -> Totals {
    rows.iter().fold(Totals::default(), |acc, r| Totals {
        sales: acc.sales + r.sales,
        profit: acc.profit + r.profit,
        rows: acc.rows + 1,
    })
}

/// Group by order date and sum Sales and Profit (ascending by date).
pub fn daily_totals(rows: &[&SalesRecord]) -> Vec<DailyTotals> {
    let mut by_date: BTreeMap<NaiveDate, (f64, f64)> = BTreeMap::new();
    for r in rows {
        let entry = by_date.entry(r.order_date).or_insert((0.0, 0.0));
        entry.0 += r.sales;
        entry.1 += r.profit;
    }
    by_date
        .into_iter()
        .map(|(date, (sales, profit))| DailyTotals { date, sales, profit })
        .collect()
}

/// Daily summed Sales over the whole table: the series the forecaster sees.
pub fn daily_sales(table: &SalesTable) -> Vec<HistoryPoint> {
    let all: Vec<&SalesRecord> = table.records.iter().collect();
    daily_totals(&all)
        .into_iter()
        .map(|d| HistoryPoint { ds: d.date, y: d.sales })
        .collect()
}
