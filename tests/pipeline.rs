//! End-to-end runs over a small Superstore-shaped CSV.

use std::fmt::Write as _;
use std::path::Path;

use chrono::{Duration, NaiveDate};
use sales_dashboard::app::pipeline::{run_forecast, run_overview};
use sales_dashboard::domain::{ForecastConfig, SeasonalityToggle, DEFAULT_OVERVIEW_COLUMNS};
use sales_dashboard::io::{load_sales_table, read_forecast_json, write_forecast_csv, write_forecast_json};
use sales_dashboard::query::{categories, resolve_selection, sub_categories};

fn write_dataset(path: &Path) {
    let mut csv = String::from("Row ID,Order ID,Order Date,Customer Name,Category,Sub-Category,Sales,Profit\n");
    let start = NaiveDate::from_ymd_opt(2016, 1, 4).unwrap();
    for i in 0..56 {
        let date = start + Duration::days(i);
        let (cat, sub) = match i % 3 {
            0 => ("Furniture", "Chairs"),
            1 => ("Office Supplies", "Binders"),
            _ => ("Furniture", "Tables"),
        };
        let sales = 100.0 + i as f64 * 2.0 + if i % 7 == 5 { 80.0 } else { 0.0 };
        writeln!(
            csv,
            "{},CA-{i:04},{},\"Doe, Jane\",{cat},{sub},\"{sales:.2}\",{:.2}",
            i + 1,
            date.format("%m/%d/%Y"),
            sales * 0.1
        )
        .unwrap();
    }
    csv.push_str("57,CA-9999,not a date,Someone,Furniture,Chairs,10,1\n");
    std::fs::write(path, csv).unwrap();
}

#[test]
fn overview_of_a_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("superstore.csv");
    write_dataset(&path);

    let table = load_sales_table(&path).unwrap();
    assert_eq!(table.rows_read, 57);
    assert_eq!(table.rows_used(), 56);
    assert_eq!(table.row_errors.len(), 1);
    assert_eq!(table.row_errors[0].line, 58);

    assert_eq!(categories(&table), vec!["Furniture", "Office Supplies"]);
    assert_eq!(sub_categories(&table, "Furniture"), vec!["Chairs", "Tables"]);

    let selection = resolve_selection(&table, Some("Furniture"), None).unwrap();
    assert_eq!(selection.sub_category, "Chairs");

    let columns: Vec<String> = DEFAULT_OVERVIEW_COLUMNS.iter().map(|c| c.to_string()).collect();
    let overview = run_overview(&table, &selection, &columns).unwrap();
    assert_eq!(overview.totals.rows, 19);
    assert_eq!(overview.table.headers, columns);
    assert_eq!(overview.series.len(), 19);
    assert!(overview.series.windows(2).all(|w| w[0].date < w[1].date));

    let err = resolve_selection(&table, Some("Office Supplies"), Some("Chairs")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn forecast_exports_and_reloads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("superstore.csv");
    write_dataset(&path);
    let table = load_sales_table(&path).unwrap();

    let config = ForecastConfig {
        years: 2,
        uncertainty_samples: 50,
        yearly: SeasonalityToggle::Off,
        ..ForecastConfig::default()
    };
    let run = run_forecast(&table, &config).unwrap();
    assert_eq!(run.history.len(), 56);
    assert_eq!(run.forecast.len(), 56 + 730);
    assert!(run.components.weekly.is_some());
    assert!(run.components.yearly.is_none());
    for r in &run.forecast {
        assert!(r.yhat_lower <= r.yhat_upper);
    }

    let csv_path = dir.path().join("forecast.csv");
    write_forecast_csv(&csv_path, &run.forecast).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 1 + 56 + 730);

    let json_path = dir.path().join("forecast.json");
    write_forecast_json(&json_path, &run, &table.source).unwrap();
    let file = read_forecast_json(&json_path).unwrap();
    assert_eq!(file.source, path);
    assert_eq!(file.forecast.len(), run.forecast.len());
    assert_eq!(file.forecast.last().map(|r| r.ds), run.forecast.last().map(|r| r.ds));
    assert_eq!(file.config.years, 2);
}
