//! CSV exports.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use tracing::info;

use crate::domain::{ForecastRow, SalesRecord, SalesTable};
use crate::error::AppError;

/// Write the forecast frame to CSV.
pub fn write_forecast_csv(path: &Path, rows: &[ForecastRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record([
            "ds",
            "trend",
            "yhat_lower",
            "yhat_upper",
            "trend_lower",
            "trend_upper",
            "additive_terms",
            "weekly",
            "yearly",
            "yhat",
        ])
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        writer
            .write_record([
                r.ds.to_string(),
                format!("{:.6}", r.trend),
                format!("{:.6}", r.yhat_lower),
                format!("{:.6}", r.yhat_upper),
                format!("{:.6}", r.trend_lower),
                format!("{:.6}", r.trend_upper),
                format!("{:.6}", r.additive_terms),
                format!("{:.6}", r.weekly),
                format!("{:.6}", r.yearly),
                format!("{:.6}", r.yhat),
            ])
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    info!(path = %path.display(), rows = rows.len(), "exported forecast CSV");
    Ok(())
}

/// Write the selected rows with every source column.
pub fn write_selection_csv(path: &Path, table: &SalesTable, rows: &[&SalesRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writer
        .write_record(&table.columns)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    let width = table.columns.len();
    for r in rows {
        // Short rows are padded so every record has the header's width.
        let record = (0..width).map(|i| r.fields.get(i).map(String::as_str).unwrap_or(""));
        writer
            .write_record(record)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    info!(path = %path.display(), rows = rows.len(), "exported selection CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::testing::table;
    use chrono::NaiveDate;

    #[test]
    fn forecast_csv_has_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.csv");
        let row = ForecastRow {
            ds: NaiveDate::from_ymd_opt(2018, 1, 1).unwrap(),
            trend: 10.0,
            trend_lower: 9.0,
            trend_upper: 11.0,
            yhat_lower: 8.0,
            yhat_upper: 12.0,
            weekly: 1.0,
            yearly: -0.5,
            additive_terms: 0.5,
            yhat: 10.5,
        };
        write_forecast_csv(&path, &[row]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("ds,trend,yhat_lower"));
        assert!(lines.next().unwrap().starts_with("2018-01-01,10.000000,8.000000"));
    }

    #[test]
    fn selection_csv_keeps_every_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.csv");
        let t = table(&[("Furniture", "Chairs", "2016-11-08", 731.94, 219.58)]);
        let rows: Vec<&SalesRecord> = t.records.iter().collect();
        write_selection_csv(&path, &t, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Order ID,Category,Sub-Category,Order Date,Sales,Profit\nORD-0,Furniture,Chairs,2016-11-08,731.94,219.58\n"
        );
    }
}
