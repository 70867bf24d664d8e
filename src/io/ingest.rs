//! CSV ingest and normalization.
//!
//! This module turns a sales export into a `SalesTable`:
//!
//! - **Strict schema** for the five columns the dashboard needs (exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Every raw field kept**, so the overview table can show any column
//! - no filtering or aggregation here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use csv::ByteRecord;
use tracing::{debug, info, warn};

use crate::domain::{
    RowError, SalesRecord, SalesTable, COL_CATEGORY, COL_ORDER_DATE, COL_PROFIT, COL_SALES, COL_SUB_CATEGORY,
};
use crate::error::AppError;

/// Column positions of the required fields.
#[derive(Debug, Clone, Copy)]
struct Schema {
    category: usize,
    sub_category: usize,
    order_date: usize,
    sales: usize,
    profit: usize,
}

/// Load the sales CSV at `path`.
pub fn load_sales_table(path: &Path) -> Result<SalesTable, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .byte_headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let columns: Vec<String> = headers.iter().map(|h| clean_header(&decode_field(h))).collect();
    let schema = resolve_schema(&build_header_map(&columns))?;
    debug!(columns = columns.len(), "resolved CSV schema");

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.byte_records().enumerate() {
        // +2 because records start on the line after the header and lines are 1-based.
        let fallback_line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line: fallback_line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(fallback_line);

        match parse_record(&record, schema, line) {
            Ok(row) => records.push(row),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    if !row_errors.is_empty() {
        warn!(skipped = row_errors.len(), "skipped invalid CSV rows");
    }

    if records.is_empty() {
        return Err(AppError::new(
            3,
            format!("No valid rows in '{}' ({rows_read} read).", path.display()),
        ));
    }

    info!(
        path = %path.display(),
        rows_read,
        rows_used = records.len(),
        "loaded sales table"
    );

    Ok(SalesTable {
        source: path.to_path_buf(),
        columns,
        records,
        row_errors,
        rows_read,
    })
}

fn build_header_map(columns: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in columns.iter().enumerate() {
        // Duplicate headers: the first occurrence wins.
        map.entry(name.to_ascii_lowercase()).or_insert(idx);
    }
    map
}

fn clean_header(name: &str) -> String {
    // Excel and other tools sometimes emit UTF-8 CSVs with a BOM prefix on the
    // first header. If we don't strip it, schema validation will incorrectly
    // report a missing column.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

fn resolve_schema(header_map: &HashMap<String, usize>) -> Result<Schema, AppError> {
    let find = |name: &str| {
        header_map
            .get(&name.to_ascii_lowercase())
            .copied()
            .ok_or_else(|| AppError::new(2, format!("Missing required column: `{name}`")))
    };

    Ok(Schema {
        category: find(COL_CATEGORY)?,
        sub_category: find(COL_SUB_CATEGORY)?,
        order_date: find(COL_ORDER_DATE)?,
        sales: find(COL_SALES)?,
        profit: find(COL_PROFIT)?,
    })
}

fn parse_record(record: &ByteRecord, schema: Schema, line: usize) -> Result<SalesRecord, String> {
    let fields: Vec<String> = record.iter().map(decode_field).collect();

    let category = get_required(&fields, schema.category, COL_CATEGORY)?.to_string();
    let sub_category = get_required(&fields, schema.sub_category, COL_SUB_CATEGORY)?.to_string();
    let order_date = parse_date(get_required(&fields, schema.order_date, COL_ORDER_DATE)?)?;
    let sales = parse_amount(get_required(&fields, schema.sales, COL_SALES)?)
        .ok_or_else(|| format!("Invalid `{COL_SALES}` value."))?;
    let profit = parse_amount(get_required(&fields, schema.profit, COL_PROFIT)?)
        .ok_or_else(|| format!("Invalid `{COL_PROFIT}` value."))?;

    Ok(SalesRecord {
        line,
        category,
        sub_category,
        order_date,
        sales,
        profit,
        fields,
    })
}

fn get_required<'a>(fields: &'a [String], idx: usize, name: &str) -> Result<&'a str, String> {
    fields
        .get(idx)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

/// Decode a raw field as UTF-8, falling back to Latin-1.
///
/// The widely shared "Superstore" export is Latin-1 encoded; every byte maps
/// to the Unicode code point with the same value.
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // Spreadsheet exports usually write US-style `M/D/YYYY`; ISO is accepted too.
    // A trailing time part (`2016-11-08 00:00:00`) is ignored.
    const FMTS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d"];
    let date_part = s.split_whitespace().next().unwrap_or(s);
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(date_part, fmt) {
            return Ok(d);
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: M/D/YYYY, YYYY-MM-DD, DD-MM-YYYY, YYYY/MM/DD."
    ))
}

/// Parse a money amount such as `261.96`, `$1,044.63` or `-$12.50`.
fn parse_amount(s: &str) -> Option<f64> {
    let s = s.trim();
    let (negative, rest) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    let cleaned: String = rest
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    let v = cleaned.parse::<f64>().ok()?;
    if !v.is_finite() {
        return None;
    }
    Some(if negative { -v } else { v })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_us_and_iso() {
        let expected = NaiveDate::from_ymd_opt(2016, 11, 8).unwrap();
        assert_eq!(parse_date("11/8/2016").unwrap(), expected);
        assert_eq!(parse_date("2016-11-08").unwrap(), expected);
        assert_eq!(parse_date("2016-11-08 00:00:00").unwrap(), expected);
        assert!(parse_date("8th Nov").is_err());
    }

    #[test]
    fn parse_amount_handles_currency_formatting() {
        assert_eq!(parse_amount("261.96"), Some(261.96));
        assert_eq!(parse_amount("$1,044.63"), Some(1044.63));
        assert_eq!(parse_amount("-$12.50"), Some(-12.5));
        assert_eq!(parse_amount("-383.031"), Some(-383.031));
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("inf"), None);
    }

    #[test]
    fn decode_field_falls_back_to_latin1() {
        assert_eq!(decode_field("Café".as_bytes()), "Café");
        assert_eq!(decode_field(&[b'C', b'a', b'f', 0xE9]), "Café");
    }

    #[test]
    fn schema_lookup_ignores_case_and_bom() {
        let columns: Vec<String> = ["\u{feff}Row ID", "category", "SUB-CATEGORY", "Order Date", "Sales", "Profit"]
            .iter()
            .map(|s| clean_header(s))
            .collect();
        assert_eq!(columns[0], "Row ID");

        let schema = resolve_schema(&build_header_map(&columns)).unwrap();
        assert_eq!(schema.category, 1);
        assert_eq!(schema.sub_category, 2);
        assert_eq!(schema.profit, 5);
    }

    #[test]
    fn missing_column_is_a_config_error() {
        let columns = vec!["Category".to_string(), "Sales".to_string()];
        let err = resolve_schema(&build_header_map(&columns)).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("Sub-Category"));
    }
}
