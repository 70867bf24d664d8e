//! Column projection for the "Dataset Overview" table.

use crate::domain::{SalesRecord, SalesTable};
use crate::error::AppError;

/// A rectangular view of selected columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Resolve column names against the table header (case-insensitive).
///
/// Returns the positions in the order requested; duplicates are dropped.
pub fn resolve_columns(table: &SalesTable, names: &[String]) -> Result<Vec<usize>, AppError> {
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let idx = table.column_index(name).ok_or_else(|| {
            AppError::new(
                2,
                format!("Unknown column '{name}'. Columns: {}", table.columns.join(", ")),
            )
        })?;
        if !out.contains(&idx) {
            out.push(idx);
        }
    }
    Ok(out)
}

/// Project `rows` onto the columns at `indices`.
pub fn project_columns(table: &SalesTable, rows: &[&SalesRecord], indices: &[usize]) -> Projection {
    let headers = indices
        .iter()
        .map(|&i| table.columns.get(i).cloned().unwrap_or_default())
        .collect();
    let rows = rows
        .iter()
        .map(|r| {
            indices
                .iter()
                .map(|&i| r.fields.get(i).cloned().unwrap_or_default())
                .collect()
        })
        .collect();
    Projection { headers, rows }
}
