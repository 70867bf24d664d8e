//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the loaded dataset (`SalesTable`, `SalesRecord`)
//! - the sidebar selection and aggregates (`Selection`, `Totals`, `DailyTotals`)
//! - forecast inputs and outputs (`ForecastConfig`, `FittedModel`, `ForecastRow`)

pub mod types;

pub use types::*;
