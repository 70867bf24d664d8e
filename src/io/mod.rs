//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - forecast/selection CSV exports (`export`)
//! - forecast JSON read/write (`forecast_file`)

pub mod export;
pub mod forecast_file;
pub mod ingest;

pub use export::*;
pub use forecast_file::*;
pub use ingest::*;
