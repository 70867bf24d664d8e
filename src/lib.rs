//! `sales-dashboard` library crate.
//!
//! The binary (`salesdash`) is a thin wrapper around this library so that:
//!
//! - the load/filter/aggregate/forecast pipeline is testable without a terminal
//! - the TUI and the text subcommands share exactly one implementation

pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod io;
pub mod logging;
pub mod math;
pub mod plot;
pub mod query;
pub mod report;
pub mod tui;
