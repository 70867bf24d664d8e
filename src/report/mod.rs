//! Reporting utilities: money formatting and terminal text for each command.

pub mod format;

pub use format::*;
