//! Terminal charts for the text commands.

pub mod ascii;

pub use ascii::*;
