//! Additive time-series forecaster.
//!
//! `y(t) = trend(t) + yearly(t) + weekly(t) + noise`
//!
//! Responsibilities:
//!
//! - place trend changepoints over the early history (`changepoints`)
//! - decide which Fourier seasonalities apply (`seasonality`)
//! - fit all coefficients in one penalized least-squares solve (`fitter`)
//! - extend the dates, predict, and simulate interval bounds (`predict`)
//! - evaluate each component separately for plotting (`components`)

pub mod changepoints;
pub mod components;
pub mod fitter;
pub mod predict;
pub mod seasonality;

pub use changepoints::*;
pub use components::*;
pub use fitter::*;
pub use predict::*;
pub use seasonality::*;
