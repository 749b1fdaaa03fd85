//! ARIMA models for the error process of a regression.
//!
//! This module provides:
//! - ARIMA(p, d, q) models with optional seasonal (P, D, Q)\[s\] terms
//! - AutoARIMA for automatic order selection
//! - Differencing and lag-polynomial helpers

mod auto_arima;
mod diff;
mod model;

pub use auto_arima::{AutoARIMA, AutoARIMAConfig, ModelOrder};
pub use diff::{
    difference, differencing_polynomial, polymul, seasonal_difference, suggest_differencing,
    suggest_seasonal_differencing,
};
pub use model::{ARIMASpec, ARIMA};
