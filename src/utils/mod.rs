//! Numerical helpers shared by the regression and ARIMA models.

pub mod metrics;
pub mod ols;
pub mod optimization;
pub mod stats;

pub use metrics::{calculate_metrics, interval_coverage, winkler_score, AccuracyMetrics};
pub use ols::{ols_fit, ols_residuals, OLSResult, Regressors};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use stats::{critical_value, quantile_normal};
