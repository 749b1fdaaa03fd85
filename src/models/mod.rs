//! Forecasting models and the capabilities they expose.

mod invoker;
mod regression;
mod traits;

pub mod arima;

pub use invoker::{forecast_future, forecast_future_levels, PredictRequest};
pub use regression::{FittedRegression, RegressionWithArimaErrors};
pub use traits::{
    BoxedForecaster, ExogenousFitter, ExogenousForecaster, FitOptions, Forecaster,
};
