//! # calendar-arimax
//!
//! Seasonal dummy regressors and regression with ARIMA errors for daily
//! time series.
//!
//! The pipeline encodes the training dates as month-of-year and day-of-week
//! indicators ([`calendar::seasonal_index`]), fits a model through the
//! [`models::ExogenousFitter`] capability, builds the regressor frame for the
//! dates after the series ([`calendar::future_frame`]), and forecasts it with
//! [`models::forecast_future`].
//!
//! ```no_run
//! use calendar_arimax::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
//! let series = daily_demand(start, 730, 1)?;
//! let (train, test) = series.split_holdout(28)?;
//!
//! let features = SeasonalFeatures::default();
//! let design = seasonal_index(train.timestamps(), features)?;
//! let model = RegressionWithArimaErrors::new().fit(&train, &design, &FitOptions::default())?;
//!
//! let future = future_frame(28, &train, features)?;
//! let forecast = forecast_future_levels(&model, &future, &[0.8, 0.9])?;
//! let metrics = calculate_metrics(test.values(), forecast.primary(), Some(7))?;
//! println!("MAE {:.2}", metrics.mae);
//! # Ok::<(), ForecastError>(())
//! ```

#![allow(clippy::upper_case_acronyms)]
#![allow(clippy::needless_range_loop)]

pub mod calendar;
pub mod core;
pub mod datasets;
pub mod error;
pub mod models;
pub mod utils;

pub use error::{ForecastError, Result};

pub mod prelude {
    pub use crate::calendar::{
        future_frame, seasonal_index, SeasonalDesign, SeasonalFeatures, SeasonalSchema,
    };
    pub use crate::core::{Forecast, TimeSeries};
    pub use crate::datasets::daily_demand;
    pub use crate::error::{ForecastError, Result};
    pub use crate::models::{
        forecast_future, forecast_future_levels, ExogenousFitter, ExogenousForecaster,
        FitOptions, Forecaster, PredictRequest, RegressionWithArimaErrors,
    };
    pub use crate::utils::{calculate_metrics, interval_coverage, AccuracyMetrics};
}
