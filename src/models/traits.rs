//! Model capabilities: univariate forecasting, and fit/predict with seasonal regressors.

use crate::calendar::{SeasonalDesign, SeasonalSchema};
use crate::core::{Forecast, TimeSeries};
use crate::error::Result;

/// Common interface for univariate forecasting models.
///
/// This trait is object-safe and can be used with `Box<dyn Forecaster>`.
pub trait Forecaster {
    /// Fit the model to the time series data.
    fn fit(&mut self, series: &TimeSeries) -> Result<()>;

    /// Generate predictions for the specified horizon.
    fn predict(&self, horizon: usize) -> Result<Forecast>;

    /// Generate predictions with a prediction interval at `level`.
    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        let _ = level;
        self.predict(horizon)
    }

    /// Get the fitted values (in-sample predictions).
    fn fitted_values(&self) -> Option<&[f64]>;

    /// Get the residuals (actual - fitted).
    fn residuals(&self) -> Option<&[f64]>;

    /// Get the model name.
    fn name(&self) -> &str;

    /// Check if the model has been fitted.
    fn is_fitted(&self) -> bool {
        self.fitted_values().is_some()
    }
}

/// Type alias for boxed forecaster trait objects.
///
/// # Example
///
/// ```
/// use calendar_arimax::models::arima::ARIMA;
/// use calendar_arimax::models::{BoxedForecaster, Forecaster};
///
/// let model: BoxedForecaster = Box::new(ARIMA::new(1, 0, 0));
/// assert_eq!(model.name(), "ARIMA");
/// assert!(!model.is_fitted());
/// ```
pub type BoxedForecaster = Box<dyn Forecaster>;

/// Options passed to an [`ExogenousFitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FitOptions {
    /// Seasonal period of the error model; 0 disables seasonal ARIMA terms.
    pub seasonal_period: usize,
    /// Fixed differencing order; `None` lets the fitter choose.
    pub differencing: Option<usize>,
    /// Optimizer iteration cap.
    pub max_iterations: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            seasonal_period: 0,
            differencing: None,
            max_iterations: 1000,
        }
    }
}

impl FitOptions {
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    pub fn with_differencing(mut self, d: usize) -> Self {
        self.differencing = Some(d);
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Fit capability: estimate a model from a series and its seasonal design.
pub trait ExogenousFitter {
    /// The fitted model this fitter produces.
    type Model: ExogenousForecaster;

    /// Fit to `series` with `exog` rows aligned to the series timestamps.
    fn fit(
        &self,
        series: &TimeSeries,
        exog: &SeasonalDesign,
        options: &FitOptions,
    ) -> Result<Self::Model>;
}

/// Predict capability of a model fitted with seasonal regressors.
///
/// Object-safe so the forecast invoker can take `&dyn ExogenousForecaster`.
pub trait ExogenousForecaster {
    /// Forecast `horizon` steps with `exog` as the future design.
    ///
    /// With `return_interval`, the result carries one interval at
    /// confidence level `1 - alpha`.
    fn predict(
        &self,
        horizon: usize,
        exog: &SeasonalDesign,
        return_interval: bool,
        alpha: f64,
    ) -> Result<Forecast>;

    /// Regressor schema used at fit time, when the model tracks it.
    fn schema(&self) -> Option<&SeasonalSchema> {
        None
    }

    /// Get the model name.
    fn name(&self) -> &str;
}
