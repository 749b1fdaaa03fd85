//! Forecasting a fitted model over a future seasonal design.

use tracing::debug;

use crate::calendar::SeasonalDesign;
use crate::core::Forecast;
use crate::error::{ForecastError, Result};
use crate::models::traits::ExogenousForecaster;

/// Arguments of a single prediction call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictRequest {
    /// Significance level; intervals are at confidence `1 - alpha`.
    pub alpha: f64,
    /// Whether interval bounds are requested.
    pub return_interval: bool,
}

impl Default for PredictRequest {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            return_interval: true,
        }
    }
}

impl PredictRequest {
    /// Request intervals at significance `alpha`.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            return_interval: true,
        }
    }

    /// Point forecasts only.
    pub fn without_interval(mut self) -> Self {
        self.return_interval = false;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Confidence level `1 - alpha`.
    pub fn level(&self) -> f64 {
        1.0 - self.alpha
    }
}

fn check_probability(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ForecastError::InvalidParameter(format!(
            "{name} must be in (0, 1), got {value}"
        )))
    }
}

/// Forecast one step per row of `future`.
///
/// The horizon is the number of rows in the future design; the model's
/// prediction is returned unchanged.
///
/// # Errors
/// [`ForecastError::InvalidParameter`] when `alpha` is outside (0, 1),
/// [`ForecastError::InvalidHorizon`] for an empty design, and anything the
/// model's predict capability reports.
pub fn forecast_future(
    model: &dyn ExogenousForecaster,
    future: &SeasonalDesign,
    request: PredictRequest,
) -> Result<Forecast> {
    check_probability("alpha", request.alpha)?;
    let horizon = future.len();
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon(horizon));
    }

    debug!(
        model = model.name(),
        horizon,
        alpha = request.alpha,
        return_interval = request.return_interval,
        "forecasting future design"
    );
    model.predict(horizon, future, request.return_interval, request.alpha)
}

/// Forecast `future` with one interval per confidence level in `levels`.
///
/// The model is invoked once per level and the bands are collected on the
/// first result. An empty `levels` slice yields point forecasts only.
pub fn forecast_future_levels(
    model: &dyn ExogenousForecaster,
    future: &SeasonalDesign,
    levels: &[f64],
) -> Result<Forecast> {
    for &level in levels {
        check_probability("confidence level", level)?;
    }

    let Some((&first, rest)) = levels.split_first() else {
        return forecast_future(model, future, PredictRequest::default().without_interval());
    };

    let mut forecast = with_single_band(model, future, first, None)?;
    for &level in rest {
        forecast = with_single_band(model, future, level, Some(forecast))?;
    }
    Ok(forecast)
}

/// Predict at `level` and attach the band to `base`, or return the
/// prediction itself when there is no base yet.
fn with_single_band(
    model: &dyn ExogenousForecaster,
    future: &SeasonalDesign,
    level: f64,
    base: Option<Forecast>,
) -> Result<Forecast> {
    let prediction = forecast_future(model, future, PredictRequest::new(1.0 - level))?;
    let band = prediction.intervals().first().cloned().ok_or_else(|| {
        ForecastError::ComputationError(format!(
            "model '{}' returned no interval at level {level}",
            model.name()
        ))
    })?;

    let target = base.unwrap_or_else(|| prediction.without_intervals());
    target.with_interval(level, band.lower, band.upper)
}
