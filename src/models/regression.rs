//! Linear regression on seasonal indicators with ARIMA-structured errors.

use tracing::{debug, warn};

use crate::calendar::{SeasonalColumn, SeasonalDesign, SeasonalSchema};
use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::{ARIMASpec, AutoARIMA, AutoARIMAConfig, ARIMA};
use crate::models::traits::{ExogenousFitter, ExogenousForecaster, FitOptions, Forecaster};
use crate::utils::ols::{ols_fit, ols_residuals, OLSResult};
use crate::utils::stats::critical_value;

/// Fitter for `y = intercept + X beta + eta`, where `eta` follows an ARIMA
/// process selected by [`AutoARIMA`].
///
/// Estimation is two-stage: OLS on the seasonal design, then an order search
/// on the OLS residuals. When the training window never visits a group's
/// reference level (e.g. no January dates), the first observed level of that
/// group is absorbed into the intercept and its coefficient is fixed at zero.
///
/// # Example
/// ```no_run
/// use calendar_arimax::calendar::{future_frame, seasonal_index, SeasonalFeatures};
/// use calendar_arimax::datasets::daily_demand;
/// use calendar_arimax::models::{
///     forecast_future, ExogenousFitter, FitOptions, PredictRequest, RegressionWithArimaErrors,
/// };
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let series = daily_demand(start, 365, 7).unwrap();
/// let design = seasonal_index(series.timestamps(), SeasonalFeatures::default()).unwrap();
///
/// let model = RegressionWithArimaErrors::new()
///     .fit(&series, &design, &FitOptions::default())
///     .unwrap();
/// let future = future_frame(28, &series, SeasonalFeatures::default()).unwrap();
/// let forecast = forecast_future(&model, &future, PredictRequest::default()).unwrap();
/// assert_eq!(forecast.horizon(), 28);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RegressionWithArimaErrors {
    config: AutoARIMAConfig,
}

impl RegressionWithArimaErrors {
    /// Fitter with the default order search.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fitter with a custom order search.
    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoARIMAConfig {
        &self.config
    }

    /// Order-search configuration after applying per-fit options.
    fn search_config(&self, options: &FitOptions) -> AutoARIMAConfig {
        let period = if options.seasonal_period > 0 {
            options.seasonal_period
        } else {
            self.config.seasonal_period
        };
        self.config
            .clone()
            .with_seasonal_period(period)
            .with_differencing(options.differencing.or(self.config.differencing))
            .with_max_iterations(options.max_iterations)
    }
}

impl ExogenousFitter for RegressionWithArimaErrors {
    type Model = FittedRegression;

    fn fit(
        &self,
        series: &TimeSeries,
        exog: &SeasonalDesign,
        options: &FitOptions,
    ) -> Result<FittedRegression> {
        if series.is_empty() {
            return Err(ForecastError::EmptyData);
        }
        if exog.len() != series.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: series.len(),
                got: exog.len(),
            });
        }
        if exog.dates() != series.timestamps() {
            return Err(ForecastError::TimestampError(
                "design dates do not match the series timestamps".to_string(),
            ));
        }
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let absorbed: Vec<String> = exog.aliased_columns().iter().map(SeasonalColumn::name).collect();
        if !absorbed.is_empty() {
            warn!(
                columns = ?absorbed,
                "reference level absent from training dates, absorbing columns into the intercept"
            );
        }

        let regressors = exog.to_regressors()?.without(&absorbed);
        let ols = ols_fit(series.values(), &regressors)?;
        let eta = ols_residuals(series.values(), &ols, &regressors)?;
        let trend = ols.predict(&regressors)?;

        let mut search = AutoARIMA::with_config(self.search_config(options));
        search.fit(&series.with_values(eta)?)?;
        let errors = search
            .selected_model()
            .cloned()
            .ok_or(ForecastError::FitRequired)?;

        let fitted = match errors.fitted_values() {
            Some(eta_hat) => trend.iter().zip(eta_hat).map(|(x, e)| x + e).collect(),
            None => trend,
        };
        let residuals = errors.residuals().map(<[f64]>::to_vec).unwrap_or_default();

        debug!(
            observations = series.len(),
            regressors = regressors.num_columns(),
            intercept = ols.intercept,
            error_order = %errors.spec(),
            "fitted regression with ARIMA errors"
        );

        Ok(FittedRegression {
            schema: exog.schema(),
            ols,
            absorbed,
            errors,
            fitted,
            residuals,
        })
    }
}

/// A fitted regression with ARIMA errors.
#[derive(Debug, Clone)]
pub struct FittedRegression {
    schema: SeasonalSchema,
    ols: OLSResult,
    absorbed: Vec<String>,
    errors: ARIMA,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
}

impl FittedRegression {
    /// Regression intercept.
    pub fn intercept(&self) -> f64 {
        self.ols.intercept
    }

    /// Coefficient of a seasonal column, e.g. `"dow_5"`. Absorbed columns
    /// report zero.
    pub fn coefficient(&self, name: &str) -> Option<f64> {
        self.ols
            .coefficient(name)
            .or_else(|| self.absorbed.iter().any(|a| a == name).then_some(0.0))
    }

    /// Columns left out of the regression because they duplicated the intercept.
    pub fn absorbed_columns(&self) -> &[String] {
        &self.absorbed
    }

    /// `(column name, coefficient)` pairs of the estimated columns in schema order.
    pub fn coefficients(&self) -> impl Iterator<Item = (&str, f64)> {
        self.ols
            .regressor_names
            .iter()
            .map(String::as_str)
            .zip(self.ols.coefficients.iter().copied())
    }

    /// The ARIMA model of the regression errors.
    pub fn error_model(&self) -> &ARIMA {
        &self.errors
    }

    pub fn error_order(&self) -> ARIMASpec {
        self.errors.spec()
    }

    /// In-sample one-step predictions; `NaN` during the error model's burn-in.
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// Innovations of the error model, aligned with the training series.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// AIC of the selected error model.
    pub fn aic(&self) -> Option<f64> {
        self.errors.aic()
    }
}

impl ExogenousForecaster for FittedRegression {
    fn predict(
        &self,
        horizon: usize,
        exog: &SeasonalDesign,
        return_interval: bool,
        alpha: f64,
    ) -> Result<Forecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidHorizon(horizon));
        }
        exog.ensure_schema(&self.schema)?;
        if exog.len() != horizon {
            return Err(ForecastError::DimensionMismatch {
                expected: horizon,
                got: exog.len(),
            });
        }
        let z = if return_interval {
            Some(critical_value(alpha)?)
        } else {
            None
        };

        let trend = self.ols.predict(&exog.to_regressors()?.without(&self.absorbed))?;
        let (eta, standard_errors) = self.errors.predict_with_standard_errors(horizon)?;
        let point: Vec<f64> = trend.iter().zip(&eta).map(|(x, e)| x + e).collect();

        let forecast = Forecast::from_values(point.clone()).with_timestamps(exog.dates().to_vec())?;
        match z {
            None => Ok(forecast),
            Some(z) => {
                let lower = point
                    .iter()
                    .zip(&standard_errors)
                    .map(|(p, se)| p - z * se)
                    .collect();
                let upper = point
                    .iter()
                    .zip(&standard_errors)
                    .map(|(p, se)| p + z * se)
                    .collect();
                forecast.with_interval(1.0 - alpha, lower, upper)
            }
        }
    }

    fn schema(&self) -> Option<&SeasonalSchema> {
        Some(&self.schema)
    }

    fn name(&self) -> &str {
        "RegressionWithArimaErrors"
    }
}
