//! Seasonal ARIMA(p, d, q)(P, D, Q)\[s\] estimated by conditional sum of squares.

use std::fmt;

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{
    difference, differencing_polynomial, polymul, seasonal_difference,
};
use crate::models::Forecaster;
use crate::utils::optimization::{nelder_mead, NelderMeadConfig};
use crate::utils::stats::quantile_normal;

/// Stationarity/invertibility box for every AR and MA coefficient.
const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA model specification, seasonal part included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ARIMASpec {
    /// AR order (p)
    pub p: usize,
    /// Differencing order (d)
    pub d: usize,
    /// MA order (q)
    pub q: usize,
    /// Seasonal AR order (P)
    pub cap_p: usize,
    /// Seasonal differencing order (D)
    pub cap_d: usize,
    /// Seasonal MA order (Q)
    pub cap_q: usize,
    /// Seasonal period (s), 0 when non-seasonal
    pub s: usize,
}

impl ARIMASpec {
    /// Non-seasonal ARIMA(p, d, q).
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            ..Self::default()
        }
    }

    /// Add a seasonal (P, D, Q)\[s\] part.
    pub fn with_seasonal(mut self, cap_p: usize, cap_d: usize, cap_q: usize, s: usize) -> Self {
        self.cap_p = cap_p;
        self.cap_d = cap_d;
        self.cap_q = cap_q;
        self.s = s;
        self
    }

    /// Whether any seasonal term is present.
    pub fn is_seasonal(&self) -> bool {
        self.s > 1 && (self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0)
    }

    /// Total number of estimated parameters (coefficients plus intercept).
    pub fn num_params(&self) -> usize {
        self.p + self.q + self.cap_p + self.cap_q + 1
    }

    /// Highest lag of the expanded AR polynomial.
    pub fn ar_lags(&self) -> usize {
        self.p + self.cap_p * self.s
    }

    /// Highest lag of the expanded MA polynomial.
    pub fn ma_lags(&self) -> usize {
        self.q + self.cap_q * self.s
    }

    /// Observations consumed by differencing.
    pub fn differencing_lags(&self) -> usize {
        self.d + self.cap_d * self.s
    }

    /// Shortest series this specification can be fitted to.
    pub fn min_observations(&self) -> usize {
        self.differencing_lags() + self.ar_lags().max(self.ma_lags()) + 2
    }

    fn validate(&self) -> Result<()> {
        let has_seasonal_terms = self.cap_p > 0 || self.cap_d > 0 || self.cap_q > 0;
        if has_seasonal_terms && self.s < 2 {
            return Err(ForecastError::InvalidParameter(format!(
                "seasonal orders require a period >= 2, got {}",
                self.s
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ARIMASpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)?;
        if self.is_seasonal() {
            write!(f, "({},{},{})[{}]", self.cap_p, self.cap_d, self.cap_q, self.s)?;
        }
        Ok(())
    }
}

/// Estimated coefficients, grouped by polynomial.
#[derive(Debug, Clone, Default, PartialEq)]
struct Coefficients {
    intercept: f64,
    ar: Vec<f64>,
    seasonal_ar: Vec<f64>,
    ma: Vec<f64>,
    seasonal_ma: Vec<f64>,
}

impl Coefficients {
    /// Unpack `[intercept, ar.., seasonal_ar.., ma.., seasonal_ma..]`.
    fn from_params(params: &[f64], spec: &ARIMASpec) -> Self {
        let mut cursor = 1;
        let mut take = |n: usize| {
            let group = params[cursor..cursor + n].to_vec();
            cursor += n;
            group
        };
        Self {
            intercept: params[0],
            ar: take(spec.p),
            seasonal_ar: take(spec.cap_p),
            ma: take(spec.q),
            seasonal_ma: take(spec.cap_q),
        }
    }

    /// Expanded `phi(L) * Phi(L^s)` as lag coefficients: index `k - 1` holds lag `k`.
    fn ar_lags(&self, s: usize) -> Vec<f64> {
        let poly = polymul(
            &lag_polynomial(&self.ar, 1, -1.0),
            &lag_polynomial(&self.seasonal_ar, s, -1.0),
        );
        poly[1..].iter().map(|c| -c).collect()
    }

    /// Expanded `theta(L) * Theta(L^s)` as lag coefficients.
    fn ma_lags(&self, s: usize) -> Vec<f64> {
        let poly = polymul(
            &lag_polynomial(&self.ma, 1, 1.0),
            &lag_polynomial(&self.seasonal_ma, s, 1.0),
        );
        poly[1..].to_vec()
    }
}

/// `1 + sign * (c1 L^step + c2 L^2step + ...)`.
fn lag_polynomial(coefficients: &[f64], step: usize, sign: f64) -> Vec<f64> {
    if coefficients.is_empty() {
        return vec![1.0];
    }
    let mut poly = vec![0.0; coefficients.len() * step + 1];
    poly[0] = 1.0;
    for (i, &c) in coefficients.iter().enumerate() {
        poly[(i + 1) * step] = sign * c;
    }
    poly
}

/// One-step innovations of the ARMA recursion on a differenced series.
/// Innovations before the first fully-lagged observation are zero.
fn innovations(series: &[f64], intercept: f64, ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let start = ar.len().max(ma.len());
    let mut errors = vec![0.0; series.len()];

    for t in start..series.len() {
        let mut pred = intercept;
        for (k, phi) in ar.iter().enumerate() {
            pred += phi * (series[t - 1 - k] - intercept);
        }
        for (k, theta) in ma.iter().enumerate() {
            pred += theta * errors[t - 1 - k];
        }
        errors[t] = series[t] - pred;
    }

    errors
}

/// State captured by a successful fit.
#[derive(Debug, Clone)]
struct FittedState {
    values: Vec<f64>,
    differenced: Vec<f64>,
    innovations: Vec<f64>,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    sigma2: f64,
    aic: f64,
    bic: f64,
    converged: bool,
}

/// Seasonal ARIMA forecasting model.
///
/// The series is differenced by `(1 - L)^d (1 - L^s)^D`, an ARMA model with
/// multiplicative seasonal polynomials and an intercept is fitted to the
/// result, and forecasts are integrated back through the differencing
/// polynomial. Prediction intervals use the psi-weights of the full model.
#[derive(Debug, Clone)]
pub struct ARIMA {
    spec: ARIMASpec,
    max_iterations: usize,
    coefficients: Coefficients,
    state: Option<FittedState>,
}

impl ARIMA {
    /// Create a non-seasonal ARIMA(p, d, q) model.
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q))
    }

    /// Create an ARIMA(p, d, q)(P, D, Q)\[s\] model.
    #[allow(clippy::too_many_arguments)]
    pub fn seasonal(
        p: usize,
        d: usize,
        q: usize,
        cap_p: usize,
        cap_d: usize,
        cap_q: usize,
        s: usize,
    ) -> Self {
        Self::from_spec(ARIMASpec::new(p, d, q).with_seasonal(cap_p, cap_d, cap_q, s))
    }

    /// Create a model from a full specification.
    pub fn from_spec(spec: ARIMASpec) -> Self {
        Self {
            spec,
            max_iterations: 1000,
            coefficients: Coefficients::default(),
            state: None,
        }
    }

    /// Create an AR(p) model.
    pub fn ar(p: usize) -> Self {
        Self::new(p, 0, 0)
    }

    /// Create an MA(q) model.
    pub fn ma(q: usize) -> Self {
        Self::new(0, 0, q)
    }

    /// Cap the optimizer iterations used during estimation.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Get the model specification.
    pub fn spec(&self) -> ARIMASpec {
        self.spec
    }

    pub fn ar_coefficients(&self) -> &[f64] {
        &self.coefficients.ar
    }

    pub fn seasonal_ar_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ar
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.coefficients.ma
    }

    pub fn seasonal_ma_coefficients(&self) -> &[f64] {
        &self.coefficients.seasonal_ma
    }

    /// Intercept of the differenced series.
    pub fn intercept(&self) -> f64 {
        self.coefficients.intercept
    }

    /// Innovation variance estimate.
    pub fn sigma2(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.sigma2)
    }

    pub fn aic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.aic)
    }

    pub fn bic(&self) -> Option<f64> {
        self.state.as_ref().map(|s| s.bic)
    }

    /// Whether the optimizer met its tolerance within the iteration budget.
    pub fn converged(&self) -> Option<bool> {
        self.state.as_ref().map(|s| s.converged)
    }

    /// First `n` psi-weights of the MA(inf) representation, differencing included.
    pub fn psi_weights(&self, n: usize) -> Vec<f64> {
        let s = self.spec.s;
        let mut ar_poly = vec![1.0];
        ar_poly.extend(self.coefficients.ar_lags(s).iter().map(|c| -c));
        let full_ar = polymul(
            &ar_poly,
            &differencing_polynomial(self.spec.d, self.spec.cap_d, s),
        );
        let ma = self.coefficients.ma_lags(s);

        let mut psi: Vec<f64> = Vec::with_capacity(n);
        for j in 0..n {
            if j == 0 {
                psi.push(1.0);
                continue;
            }
            let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
            for k in 1..=j.min(full_ar.len() - 1) {
                value -= full_ar[k] * psi[j - k];
            }
            psi.push(value);
        }
        psi
    }

    /// Point forecasts and their standard errors for `horizon` steps.
    pub fn predict_with_standard_errors(&self, horizon: usize) -> Result<(Vec<f64>, Vec<f64>)> {
        let state = self.state.as_ref().ok_or(ForecastError::FitRequired)?;
        let s = self.spec.s;
        let ar = self.coefficients.ar_lags(s);
        let ma = self.coefficients.ma_lags(s);
        let mu = self.coefficients.intercept;

        let mut w = state.differenced.clone();
        let mut e = state.innovations.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = mu;
            for (k, phi) in ar.iter().enumerate() {
                pred += phi * (w[t - 1 - k] - mu);
            }
            for (k, theta) in ma.iter().enumerate() {
                pred += theta * e[t - 1 - k];
            }
            w.push(pred);
            e.push(0.0);
        }

        let delta = differencing_polynomial(self.spec.d, self.spec.cap_d, s);
        let mut y = state.values.clone();
        for &next_w in &w[state.differenced.len()..] {
            let t = y.len();
            let lagged: f64 = delta
                .iter()
                .enumerate()
                .skip(1)
                .map(|(k, c)| c * y[t - k])
                .sum();
            y.push(next_w - lagged);
        }
        let points = y.split_off(state.values.len());

        let mut cumulative = 0.0;
        let errors = self
            .psi_weights(horizon)
            .into_iter()
            .map(|psi| {
                cumulative += psi * psi;
                (state.sigma2 * cumulative).sqrt()
            })
            .collect();

        Ok((points, errors))
    }

    fn estimate(&self, differenced: &[f64]) -> (Coefficients, bool) {
        let spec = self.spec;
        let mean = differenced.iter().sum::<f64>() / differenced.len() as f64;
        let num_coefficients = spec.num_params() - 1;

        if num_coefficients == 0 {
            let coefficients = Coefficients {
                intercept: mean,
                ..Coefficients::default()
            };
            return (coefficients, true);
        }

        let mut initial = vec![mean];
        for order in [spec.p, spec.cap_p, spec.q, spec.cap_q] {
            initial.extend((0..order).map(|i| 0.1 / (i + 1) as f64));
        }

        let mut bounds = vec![(f64::NEG_INFINITY, f64::INFINITY)];
        bounds.extend(std::iter::repeat((-COEFFICIENT_BOUND, COEFFICIENT_BOUND)).take(num_coefficients));

        let result = nelder_mead(
            |params| {
                let c = Coefficients::from_params(params, &spec);
                let ar = c.ar_lags(spec.s);
                let ma = c.ma_lags(spec.s);
                let start = ar.len().max(ma.len());
                innovations(differenced, c.intercept, &ar, &ma)[start..]
                    .iter()
                    .map(|e| e * e)
                    .sum::<f64>()
            },
            &initial,
            Some(&bounds),
            NelderMeadConfig::default().with_max_iter(self.max_iterations),
        );

        (
            Coefficients::from_params(&result.optimal_point, &spec),
            result.converged,
        )
    }
}

impl Default for ARIMA {
    fn default() -> Self {
        Self::new(1, 1, 1)
    }
}

impl Forecaster for ARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        self.spec.validate()?;
        if series.has_missing_values() {
            return Err(ForecastError::MissingValues);
        }

        let values = series.values();
        let needed = self.spec.min_observations();
        if values.len() < needed {
            return Err(ForecastError::InsufficientData {
                needed,
                got: values.len(),
            });
        }

        let differenced = seasonal_difference(
            &difference(values, self.spec.d),
            self.spec.cap_d,
            self.spec.s,
        );
        let (coefficients, converged) = self.estimate(&differenced);

        let ar = coefficients.ar_lags(self.spec.s);
        let ma = coefficients.ma_lags(self.spec.s);
        let start = ar.len().max(ma.len());
        let errors = innovations(&differenced, coefficients.intercept, &ar, &ma);

        let valid = &errors[start..];
        let n_eff = valid.len() as f64;
        let sigma2 = valid.iter().map(|e| e * e).sum::<f64>() / n_eff;
        let k = self.spec.num_params() as f64;
        let log_likelihood =
            -0.5 * n_eff * (1.0 + sigma2.ln() + (2.0 * std::f64::consts::PI).ln());

        // Innovations map back onto the original index after the differencing lags.
        let offset = self.spec.differencing_lags();
        let mut fitted = vec![f64::NAN; values.len()];
        let mut residuals = vec![0.0; values.len()];
        for t in (offset + start)..values.len() {
            residuals[t] = errors[t - offset];
            fitted[t] = values[t] - errors[t - offset];
        }

        self.coefficients = coefficients;
        self.state = Some(FittedState {
            values: values.to_vec(),
            differenced,
            innovations: errors,
            fitted,
            residuals,
            sigma2,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n_eff.ln(),
            converged,
        });

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        if self.state.is_none() {
            return Err(ForecastError::FitRequired);
        }
        if horizon == 0 {
            return Ok(Forecast::new());
        }
        let (points, _) = self.predict_with_standard_errors(horizon)?;
        Ok(Forecast::from_values(points))
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }
        if self.state.is_none() {
            return Err(ForecastError::FitRequired);
        }
        if horizon == 0 {
            return Ok(Forecast::new());
        }

        let (points, errors) = self.predict_with_standard_errors(horizon)?;
        let z = quantile_normal((1.0 + level) / 2.0);
        let lower = points.iter().zip(&errors).map(|(p, se)| p - z * se).collect();
        let upper = points.iter().zip(&errors).map(|(p, se)| p + z * se).collect();

        Forecast::from_values(points).with_interval(level, lower, upper)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.fitted.as_slice())
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.state.as_ref().map(|s| s.residuals.as_slice())
    }

    fn name(&self) -> &str {
        if self.spec.is_seasonal() {
            "SARIMA"
        } else {
            "ARIMA"
        }
    }
}
