//! Automatic ARIMA order selection by information criterion.

use tracing::{debug, warn};

use crate::core::{Forecast, TimeSeries};
use crate::error::{ForecastError, Result};
use crate::models::arima::diff::{suggest_differencing, suggest_seasonal_differencing};
use crate::models::arima::model::{ARIMASpec, ARIMA};
use crate::models::Forecaster;

/// Full model order (p, d, q)(P, D, Q)\[s\] considered by the search.
pub type ModelOrder = ARIMASpec;

/// Configuration for AutoARIMA.
#[derive(Debug, Clone)]
pub struct AutoARIMAConfig {
    /// Maximum non-seasonal AR order to consider.
    pub max_p: usize,
    /// Maximum non-seasonal MA order to consider.
    pub max_q: usize,
    /// Maximum non-seasonal differencing order.
    pub max_d: usize,
    /// Maximum seasonal AR order.
    pub max_cap_p: usize,
    /// Maximum seasonal MA order.
    pub max_cap_q: usize,
    /// Maximum seasonal differencing order.
    pub max_cap_d: usize,
    /// Seasonal period (0 for non-seasonal).
    pub seasonal_period: usize,
    /// Use stepwise search (faster) vs exhaustive.
    pub stepwise: bool,
    /// Rank candidates by AIC (true) or BIC (false).
    pub use_aic: bool,
    /// Optimizer iteration cap per candidate fit.
    pub max_iterations: usize,
    /// Fixed non-seasonal differencing order; `None` searches around a suggestion.
    pub differencing: Option<usize>,
}

impl Default for AutoARIMAConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_cap_p: 2,
            max_cap_q: 2,
            max_cap_d: 1,
            seasonal_period: 0,
            stepwise: true,
            use_aic: true,
            max_iterations: 1000,
            differencing: None,
        }
    }
}

impl AutoARIMAConfig {
    /// Set maximum non-seasonal orders.
    pub fn with_max_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_p = max_p;
        self.max_d = max_d;
        self.max_q = max_q;
        self
    }

    /// Set maximum seasonal orders.
    pub fn with_seasonal_orders(mut self, max_p: usize, max_d: usize, max_q: usize) -> Self {
        self.max_cap_p = max_p;
        self.max_cap_d = max_d;
        self.max_cap_q = max_q;
        self
    }

    /// Set seasonal period.
    pub fn with_seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = period;
        self
    }

    /// Use exhaustive search instead of stepwise.
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    /// Rank candidates by BIC.
    pub fn use_bic(mut self) -> Self {
        self.use_aic = false;
        self
    }

    /// Cap optimizer iterations per candidate.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Pin the non-seasonal differencing order, or `None` to search for it.
    pub fn with_differencing(mut self, d: Option<usize>) -> Self {
        self.differencing = d;
        self
    }
}

const STEPWISE_ORDERS: [(usize, usize); 9] = [
    (0, 0),
    (1, 0),
    (0, 1),
    (1, 1),
    (2, 0),
    (0, 2),
    (2, 1),
    (1, 2),
    (2, 2),
];

const STEPWISE_SEASONAL_ORDERS: [(usize, usize); 8] = [
    (0, 1),
    (1, 0),
    (1, 1),
    (2, 0),
    (0, 2),
    (2, 1),
    (1, 2),
    (2, 2),
];

/// Automatic ARIMA/SARIMA model selection.
///
/// Fits every candidate order and keeps the one with the lowest AIC (or BIC).
#[derive(Debug, Clone)]
pub struct AutoARIMA {
    config: AutoARIMAConfig,
    selected: Option<ARIMA>,
    model_scores: Vec<(ModelOrder, f64)>,
}

impl AutoARIMA {
    /// Create a new AutoARIMA with default configuration.
    pub fn new() -> Self {
        Self::with_config(AutoARIMAConfig::default())
    }

    /// Create AutoARIMA with custom configuration.
    pub fn with_config(config: AutoARIMAConfig) -> Self {
        Self {
            config,
            selected: None,
            model_scores: Vec::new(),
        }
    }

    /// Create AutoARIMA with seasonal period.
    pub fn seasonal(period: usize) -> Self {
        Self::with_config(AutoARIMAConfig::default().with_seasonal_period(period))
    }

    pub fn config(&self) -> &AutoARIMAConfig {
        &self.config
    }

    /// Order of the selected model.
    pub fn selected_order(&self) -> Option<ModelOrder> {
        self.selected.as_ref().map(ARIMA::spec)
    }

    /// The selected, fitted model.
    pub fn selected_model(&self) -> Option<&ARIMA> {
        self.selected.as_ref()
    }

    /// Scores of every successfully fitted candidate, best first.
    pub fn model_scores(&self) -> &[(ModelOrder, f64)] {
        &self.model_scores
    }

    fn seasonal_part(&self) -> Option<usize> {
        let s = self.config.seasonal_period;
        (s > 1).then_some(s)
    }

    fn differencing_orders(&self, values: &[f64]) -> Vec<usize> {
        if let Some(d) = self.config.differencing {
            return vec![d];
        }

        let suggested = suggest_differencing(values).min(self.config.max_d);
        let mut orders = vec![suggested];
        if suggested > 0 {
            orders.push(suggested - 1);
        }
        if suggested < self.config.max_d {
            orders.push(suggested + 1);
        }
        orders.sort_unstable();
        orders.dedup();
        orders
    }

    fn seasonal_differencing_orders(&self, values: &[f64]) -> Vec<usize> {
        match self.seasonal_part() {
            Some(s) if self.config.max_cap_d > 0 => {
                let suggested = suggest_seasonal_differencing(values, s).min(self.config.max_cap_d);
                let mut orders = vec![0, suggested];
                orders.dedup();
                orders
            }
            _ => vec![0],
        }
    }

    fn candidates(&self, d: usize, cap_d: usize) -> Vec<ModelOrder> {
        let cfg = &self.config;
        let mut orders = Vec::new();

        let nonseasonal: Vec<(usize, usize)> = if cfg.stepwise {
            STEPWISE_ORDERS.to_vec()
        } else {
            (0..=cfg.max_p)
                .flat_map(|p| (0..=cfg.max_q).map(move |q| (p, q)))
                .collect()
        };
        let seasonal: Vec<(usize, usize)> = match self.seasonal_part() {
            None => vec![],
            Some(_) if cfg.stepwise => STEPWISE_SEASONAL_ORDERS.to_vec(),
            Some(_) => (0..=cfg.max_cap_p)
                .flat_map(|cp| (0..=cfg.max_cap_q).map(move |cq| (cp, cq)))
                .filter(|&order| order != (0, 0))
                .collect(),
        };

        let s = self.seasonal_part().unwrap_or(0);
        for &(p, q) in &nonseasonal {
            if p > cfg.max_p || q > cfg.max_q {
                continue;
            }
            let base = ARIMASpec::new(p, d, q);
            orders.push(if s > 0 {
                base.with_seasonal(0, cap_d, 0, s)
            } else {
                base
            });
            for &(cap_p, cap_q) in &seasonal {
                if cap_p <= cfg.max_cap_p && cap_q <= cfg.max_cap_q {
                    orders.push(base.with_seasonal(cap_p, cap_d, cap_q, s));
                }
            }
        }

        orders
    }

    fn score(&self, model: &ARIMA) -> Option<f64> {
        let score = if self.config.use_aic {
            model.aic()
        } else {
            model.bic()
        }?;
        score.is_finite().then_some(score)
    }
}

impl Default for AutoARIMA {
    fn default() -> Self {
        Self::new()
    }
}

impl Forecaster for AutoARIMA {
    fn fit(&mut self, series: &TimeSeries) -> Result<()> {
        let values = series.values();
        let min_required = match self.seasonal_part() {
            Some(s) => 3 * s,
            None => 10,
        };
        if values.len() < min_required {
            return Err(ForecastError::InsufficientData {
                needed: min_required,
                got: values.len(),
            });
        }

        let mut candidates = Vec::new();
        for d in self.differencing_orders(values) {
            for cap_d in self.seasonal_differencing_orders(values) {
                candidates.extend(self.candidates(d, cap_d));
            }
        }
        candidates.sort_by_key(|o| (o.d, o.cap_d, o.p, o.q, o.cap_p, o.cap_q));
        candidates.dedup();

        self.model_scores.clear();
        self.selected = None;
        let mut best_score = f64::INFINITY;
        let mut skipped = 0;
        let mut failed = 0;

        for order in &candidates {
            if values.len() < order.min_observations() + 3 {
                skipped += 1;
                continue;
            }

            let mut model = ARIMA::from_spec(*order).with_max_iterations(self.config.max_iterations);
            let score = match model.fit(series) {
                Ok(()) => self.score(&model),
                Err(_) => None,
            };
            let Some(score) = score else {
                failed += 1;
                continue;
            };

            self.model_scores.push((*order, score));
            if score < best_score {
                best_score = score;
                self.selected = Some(model);
            }
        }

        if skipped + failed > 0 {
            warn!(
                skipped,
                failed,
                total = candidates.len(),
                "order search left out candidate models"
            );
        }

        self.model_scores
            .sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let selected = self.selected.as_ref().ok_or_else(|| {
            ForecastError::ComputationError("no candidate ARIMA model could be fitted".to_string())
        })?;
        debug!(
            order = %selected.spec(),
            score = best_score,
            candidates = candidates.len(),
            "selected ARIMA order"
        );

        Ok(())
    }

    fn predict(&self, horizon: usize) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict(horizon)
    }

    fn predict_with_intervals(&self, horizon: usize, level: f64) -> Result<Forecast> {
        self.selected
            .as_ref()
            .ok_or(ForecastError::FitRequired)?
            .predict_with_intervals(horizon, level)
    }

    fn fitted_values(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.fitted_values()
    }

    fn residuals(&self) -> Option<&[f64]> {
        self.selected.as_ref()?.residuals()
    }

    fn name(&self) -> &str {
        "AutoARIMA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn make_series(values: Vec<f64>) -> TimeSeries {
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let timestamps = (0..values.len())
            .map(|i| base + Duration::days(i as i64))
            .collect();
        TimeSeries::univariate(timestamps, values).unwrap()
    }

    fn noise(n: usize, sd: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let dist = Normal::new(0.0, sd).unwrap();
        (0..n).map(|_| dist.sample(&mut rng)).collect()
    }

    #[test]
    fn auto_arima_selects_model() {
        let values: Vec<f64> = noise(100, 0.3, 1)
            .iter()
            .enumerate()
            .map(|(i, e)| 10.0 + (i as f64 * 0.2).sin() + e)
            .collect();

        let mut model = AutoARIMA::new();
        model.fit(&make_series(values)).unwrap();

        assert!(model.selected_order().is_some());
        assert!(!model.model_scores().is_empty());
        assert_eq!(model.predict(5).unwrap().horizon(), 5);
    }

    #[test]
    fn auto_arima_scores_are_sorted_and_best_is_selected() {
        let values: Vec<f64> = noise(120, 1.0, 2)
            .iter()
            .scan(0.0, |acc, e| {
                *acc = 0.6 * *acc + e;
                Some(*acc)
            })
            .collect();

        let mut model = AutoARIMA::new();
        model.fit(&make_series(values)).unwrap();

        let scores = model.model_scores();
        assert!(scores.windows(2).all(|w| w[0].1 <= w[1].1));
        assert_eq!(model.selected_order(), Some(scores[0].0));
    }

    #[test]
    fn auto_arima_differences_trending_series() {
        let values: Vec<f64> = noise(100, 0.5, 3)
            .iter()
            .enumerate()
            .map(|(i, e)| 10.0 + 1.5 * i as f64 + e)
            .collect();

        let mut model = AutoARIMA::new();
        model.fit(&make_series(values)).unwrap();

        assert!(model.model_scores().iter().any(|(o, _)| o.d >= 1));
        let forecast = model.predict(3).unwrap();
        assert!(forecast.primary()[2] > 150.0);
    }

    #[test]
    fn fixed_differencing_pins_d() {
        let values: Vec<f64> = noise(80, 1.0, 4)
            .iter()
            .enumerate()
            .map(|(i, e)| i as f64 + e)
            .collect();

        let config = AutoARIMAConfig::default().with_differencing(Some(0));
        let mut model = AutoARIMA::with_config(config);
        model.fit(&make_series(values)).unwrap();

        assert!(model.model_scores().iter().all(|(o, _)| o.d == 0));
        assert_eq!(model.selected_order().unwrap().d, 0);
    }

    #[test]
    fn exhaustive_search_covers_more_orders() {
        let values = noise(90, 1.0, 5);
        let series = make_series(values);

        let stepwise = AutoARIMA::with_config(AutoARIMAConfig::default().with_differencing(Some(0)));
        let exhaustive = AutoARIMA::with_config(
            AutoARIMAConfig::default()
                .with_differencing(Some(0))
                .with_max_orders(3, 0, 3)
                .exhaustive(),
        );

        assert_eq!(stepwise.candidates(0, 0).len(), 9);
        assert_eq!(exhaustive.candidates(0, 0).len(), 16);

        let mut fitted = exhaustive;
        fitted.fit(&series).unwrap();
        assert_eq!(fitted.model_scores().len(), 16);
    }

    #[test]
    fn seasonal_search_captures_weekly_pattern() {
        let pattern = [12.0, 4.0, 5.0, 6.0, 5.5, 14.0, 16.0];
        let values: Vec<f64> = noise(140, 0.3, 6)
            .iter()
            .enumerate()
            .map(|(i, e)| pattern[i % 7] + e)
            .collect();

        let config = AutoARIMAConfig::default()
            .with_seasonal_period(7)
            .with_max_orders(2, 0, 2)
            .with_seasonal_orders(1, 1, 1)
            .with_differencing(Some(0))
            .with_max_iterations(300);
        let mut model = AutoARIMA::with_config(config);
        model.fit(&make_series(values)).unwrap();

        assert!(model.selected_order().unwrap().is_seasonal());

        let forecast = model.predict(14).unwrap();
        let mae = forecast
            .primary()
            .iter()
            .enumerate()
            .map(|(h, v)| (v - pattern[(140 + h) % 7]).abs())
            .sum::<f64>()
            / 14.0;
        assert!(mae < 2.0, "mae = {mae}");
    }

    #[test]
    fn bic_prefers_no_larger_models_than_aic() {
        let values = noise(150, 1.0, 7);
        let series = make_series(values);

        let mut aic = AutoARIMA::with_config(AutoARIMAConfig::default().with_differencing(Some(0)));
        let mut bic = AutoARIMA::with_config(
            AutoARIMAConfig::default()
                .with_differencing(Some(0))
                .use_bic(),
        );
        aic.fit(&series).unwrap();
        bic.fit(&series).unwrap();

        let size = |o: ModelOrder| o.num_params();
        assert!(size(bic.selected_order().unwrap()) <= size(aic.selected_order().unwrap()));
    }

    #[test]
    fn auto_arima_insufficient_data() {
        let mut model = AutoARIMA::new();
        assert!(matches!(
            model.fit(&make_series(vec![1.0, 2.0, 3.0])),
            Err(ForecastError::InsufficientData { needed: 10, got: 3 })
        ));

        let mut seasonal = AutoARIMA::seasonal(7);
        assert!(matches!(
            seasonal.fit(&make_series(vec![1.0; 15])),
            Err(ForecastError::InsufficientData { needed: 21, got: 15 })
        ));
    }

    #[test]
    fn auto_arima_requires_fit() {
        let model = AutoARIMA::new();
        assert!(matches!(model.predict(5), Err(ForecastError::FitRequired)));
        assert!(model.fitted_values().is_none());
        assert_eq!(model.name(), "AutoARIMA");
    }
}
