//! Accuracy and interval metrics for evaluating holdout forecasts.

use crate::error::{ForecastError, Result};
use crate::utils::stats::mean;

/// Point accuracy of a forecast over a holdout window.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyMetrics {
    pub mae: f64,
    pub mse: f64,
    pub rmse: f64,
    /// Percentage error, `None` when an actual value is zero.
    pub mape: Option<f64>,
    /// Symmetric percentage error in [0, 200].
    pub smape: f64,
    /// MAE relative to the in-window (seasonal) naive forecast. `None` when
    /// the window is no longer than the period or the naive error is zero.
    pub mase: Option<f64>,
    /// 1 - SSE/SST; 1.0 for a constant window.
    pub r_squared: f64,
}

/// Accuracy of `predicted` against `actual`.
///
/// `seasonal_period` sets the lag of the naive forecast used to scale MASE
/// (lag 1 when `None`).
pub fn calculate_metrics(
    actual: &[f64],
    predicted: &[f64],
    seasonal_period: Option<usize>,
) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if actual.len() != predicted.len() {
        return Err(ForecastError::DimensionMismatch {
            expected: actual.len(),
            got: predicted.len(),
        });
    }

    let n = actual.len() as f64;
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let sse: f64 = errors.iter().map(|e| e * e).sum();
    let mse = sse / n;

    let mape = (!actual.contains(&0.0)).then(|| {
        100.0 * actual.iter().zip(&errors).map(|(a, e)| (e / a).abs()).sum::<f64>() / n
    });

    let smape = 100.0
        * actual
            .iter()
            .zip(predicted)
            .zip(&errors)
            .map(|((a, p), e)| match a.abs() + p.abs() {
                d if d == 0.0 => 0.0,
                d => 2.0 * e.abs() / d,
            })
            .sum::<f64>()
        / n;

    let centre = mean(actual);
    let sst: f64 = actual.iter().map(|a| (a - centre).powi(2)).sum();
    let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - sse / sst };

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        smape,
        mase: naive_mae(actual, seasonal_period.unwrap_or(1)).map(|scale| mae / scale),
        r_squared,
    })
}

/// MAE of the lag-`period` naive forecast within `actual`.
fn naive_mae(actual: &[f64], period: usize) -> Option<f64> {
    if period == 0 || actual.len() <= period {
        return None;
    }
    let diffs: Vec<f64> = actual
        .windows(period + 1)
        .map(|w| (w[period] - w[0]).abs())
        .collect();
    let scale = mean(&diffs);
    (scale > 0.0).then_some(scale)
}

/// Share of actual values that fall inside `[lower, upper]`.
pub fn interval_coverage(actual: &[f64], lower: &[f64], upper: &[f64]) -> Result<f64> {
    check_interval_shapes(actual, lower, upper)?;

    let inside = actual
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .filter(|(&a, (&lo, &up))| a >= lo && a <= up)
        .count();

    Ok(inside as f64 / actual.len() as f64)
}

/// Mean Winkler score of an interval forecast at significance `alpha`.
///
/// Interval width plus a `2 / alpha` penalty per unit of miss. Lower is better.
pub fn winkler_score(actual: &[f64], lower: &[f64], upper: &[f64], alpha: f64) -> Result<f64> {
    check_interval_shapes(actual, lower, upper)?;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "alpha must be in (0, 1), got {alpha}"
        )));
    }

    let total: f64 = actual
        .iter()
        .zip(lower.iter().zip(upper.iter()))
        .map(|(&a, (&lo, &up))| {
            let width = up - lo;
            if a < lo {
                width + (2.0 / alpha) * (lo - a)
            } else if a > up {
                width + (2.0 / alpha) * (a - up)
            } else {
                width
            }
        })
        .sum();

    Ok(total / actual.len() as f64)
}

fn check_interval_shapes(actual: &[f64], lower: &[f64], upper: &[f64]) -> Result<()> {
    if actual.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    for bound in [lower, upper] {
        if bound.len() != actual.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: actual.len(),
                got: bound.len(),
            });
        }
    }
    Ok(())
}
