//! Differencing and lag-polynomial helpers for ARIMA models.

use crate::utils::stats::variance;

/// Apply differencing to a time series.
///
/// # Arguments
/// * `series` - The input series
/// * `d` - Differencing order (number of times to difference)
///
/// # Returns
/// The differenced series, `d` observations shorter than the input.
pub fn difference(series: &[f64], d: usize) -> Vec<f64> {
    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= 1 {
            break;
        }
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    result
}

/// Apply seasonal differencing `y[t] - y[t - period]`, `d` times.
pub fn seasonal_difference(series: &[f64], d: usize, period: usize) -> Vec<f64> {
    if period == 0 {
        return series.to_vec();
    }

    let mut result = series.to_vec();
    for _ in 0..d {
        if result.len() <= period {
            break;
        }
        result = result[period..]
            .iter()
            .zip(result.iter())
            .map(|(curr, prev)| curr - prev)
            .collect();
    }
    result
}

/// Polynomial multiplication (convolution) of lag polynomials stored
/// lowest power first.
pub fn polymul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    out
}

/// Expanded `(1 - L)^d (1 - L^s)^D`, lowest power first.
///
/// # Example
/// ```
/// use calendar_arimax::models::arima::differencing_polynomial;
///
/// assert_eq!(differencing_polynomial(1, 0, 0), vec![1.0, -1.0]);
/// assert_eq!(differencing_polynomial(0, 1, 3), vec![1.0, 0.0, 0.0, -1.0]);
/// ```
pub fn differencing_polynomial(d: usize, seasonal_d: usize, period: usize) -> Vec<f64> {
    let mut poly = vec![1.0];
    for _ in 0..d {
        poly = polymul(&poly, &[1.0, -1.0]);
    }
    if period > 0 {
        let mut seasonal = vec![0.0; period + 1];
        seasonal[0] = 1.0;
        seasonal[period] = -1.0;
        for _ in 0..seasonal_d {
            poly = polymul(&poly, &seasonal);
        }
    }
    poly
}

/// Suggest a differencing order (0, 1, or 2) from variance ratios.
///
/// A difference is taken when it shrinks the variance by at least 10%.
pub fn suggest_differencing(series: &[f64]) -> usize {
    if series.len() < 3 {
        return 0;
    }

    let var_0 = variance(series);
    let diff_1 = difference(series, 1);
    let var_1 = variance(&diff_1);

    if !(var_0 > 0.0 && var_1 / var_0 < 0.9) {
        return 0;
    }

    let diff_2 = difference(&diff_1, 1);
    if diff_2.len() >= 2 {
        let var_2 = variance(&diff_2);
        if var_2 / var_1 < 0.9 && var_2 < var_0 {
            return 2;
        }
    }
    1
}

/// Suggest a seasonal differencing order (0 or 1).
///
/// One seasonal difference is suggested when it removes at least 30% of
/// the variance.
pub fn suggest_seasonal_differencing(series: &[f64], period: usize) -> usize {
    if period < 2 || series.len() < 2 * period {
        return 0;
    }

    let base = variance(series);
    let differenced = variance(&seasonal_difference(series, 1, period));

    if base > 0.0 && differenced < 0.7 * base {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn difference_orders() {
        let series = vec![1.0, 4.0, 9.0, 16.0, 25.0];

        assert_eq!(difference(&series, 0), series);
        assert_eq!(difference(&series, 1), vec![3.0, 5.0, 7.0, 9.0]);
        assert_eq!(difference(&series, 2), vec![2.0, 2.0, 2.0]);
    }

    #[test]
    fn seasonal_difference_removes_weekly_pattern() {
        let pattern = [5.0, 1.0, 2.0, 3.0, 4.0, 8.0, 9.0];
        let series: Vec<f64> = (0..28).map(|i| pattern[i % 7] + 0.1 * i as f64).collect();

        let result = seasonal_difference(&series, 1, 7);

        assert_eq!(result.len(), 21);
        for value in result {
            assert_relative_eq!(value, 0.7, epsilon = 1e-10);
        }
    }

    #[test]
    fn seasonal_difference_short_series_is_unchanged() {
        let series = vec![1.0, 2.0, 3.0];
        assert_eq!(seasonal_difference(&series, 1, 7), series);
        assert_eq!(seasonal_difference(&series, 1, 0), series);
    }

    #[test]
    fn polymul_expands_products() {
        // (1 - 0.5L)(1 + 0.3L) = 1 - 0.2L - 0.15L^2
        let product = polymul(&[1.0, -0.5], &[1.0, 0.3]);
        assert_relative_eq!(product[0], 1.0);
        assert_relative_eq!(product[1], -0.2, epsilon = 1e-12);
        assert_relative_eq!(product[2], -0.15, epsilon = 1e-12);
        assert!(polymul(&[], &[1.0]).is_empty());
    }

    #[test]
    fn differencing_polynomial_matches_explicit_differences() {
        let series: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin() * 3.0 + i as f64).collect();
        let poly = differencing_polynomial(1, 1, 7);
        assert_eq!(poly.len(), 9);

        let explicit = seasonal_difference(&difference(&series, 1), 1, 7);
        let degree = poly.len() - 1;
        for (k, &expected) in explicit.iter().enumerate() {
            let t = k + degree;
            let applied: f64 = poly.iter().enumerate().map(|(j, c)| c * series[t - j]).sum();
            assert_relative_eq!(applied, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn suggest_differencing_for_trend_and_level() {
        let trend: Vec<f64> = (0..60).map(|i| 3.0 * i as f64 + (i as f64).sin()).collect();
        assert!(suggest_differencing(&trend) >= 1);

        let noise: Vec<f64> = (0..60).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        assert_eq!(suggest_differencing(&noise), 0);
        assert_eq!(suggest_differencing(&[1.0, 2.0]), 0);
    }

    #[test]
    fn suggest_seasonal_differencing_detects_period() {
        let pattern = [10.0, 2.0, 3.0, 2.5, 4.0, 12.0, 14.0];
        let series: Vec<f64> = (0..70).map(|i| pattern[i % 7]).collect();

        assert_eq!(suggest_seasonal_differencing(&series, 7), 1);
        assert_eq!(suggest_seasonal_differencing(&series, 1), 0);
        assert_eq!(suggest_seasonal_differencing(&series[..10], 7), 0);
    }
}
