//! TimeSeries data structure for daily (or otherwise regular) observations.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// A univariate time series: an ordered date index with one value per timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<DateTime<Utc>>,
    values: Vec<f64>,
    label: Option<String>,
    frequency: Option<Duration>,
}

impl TimeSeries {
    /// Create a univariate time series.
    ///
    /// Timestamps must be strictly increasing and match the number of values.
    pub fn univariate(timestamps: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self> {
        if values.len() != timestamps.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: timestamps.len(),
                got: values.len(),
            });
        }

        if timestamps.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ForecastError::TimestampError(
                "timestamps must be strictly increasing".to_string(),
            ));
        }

        Ok(Self {
            timestamps,
            values,
            label: None,
            frequency: None,
        })
    }

    /// Create a contiguous daily series starting at `start`.
    pub fn daily(start: DateTime<Utc>, values: Vec<f64>) -> Result<Self> {
        let timestamps = (0..values.len())
            .map(|i| start + Duration::days(i as i64))
            .collect();
        let mut ts = Self::univariate(timestamps, values)?;
        ts.frequency = Some(Duration::days(1));
        Ok(ts)
    }

    /// Get the number of observations.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Get timestamps.
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Get the observed values.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// First timestamp of the index.
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    /// Last timestamp of the index.
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Get the series label.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set the series label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Get the declared frequency.
    pub fn frequency(&self) -> Option<Duration> {
        self.frequency
    }

    /// Declare the sampling frequency. Must be a positive duration.
    pub fn set_frequency(&mut self, freq: Duration) -> Result<()> {
        if freq <= Duration::zero() {
            return Err(ForecastError::InvalidParameter(
                "frequency must be a positive duration".to_string(),
            ));
        }
        self.frequency = Some(freq);
        Ok(())
    }

    /// Sampling step used to extend the index forward.
    ///
    /// Uses the declared frequency, then the modal spacing of the index, and
    /// falls back to one day for a single observation.
    pub fn step(&self) -> Result<Duration> {
        if let Some(freq) = self.frequency {
            return Ok(freq);
        }
        match self.len() {
            0 => Err(ForecastError::EmptyData),
            1 => Ok(Duration::days(1)),
            _ => self.infer_frequency(0.5),
        }
    }

    /// A series sharing this index with different values (e.g. residuals).
    pub fn with_values(&self, values: Vec<f64>) -> Result<TimeSeries> {
        if values.len() != self.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.len(),
                got: values.len(),
            });
        }
        Ok(TimeSeries {
            timestamps: self.timestamps.clone(),
            values,
            label: self.label.clone(),
            frequency: self.frequency,
        })
    }

    /// Extract a slice of the time series.
    pub fn slice(&self, start: usize, end: usize) -> Result<TimeSeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(
                "start must be <= end".to_string(),
            ));
        }
        if end > self.len() {
            return Err(ForecastError::IndexOutOfBounds {
                index: end,
                size: self.len(),
            });
        }

        Ok(TimeSeries {
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
            label: self.label.clone(),
            frequency: self.frequency,
        })
    }

    /// Split off the last `holdout` observations as a test set.
    pub fn split_holdout(&self, holdout: usize) -> Result<(TimeSeries, TimeSeries)> {
        if holdout == 0 || holdout >= self.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "holdout must be in 1..{}, got {}",
                self.len(),
                holdout
            )));
        }
        let cut = self.len() - holdout;
        Ok((self.slice(0, cut)?, self.slice(cut, self.len())?))
    }

    /// Check if series has missing values (NaN or Inf).
    pub fn has_missing_values(&self) -> bool {
        self.values.iter().any(|v| !v.is_finite())
    }

    /// Infer frequency from the modal spacing of the timestamps.
    pub fn infer_frequency(&self, tolerance: f64) -> Result<Duration> {
        if self.len() < 2 {
            return Err(ForecastError::InsufficientData {
                needed: 2,
                got: self.len(),
            });
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in self.timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // Ties resolve to the smallest spacing so inference is deterministic.
        let (modal_diff, modal_count) = counts
            .iter()
            .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then(db.cmp(da)))
            .map(|(&diff, &count)| (diff, count))
            .ok_or(ForecastError::FrequencyInference(
                "empty spacing data".to_string(),
            ))?;

        let total_count: usize = counts.values().sum();
        let modal_ratio = modal_count as f64 / total_count as f64;

        if modal_ratio < tolerance {
            return Err(ForecastError::FrequencyInference(
                "no unique modal spacing found".to_string(),
            ));
        }

        Ok(Duration::seconds(modal_diff))
    }

    /// Whether consecutive timestamps are exactly one step apart.
    pub fn is_contiguous(&self) -> bool {
        match self.step() {
            Ok(step) => self.timestamps.windows(2).all(|w| w[1] - w[0] == step),
            Err(_) => false,
        }
    }
}
