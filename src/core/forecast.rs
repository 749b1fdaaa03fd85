//! Forecast result structure for holding predictions.

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};

/// Lower and upper bounds at one confidence level.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionInterval {
    /// Confidence level in (0, 1), e.g. 0.95.
    pub level: f64,
    /// Lower bound per forecast step.
    pub lower: Vec<f64>,
    /// Upper bound per forecast step.
    pub upper: Vec<f64>,
}

impl PredictionInterval {
    /// Width (upper - lower) per step.
    pub fn widths(&self) -> Vec<f64> {
        self.upper
            .iter()
            .zip(self.lower.iter())
            .map(|(u, l)| u - l)
            .collect()
    }
}

/// A forecast result: point predictions, their future dates, and optional
/// prediction intervals at one or more confidence levels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forecast {
    point: Vec<f64>,
    timestamps: Vec<DateTime<Utc>>,
    /// Sorted by ascending level.
    intervals: Vec<PredictionInterval>,
}

impl Forecast {
    /// Create an empty forecast.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a forecast from point predictions.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            point: values,
            ..Self::default()
        }
    }

    /// Create a forecast with a single prediction interval.
    pub fn from_values_with_interval(
        values: Vec<f64>,
        level: f64,
        lower: Vec<f64>,
        upper: Vec<f64>,
    ) -> Result<Self> {
        Self::from_values(values).with_interval(level, lower, upper)
    }

    /// Attach the future dates the predictions refer to.
    pub fn with_timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Result<Self> {
        if timestamps.len() != self.point.len() {
            return Err(ForecastError::DimensionMismatch {
                expected: self.point.len(),
                got: timestamps.len(),
            });
        }
        self.timestamps = timestamps;
        Ok(self)
    }

    /// Add (or replace) the interval at `level`.
    pub fn with_interval(mut self, level: f64, lower: Vec<f64>, upper: Vec<f64>) -> Result<Self> {
        if !(level > 0.0 && level < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {level}"
            )));
        }
        for bound in [&lower, &upper] {
            if bound.len() != self.point.len() {
                return Err(ForecastError::DimensionMismatch {
                    expected: self.point.len(),
                    got: bound.len(),
                });
            }
        }

        self.intervals.retain(|i| i.level != level);
        self.intervals.push(PredictionInterval { level, lower, upper });
        self.intervals
            .sort_by(|a, b| a.level.partial_cmp(&b.level).unwrap_or(std::cmp::Ordering::Equal));
        Ok(self)
    }

    /// Drop every interval, keeping points and timestamps.
    pub fn without_intervals(mut self) -> Self {
        self.intervals.clear();
        self
    }

    /// Get the forecast horizon (number of steps).
    pub fn horizon(&self) -> usize {
        self.point.len()
    }

    /// Check if forecast is empty.
    pub fn is_empty(&self) -> bool {
        self.point.is_empty()
    }

    /// Point predictions.
    pub fn primary(&self) -> &[f64] {
        &self.point
    }

    /// Future dates aligned with the predictions (empty when not attached).
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Check if any interval is available.
    pub fn has_intervals(&self) -> bool {
        !self.intervals.is_empty()
    }

    /// All intervals, ascending by level.
    pub fn intervals(&self) -> &[PredictionInterval] {
        &self.intervals
    }

    /// Confidence levels that carry an interval.
    pub fn levels(&self) -> Vec<f64> {
        self.intervals.iter().map(|i| i.level).collect()
    }

    /// Interval at a given confidence level.
    pub fn interval(&self, level: f64) -> Option<&PredictionInterval> {
        self.intervals
            .iter()
            .find(|i| (i.level - level).abs() < 1e-12)
    }

    /// Lower bounds at `level`.
    pub fn lower(&self, level: f64) -> Result<&[f64]> {
        self.interval(level)
            .map(|i| i.lower.as_slice())
            .ok_or_else(|| missing_level(level))
    }

    /// Upper bounds at `level`.
    pub fn upper(&self, level: f64) -> Result<&[f64]> {
        self.interval(level)
            .map(|i| i.upper.as_slice())
            .ok_or_else(|| missing_level(level))
    }
}

fn missing_level(level: f64) -> ForecastError {
    ForecastError::InvalidParameter(format!("no prediction interval at level {level}"))
}
