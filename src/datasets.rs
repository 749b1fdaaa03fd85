//! Built-in synthetic daily dataset.
//!
//! A reproducible stand-in for a daily demand series: a slowly trending level,
//! a weekly profile, an annual cycle, and AR(1) noise.

use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};

/// Shape of the generated daily demand series.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyDemandConfig {
    /// Level on the first day.
    pub level: f64,
    /// Change in level per day.
    pub trend: f64,
    /// Additive effect per weekday, Monday first.
    pub weekly: [f64; 7],
    /// Amplitude of the annual sine cycle, peaking in early April.
    pub yearly_amplitude: f64,
    /// AR(1) coefficient of the noise, in (-1, 1).
    pub ar: f64,
    /// Standard deviation of the noise innovations.
    pub noise_sd: f64,
}

impl Default for DailyDemandConfig {
    fn default() -> Self {
        Self {
            level: 100.0,
            trend: 0.01,
            weekly: [0.0, 2.0, 3.0, 2.5, 6.0, 14.0, 9.0],
            yearly_amplitude: 12.0,
            ar: 0.5,
            noise_sd: 3.0,
        }
    }
}

impl DailyDemandConfig {
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = level;
        self
    }

    pub fn with_trend(mut self, trend: f64) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_weekly(mut self, weekly: [f64; 7]) -> Self {
        self.weekly = weekly;
        self
    }

    pub fn with_yearly_amplitude(mut self, amplitude: f64) -> Self {
        self.yearly_amplitude = amplitude;
        self
    }

    /// Set the AR(1) noise coefficient and innovation standard deviation.
    pub fn with_noise(mut self, ar: f64, sd: f64) -> Self {
        self.ar = ar;
        self.noise_sd = sd;
        self
    }

    /// Deterministic part of the series on `date`, `day` days after the start.
    pub fn expected(&self, date: DateTime<Utc>, day: usize) -> f64 {
        let weekday = date.weekday().num_days_from_monday() as usize;
        let phase = 2.0 * PI * f64::from(date.ordinal0()) / 365.25;
        self.level + self.trend * day as f64 + self.weekly[weekday] + self.yearly_amplitude * phase.sin()
    }

    /// Generate `days` consecutive daily observations starting at `start`.
    ///
    /// The same `seed` always yields the same series.
    pub fn generate(&self, start: DateTime<Utc>, days: usize, seed: u64) -> Result<TimeSeries> {
        if days == 0 {
            return Err(ForecastError::EmptyData);
        }
        if !(self.ar.abs() < 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "noise AR coefficient must be in (-1, 1), got {}",
                self.ar
            )));
        }
        let innovations = Normal::new(0.0, self.noise_sd).map_err(|e| {
            ForecastError::InvalidParameter(format!("noise distribution error: {e}"))
        })?;

        let mut rng = StdRng::seed_from_u64(seed);
        let mut noise = 0.0;
        let mut timestamps = Vec::with_capacity(days);
        let mut values = Vec::with_capacity(days);

        for day in 0..days {
            let date = start + Duration::days(day as i64);
            noise = self.ar * noise + innovations.sample(&mut rng);
            timestamps.push(date);
            values.push(self.expected(date, day) + noise);
        }

        let mut series = TimeSeries::univariate(timestamps, values)?;
        series.set_frequency(Duration::days(1))?;
        series.set_label("daily_demand");
        Ok(series)
    }
}

/// Daily demand series with the default shape.
///
/// # Example
/// ```
/// use calendar_arimax::datasets::daily_demand;
/// use chrono::{TimeZone, Utc};
///
/// let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
/// let series = daily_demand(start, 365, 42).unwrap();
///
/// assert_eq!(series.len(), 365);
/// assert_eq!(series, daily_demand(start, 365, 42).unwrap());
/// ```
pub fn daily_demand(start: DateTime<Utc>, days: usize, seed: u64) -> Result<TimeSeries> {
    DailyDemandConfig::default().generate(start, days, seed)
}
