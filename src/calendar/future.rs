//! Regressor frames for dates beyond the end of a training series.

use crate::calendar::design::{seasonal_index, SeasonalDesign, SeasonalFeatures};
use crate::core::TimeSeries;
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

/// Contiguous index anchored at the last training timestamp: `horizon + 1`
/// periods, the anchor included.
fn anchored_range(horizon: usize, training: &TimeSeries) -> Result<Vec<DateTime<Utc>>> {
    if horizon == 0 {
        return Err(ForecastError::InvalidHorizon(horizon));
    }
    let anchor = training.last_timestamp().ok_or(ForecastError::EmptyData)?;
    let step = training.step()?;

    let too_large = || ForecastError::InvalidParameter(format!("horizon {horizon} is too large"));
    let periods = i32::try_from(horizon).map_err(|_| too_large())?;

    // Reject a range that leaves chrono's date range before allocating it.
    step.checked_mul(periods)
        .and_then(|span| anchor.checked_add_signed(span))
        .ok_or_else(too_large)?;

    (0..=periods)
        .map(|k| {
            step.checked_mul(k)
                .and_then(|offset| anchor.checked_add_signed(offset))
                .ok_or_else(too_large)
        })
        .collect()
}

/// Dates of the `horizon` periods following the last training timestamp.
pub fn future_dates(horizon: usize, training: &TimeSeries) -> Result<Vec<DateTime<Utc>>> {
    let mut range = anchored_range(horizon, training)?;
    range.remove(0);
    Ok(range)
}

/// Build the seasonal design matrix for the `horizon` periods after `training`.
///
/// The full range (last training date plus the horizon) is encoded first and
/// the future rows are sliced off it, so the frame continues the training
/// index at its own frequency. The schema is identical to the one
/// [`seasonal_index`] produces for the training dates with the same flags.
///
/// # Errors
/// [`ForecastError::InvalidHorizon`] when `horizon` is zero and
/// [`ForecastError::EmptyData`] for an empty training series.
pub fn future_frame(
    horizon: usize,
    training: &TimeSeries,
    features: SeasonalFeatures,
) -> Result<SeasonalDesign> {
    let range = anchored_range(horizon, training)?;
    let full = seasonal_index(&range, features)?;
    let frame = full.slice(full.len() - horizon, full.len())?;

    debug!(
        horizon,
        first = %frame.dates()[0],
        columns = frame.num_columns(),
        "built future regressor frame"
    );
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn daily_series(start: DateTime<Utc>, n: usize) -> TimeSeries {
        TimeSeries::daily(start, (0..n).map(|i| i as f64).collect()).unwrap()
    }

    fn jan_first_2020() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn frame_covers_exactly_the_horizon() {
        let series = daily_series(jan_first_2020(), 30);
        let last = series.last_timestamp().unwrap();

        for horizon in [1, 7, 28, 90] {
            let frame = future_frame(horizon, &series, SeasonalFeatures::default()).unwrap();
            assert_eq!(frame.len(), horizon);
            assert_eq!(frame.dates()[0], last + Duration::days(1));
            assert_eq!(
                *frame.dates().last().unwrap(),
                last + Duration::days(horizon as i64)
            );
        }
    }

    #[test]
    fn year_end_holdout_spans_into_next_year() {
        // 2020 is a leap year: 365 days from Jan 1 ends on Dec 30.
        let series = daily_series(jan_first_2020(), 365);
        assert_eq!(
            series.last_timestamp().unwrap(),
            Utc.with_ymd_and_hms(2020, 12, 30, 0, 0, 0).unwrap()
        );

        let frame = future_frame(28, &series, SeasonalFeatures::default()).unwrap();
        let training = seasonal_index(series.timestamps(), SeasonalFeatures::default()).unwrap();

        assert_eq!(frame.len(), 28);
        assert_eq!(
            frame.dates()[0],
            Utc.with_ymd_and_hms(2020, 12, 31, 0, 0, 0).unwrap()
        );
        assert_eq!(
            frame.dates()[27],
            Utc.with_ymd_and_hms(2021, 1, 27, 0, 0, 0).unwrap()
        );
        assert_eq!(frame.schema(), training.schema());
        assert!(frame.ensure_schema(&training.schema()).is_ok());

        // Dec 31 is in the December column, the January rows in none.
        assert_eq!(frame.column_by_name("month_12").unwrap()[0], 1.0);
        assert!(frame.column_by_name("month_12").unwrap()[1..]
            .iter()
            .all(|&v| v == 0.0));
    }

    #[test]
    fn rows_match_direct_encoding_of_future_dates() {
        let series = daily_series(jan_first_2020(), 45);
        let frame = future_frame(10, &series, SeasonalFeatures::default()).unwrap();
        let dates = future_dates(10, &series).unwrap();
        let direct = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();

        assert_eq!(frame, direct);
    }

    #[test]
    fn rejects_zero_horizon() {
        let series = daily_series(jan_first_2020(), 10);
        assert!(matches!(
            future_frame(0, &series, SeasonalFeatures::default()),
            Err(ForecastError::InvalidHorizon(0))
        ));
        assert!(matches!(
            future_dates(0, &series),
            Err(ForecastError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn rejects_horizon_past_the_representable_date_range() {
        let series = daily_series(jan_first_2020(), 10);

        for horizon in [i32::MAX as usize, usize::MAX] {
            assert!(matches!(
                future_dates(horizon, &series),
                Err(ForecastError::InvalidParameter(_))
            ));
            assert!(matches!(
                future_frame(horizon, &series, SeasonalFeatures::default()),
                Err(ForecastError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn rejects_empty_training_series() {
        let empty = TimeSeries::univariate(vec![], vec![]).unwrap();
        assert!(matches!(
            future_frame(5, &empty, SeasonalFeatures::default()),
            Err(ForecastError::EmptyData)
        ));
    }

    #[test]
    fn single_observation_defaults_to_daily_steps() {
        let series = TimeSeries::univariate(vec![jan_first_2020()], vec![3.0]).unwrap();
        let dates = future_dates(3, &series).unwrap();

        assert_eq!(dates[0], jan_first_2020() + Duration::days(1));
        assert_eq!(dates[2], jan_first_2020() + Duration::days(3));
    }

    #[test]
    fn gapped_series_continues_from_last_date() {
        let d = jan_first_2020();
        let timestamps: Vec<_> = (0..10)
            .map(|i| d + Duration::days(i))
            .chain(std::iter::once(d + Duration::days(20)))
            .collect();
        let series = TimeSeries::univariate(timestamps, vec![1.0; 11]).unwrap();

        let dates = future_dates(2, &series).unwrap();
        assert_eq!(dates, vec![d + Duration::days(21), d + Duration::days(22)]);
    }
}
