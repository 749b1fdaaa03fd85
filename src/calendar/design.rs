//! Seasonal dummy-variable design matrices.
//!
//! Categories come from closed enumerations (calendar months, weekdays), so
//! the column schema depends only on which groups are enabled and never on
//! which dates happen to be present. Training-time and forecast-time frames
//! built with the same [`SeasonalFeatures`] are therefore always compatible.

use crate::error::{ForecastError, Result};
use crate::utils::ols::Regressors;
use chrono::{DateTime, Datelike, Month, Utc, Weekday};
use std::fmt;

/// Months that receive an indicator column. January is the reference level.
pub const MONTH_LEVELS: [Month; 11] = [
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Weekdays that receive an indicator column. Monday is the reference level.
pub const WEEKDAY_LEVELS: [Weekday; 6] = [
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Which seasonal indicator groups to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonalFeatures {
    /// Month-of-year indicators (`month_2` ..= `month_12`).
    pub include_month: bool,
    /// Day-of-week indicators (`dow_1` ..= `dow_6`, 0 = Monday).
    pub include_dow: bool,
}

impl Default for SeasonalFeatures {
    fn default() -> Self {
        Self {
            include_month: true,
            include_dow: true,
        }
    }
}

impl SeasonalFeatures {
    pub fn new(include_month: bool, include_dow: bool) -> Self {
        Self {
            include_month,
            include_dow,
        }
    }

    pub fn month_only() -> Self {
        Self::new(true, false)
    }

    pub fn weekday_only() -> Self {
        Self::new(false, true)
    }

    pub fn none() -> Self {
        Self::new(false, false)
    }

    /// Column schema produced by these flags.
    pub fn schema(self) -> SeasonalSchema {
        SeasonalSchema { features: self }
    }
}

/// One indicator column of the design matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeasonalColumn {
    /// "month equals k" for k in 2..=12.
    Month(Month),
    /// "weekday equals k" for k in 1..=6 (0 = Monday).
    Weekday(Weekday),
}

impl SeasonalColumn {
    /// Stable column name, e.g. `month_7` or `dow_2`.
    pub fn name(&self) -> String {
        match self {
            SeasonalColumn::Month(m) => format!("month_{}", m.number_from_month()),
            SeasonalColumn::Weekday(w) => format!("dow_{}", w.num_days_from_monday()),
        }
    }

    /// Whether the indicator is set for `date`.
    pub fn is_active(&self, date: &DateTime<Utc>) -> bool {
        match self {
            SeasonalColumn::Month(m) => date.month() == m.number_from_month(),
            SeasonalColumn::Weekday(w) => date.weekday() == *w,
        }
    }

    /// Whether this column is a reference-coded level of `features`' groups.
    fn enabled_by(&self, features: SeasonalFeatures) -> bool {
        match self {
            SeasonalColumn::Month(m) => features.include_month && *m != Month::January,
            SeasonalColumn::Weekday(w) => features.include_dow && *w != Weekday::Mon,
        }
    }
}

impl fmt::Display for SeasonalColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Ordered column layout of a [`SeasonalDesign`]: month block, then weekday block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeasonalSchema {
    features: SeasonalFeatures,
}

impl SeasonalSchema {
    /// Flags this schema was derived from.
    pub fn features(&self) -> SeasonalFeatures {
        self.features
    }

    /// Columns in output order.
    pub fn columns(&self) -> Vec<SeasonalColumn> {
        let mut columns = Vec::with_capacity(self.len());
        if self.features.include_month {
            columns.extend(MONTH_LEVELS.iter().map(|&m| SeasonalColumn::Month(m)));
        }
        if self.features.include_dow {
            columns.extend(WEEKDAY_LEVELS.iter().map(|&w| SeasonalColumn::Weekday(w)));
        }
        columns
    }

    /// Column names in output order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns().iter().map(SeasonalColumn::name).collect()
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        let months = if self.features.include_month {
            MONTH_LEVELS.len()
        } else {
            0
        };
        let weekdays = if self.features.include_dow {
            WEEKDAY_LEVELS.len()
        } else {
            0
        };
        months + weekdays
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `column` in this schema.
    pub fn position(&self, column: SeasonalColumn) -> Option<usize> {
        self.columns().iter().position(|c| *c == column)
    }

    /// Position of the column named `name`.
    pub fn position_by_name(&self, name: &str) -> Option<usize> {
        self.columns().iter().position(|c| c.name() == name)
    }
}

/// Indicator values for one date, indexed by [`MONTH_LEVELS`] and [`WEEKDAY_LEVELS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Indicators {
    month: [u8; 11],
    weekday: [u8; 6],
}

impl Indicators {
    fn for_date(date: &DateTime<Utc>) -> Self {
        let mut month = [0u8; 11];
        let mut weekday = [0u8; 6];

        let m = date.month() as usize;
        if m >= 2 {
            month[m - 2] = 1;
        }
        let w = date.weekday().num_days_from_monday() as usize;
        if w >= 1 {
            weekday[w - 1] = 1;
        }

        Self { month, weekday }
    }

    fn get(&self, column: SeasonalColumn) -> u8 {
        match column {
            SeasonalColumn::Month(m) => match m.number_from_month() {
                1 => 0,
                n => self.month[n as usize - 2],
            },
            SeasonalColumn::Weekday(w) => match w.num_days_from_monday() {
                0 => 0,
                n => self.weekday[n as usize - 1],
            },
        }
    }
}

/// A seasonal dummy-variable design matrix keyed by date.
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonalDesign {
    schema: SeasonalSchema,
    dates: Vec<DateTime<Utc>>,
    rows: Vec<Indicators>,
}

impl SeasonalDesign {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Column schema.
    pub fn schema(&self) -> SeasonalSchema {
        self.schema
    }

    /// Number of indicator columns.
    pub fn num_columns(&self) -> usize {
        self.schema.len()
    }

    /// Dates the rows refer to.
    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    /// Row `index` in schema order.
    pub fn row(&self, index: usize) -> Result<Vec<f64>> {
        let row = self.rows.get(index).ok_or(ForecastError::IndexOutOfBounds {
            index,
            size: self.len(),
        })?;
        Ok(self
            .schema
            .columns()
            .into_iter()
            .map(|c| f64::from(row.get(c)))
            .collect())
    }

    /// Single cell.
    pub fn value(&self, index: usize, column: SeasonalColumn) -> Result<f64> {
        self.check_column(column)?;
        let row = self.rows.get(index).ok_or(ForecastError::IndexOutOfBounds {
            index,
            size: self.len(),
        })?;
        Ok(f64::from(row.get(column)))
    }

    /// Full column.
    pub fn column(&self, column: SeasonalColumn) -> Result<Vec<f64>> {
        self.check_column(column)?;
        Ok(self.rows.iter().map(|r| f64::from(r.get(column))).collect())
    }

    /// Full column looked up by name.
    pub fn column_by_name(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .schema
            .columns()
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ForecastError::InvalidParameter(format!("unknown column '{name}'")))?;
        self.column(column)
    }

    /// Named columns in schema order, ready for regression.
    pub fn to_regressors(&self) -> Result<Regressors> {
        let mut regressors = Regressors::with_rows(self.len());
        for column in self.schema.columns() {
            let values = self.rows.iter().map(|r| f64::from(r.get(column))).collect();
            regressors.push(column.name(), values)?;
        }
        Ok(regressors)
    }

    /// Rows `start..end`.
    pub fn slice(&self, start: usize, end: usize) -> Result<SeasonalDesign> {
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
        Ok(SeasonalDesign {
            schema: self.schema,
            dates: self.dates[start..end].to_vec(),
            rows: self.rows[start..end].to_vec(),
        })
    }

    /// Fails with [`ForecastError::SchemaMismatch`] unless the schemas agree.
    pub fn ensure_schema(&self, expected: &SeasonalSchema) -> Result<()> {
        if self.schema != *expected {
            return Err(ForecastError::SchemaMismatch {
                expected: expected.column_names().join(", "),
                got: self.schema.column_names().join(", "),
            });
        }
        Ok(())
    }

    /// Columns that duplicate the intercept in this design.
    ///
    /// When no row falls on a group's reference level (no January dates, or
    /// no Mondays), that group's indicators sum to one on every row. For each
    /// such group the first column that is set somewhere is returned; leaving
    /// it out of a regression makes its level the group's reference instead.
    pub fn aliased_columns(&self) -> Vec<SeasonalColumn> {
        let features = self.schema.features();
        let mut aliased = Vec::new();
        if features.include_month && !self.dates.iter().any(|d| d.month() == 1) {
            aliased.extend(self.first_set(MONTH_LEVELS.map(SeasonalColumn::Month)));
        }
        if features.include_dow && !self.dates.iter().any(|d| d.weekday() == Weekday::Mon) {
            aliased.extend(self.first_set(WEEKDAY_LEVELS.map(SeasonalColumn::Weekday)));
        }
        aliased
    }

    fn first_set<const N: usize>(&self, columns: [SeasonalColumn; N]) -> Option<SeasonalColumn> {
        columns
            .into_iter()
            .find(|&c| self.rows.iter().any(|r| r.get(c) == 1))
    }

    fn check_column(&self, column: SeasonalColumn) -> Result<()> {
        if column.enabled_by(self.schema.features()) {
            Ok(())
        } else {
            Err(ForecastError::InvalidParameter(format!(
                "column '{column}' is not part of this design"
            )))
        }
    }
}

/// Build the seasonal dummy-variable design matrix for `dates`.
///
/// One row per date in input order. Month indicators cover February through
/// December and weekday indicators Tuesday through Sunday; January and Monday
/// are reference levels represented by all-zero groups.
///
/// # Errors
/// [`ForecastError::EmptyData`] for an empty index and
/// [`ForecastError::TimestampError`] when dates are not strictly increasing.
///
/// # Example
/// ```
/// use calendar_arimax::calendar::{seasonal_index, SeasonalFeatures};
/// use chrono::{TimeZone, Utc};
///
/// let dates = vec![Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()];
/// let design = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();
///
/// assert_eq!(design.num_columns(), 17);
/// // 2020-01-01 is a Wednesday in January.
/// assert_eq!(design.column_by_name("dow_2").unwrap(), vec![1.0]);
/// assert_eq!(design.row(0).unwrap().iter().sum::<f64>(), 1.0);
/// ```
pub fn seasonal_index(dates: &[DateTime<Utc>], features: SeasonalFeatures) -> Result<SeasonalDesign> {
    if dates.is_empty() {
        return Err(ForecastError::EmptyData);
    }
    if dates.windows(2).any(|w| w[1] <= w[0]) {
        return Err(ForecastError::TimestampError(
            "date index must be strictly increasing".to_string(),
        ));
    }

    Ok(SeasonalDesign {
        schema: features.schema(),
        dates: dates.to_vec(),
        rows: dates.iter().map(Indicators::for_date).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn daily_dates(start: DateTime<Utc>, n: usize) -> Vec<DateTime<Utc>> {
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    fn jan_first_2020() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn aliased_columns_only_without_reference_rows() {
        let daily = seasonal_index(&daily_dates(jan_first_2020(), 60), SeasonalFeatures::default()).unwrap();
        assert!(daily.aliased_columns().is_empty());

        // February through December 2021: no January rows, every weekday present.
        let feb = Utc.with_ymd_and_hms(2021, 2, 1, 0, 0, 0).unwrap();
        let no_january = seasonal_index(&daily_dates(feb, 334), SeasonalFeatures::default()).unwrap();
        assert_eq!(
            no_january.aliased_columns(),
            vec![SeasonalColumn::Month(Month::February)]
        );

        // Wednesdays from March onwards: both groups lack their reference.
        let march_wed = Utc.with_ymd_and_hms(2021, 3, 3, 0, 0, 0).unwrap();
        let wednesdays: Vec<_> = (0..20).map(|i| march_wed + Duration::weeks(i)).collect();
        let design = seasonal_index(&wednesdays, SeasonalFeatures::default()).unwrap();
        assert_eq!(
            design.aliased_columns(),
            vec![
                SeasonalColumn::Month(Month::March),
                SeasonalColumn::Weekday(Weekday::Wed)
            ]
        );

        let weekday_only = seasonal_index(&wednesdays, SeasonalFeatures::weekday_only()).unwrap();
        assert_eq!(
            weekday_only.aliased_columns(),
            vec![SeasonalColumn::Weekday(Weekday::Wed)]
        );
    }

    #[test]
    fn full_schema_has_seventeen_ordered_columns() {
        let schema = SeasonalFeatures::default().schema();
        let names = schema.column_names();

        assert_eq!(schema.len(), 17);
        assert_eq!(names.len(), 17);
        assert_eq!(names[0], "month_2");
        assert_eq!(names[10], "month_12");
        assert_eq!(names[11], "dow_1");
        assert_eq!(names[16], "dow_6");
    }

    #[test]
    fn schema_depends_only_on_flags() {
        assert_eq!(SeasonalFeatures::month_only().schema().len(), 11);
        assert_eq!(SeasonalFeatures::weekday_only().schema().len(), 6);
        assert!(SeasonalFeatures::none().schema().is_empty());

        let winter = seasonal_index(&daily_dates(jan_first_2020(), 10), SeasonalFeatures::default())
            .unwrap();
        let summer = seasonal_index(
            &daily_dates(Utc.with_ymd_and_hms(2021, 7, 3, 0, 0, 0).unwrap(), 3),
            SeasonalFeatures::default(),
        )
        .unwrap();
        assert_eq!(winter.schema(), summer.schema());
        assert_eq!(
            winter.schema().column_names(),
            summer.schema().column_names()
        );
    }

    #[test]
    fn reference_levels_are_all_zero() {
        // 2020-01-06 is a Monday in January.
        let monday = Utc.with_ymd_and_hms(2020, 1, 6, 0, 0, 0).unwrap();
        let design = seasonal_index(&[monday], SeasonalFeatures::default()).unwrap();

        assert!(design.row(0).unwrap().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn wednesday_in_january_sets_only_dow_2() {
        let design = seasonal_index(&[jan_first_2020()], SeasonalFeatures::default()).unwrap();
        let row = design.row(0).unwrap();

        for (name, value) in design.schema().column_names().iter().zip(row.iter()) {
            let expected = if name == "dow_2" { 1.0 } else { 0.0 };
            assert_eq!(*value, expected, "column {name}");
        }
    }

    #[test]
    fn groups_sum_to_at_most_one() {
        let dates = daily_dates(jan_first_2020(), 400);
        let design = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();

        for i in 0..design.len() {
            let row = design.row(i).unwrap();
            let months: f64 = row[..11].iter().sum();
            let weekdays: f64 = row[11..].iter().sum();
            assert!(months == 0.0 || months == 1.0);
            assert!(weekdays == 0.0 || weekdays == 1.0);
        }
    }

    #[test]
    fn columns_match_calendar() {
        let dates = daily_dates(jan_first_2020(), 366);
        let design = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();

        let july = design.column(SeasonalColumn::Month(Month::July)).unwrap();
        assert_eq!(july.iter().sum::<f64>(), 31.0);
        // Leap-year February.
        let feb = design.column_by_name("month_2").unwrap();
        assert_eq!(feb.iter().sum::<f64>(), 29.0);

        let sunday = design.column(SeasonalColumn::Weekday(Weekday::Sun)).unwrap();
        for (date, value) in dates.iter().zip(sunday.iter()) {
            assert_eq!(*value == 1.0, date.weekday() == Weekday::Sun);
        }
    }

    #[test]
    fn empty_flags_yield_zero_columns_with_rows() {
        let dates = daily_dates(jan_first_2020(), 5);
        let design = seasonal_index(&dates, SeasonalFeatures::none()).unwrap();

        assert_eq!(design.len(), 5);
        assert_eq!(design.num_columns(), 0);
        assert!(design.row(3).unwrap().is_empty());
        assert_eq!(design.to_regressors().unwrap().num_columns(), 0);
    }

    #[test]
    fn disabled_group_columns_are_rejected() {
        let design =
            seasonal_index(&[jan_first_2020()], SeasonalFeatures::weekday_only()).unwrap();

        assert!(design.column(SeasonalColumn::Month(Month::May)).is_err());
        assert!(design.column_by_name("month_5").is_err());
        assert!(design
            .value(0, SeasonalColumn::Weekday(Weekday::Mon))
            .is_err());
        assert_eq!(
            design
                .value(0, SeasonalColumn::Weekday(Weekday::Wed))
                .unwrap(),
            1.0
        );
    }

    #[test]
    fn rejects_empty_and_unordered_dates() {
        assert!(matches!(
            seasonal_index(&[], SeasonalFeatures::default()),
            Err(ForecastError::EmptyData)
        ));

        let d = jan_first_2020();
        assert!(matches!(
            seasonal_index(&[d, d], SeasonalFeatures::default()),
            Err(ForecastError::TimestampError(_))
        ));
        assert!(matches!(
            seasonal_index(&[d + Duration::days(1), d], SeasonalFeatures::default()),
            Err(ForecastError::TimestampError(_))
        ));
    }

    #[test]
    fn gaps_are_allowed() {
        let d = jan_first_2020();
        let dates = vec![d, d + Duration::days(40), d + Duration::days(200)];
        let design = seasonal_index(&dates, SeasonalFeatures::month_only()).unwrap();

        assert_eq!(design.len(), 3);
        // Feb 10 and Jul 19.
        assert_eq!(design.column_by_name("month_2").unwrap(), vec![0.0, 1.0, 0.0]);
        assert_eq!(design.column_by_name("month_7").unwrap(), vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn building_twice_is_identical() {
        let dates = daily_dates(jan_first_2020(), 60);
        let a = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();
        let b = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn slice_keeps_schema_and_dates() {
        let dates = daily_dates(jan_first_2020(), 10);
        let design = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();
        let tail = design.slice(7, 10).unwrap();

        assert_eq!(tail.len(), 3);
        assert_eq!(tail.dates(), &dates[7..]);
        assert_eq!(tail.schema(), design.schema());
        assert_eq!(tail.row(0).unwrap(), design.row(7).unwrap());
        assert!(design.slice(4, 11).is_err());
    }

    #[test]
    fn ensure_schema_reports_both_column_lists() {
        let dates = daily_dates(jan_first_2020(), 3);
        let design = seasonal_index(&dates, SeasonalFeatures::weekday_only()).unwrap();

        assert!(design
            .ensure_schema(&SeasonalFeatures::weekday_only().schema())
            .is_ok());
        match design.ensure_schema(&SeasonalFeatures::default().schema()) {
            Err(ForecastError::SchemaMismatch { expected, got }) => {
                assert!(expected.starts_with("month_2"));
                assert!(got.starts_with("dow_1"));
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn regressors_follow_schema_order() {
        let dates = daily_dates(jan_first_2020(), 14);
        let design = seasonal_index(&dates, SeasonalFeatures::default()).unwrap();
        let regressors = design.to_regressors().unwrap();

        assert_eq!(regressors.names(), design.schema().column_names().as_slice());
        assert_eq!(regressors.num_rows(), 14);
        assert_eq!(
            regressors.get("dow_2").unwrap(),
            design.column_by_name("dow_2").unwrap().as_slice()
        );
    }
}
