//! Calendar regressors: seasonal dummy-variable design matrices for observed
//! and future dates.

mod design;
mod future;

pub use design::{
    seasonal_index, SeasonalColumn, SeasonalDesign, SeasonalFeatures, SeasonalSchema,
    MONTH_LEVELS, WEEKDAY_LEVELS,
};
pub use future::{future_dates, future_frame};
