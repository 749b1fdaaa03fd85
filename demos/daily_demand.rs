//! Holdout forecast of the synthetic daily demand series.
//!
//! Fits a regression on month and weekday indicators with ARIMA errors,
//! forecasts the last four weeks and scores the forecast against them.
//!
//! Run with: cargo run --example daily_demand
//! Set RUST_LOG=calendar_arimax=debug to see the order search.

use calendar_arimax::calendar::{future_frame, seasonal_index, SeasonalFeatures};
use calendar_arimax::datasets::daily_demand;
use calendar_arimax::models::{forecast_future_levels, ExogenousFitter, FitOptions, RegressionWithArimaErrors};
use calendar_arimax::utils::{calculate_metrics, interval_coverage, winkler_score};
use chrono::{TimeZone, Utc};
use tracing_subscriber::EnvFilter;

const HOLDOUT: usize = 28;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Daily demand holdout forecast ===\n");

    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let series = daily_demand(start, 730, 2024).unwrap();
    let (train, test) = series.split_holdout(HOLDOUT).unwrap();
    println!(
        "Training on {} days, holding out {} days from {}",
        train.len(),
        test.len(),
        test.first_timestamp().unwrap().date_naive()
    );

    // 1. Seasonal indicators for the training dates
    let features = SeasonalFeatures::default();
    let design = seasonal_index(train.timestamps(), features).unwrap();
    println!("Design columns: {}", design.schema().column_names().join(", "));

    // 2. Regression with ARIMA errors
    println!("\n--- Fitting regression with ARIMA errors ---");
    let options = FitOptions::default().with_seasonal_period(7);
    let model = RegressionWithArimaErrors::new()
        .fit(&train, &design, &options)
        .unwrap();

    println!("Intercept: {:.3}", model.intercept());
    for (name, beta) in model.coefficients() {
        println!("  {:<9} {:>8.3}", name, beta);
    }
    println!("Error model: {}", model.error_order());
    if let Some(aic) = model.aic() {
        println!("AIC: {:.2}", aic);
    }

    // 3. Forecast the holdout dates
    let future = future_frame(HOLDOUT, &train, features).unwrap();
    let forecast = forecast_future_levels(&model, &future, &[0.8, 0.9]).unwrap();
    let eighty = forecast.interval(0.8).unwrap();
    let ninety = forecast.interval(0.9).unwrap();

    println!("\n--- Forecast with 80% and 90% intervals ---");
    println!(
        "{:>10} {:>9} {:>9} {:>9} {:>9} {:>9} {:>9}",
        "date", "actual", "lo90", "lo80", "point", "hi80", "hi90"
    );
    println!("{:-<70}", "");
    for i in 0..HOLDOUT {
        println!(
            "{:>10} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2} {:>9.2}",
            forecast.timestamps()[i].date_naive(),
            test.values()[i],
            ninety.lower[i],
            eighty.lower[i],
            forecast.primary()[i],
            eighty.upper[i],
            ninety.upper[i]
        );
    }

    // 4. Holdout accuracy
    println!("\n--- Holdout accuracy ---");
    let metrics = calculate_metrics(test.values(), forecast.primary(), Some(7)).unwrap();
    println!("MAE:   {:.3}", metrics.mae);
    println!("RMSE:  {:.3}", metrics.rmse);
    if let Some(mape) = metrics.mape {
        println!("MAPE:  {:.2}%", mape);
    }
    println!("sMAPE: {:.2}%", metrics.smape);

    for (level, interval) in [(0.8, eighty), (0.9, ninety)] {
        let coverage = interval_coverage(test.values(), &interval.lower, &interval.upper).unwrap();
        let winkler =
            winkler_score(test.values(), &interval.lower, &interval.upper, 1.0 - level).unwrap();
        println!(
            "{:.0}% interval: coverage {:.1}%, Winkler {:.2}",
            level * 100.0,
            coverage * 100.0,
            winkler
        );
    }
}
