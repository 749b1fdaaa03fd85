//! Benchmarks for seasonal design construction and ARIMA error fitting.

use calendar_arimax::calendar::{future_frame, seasonal_index, SeasonalFeatures};
use calendar_arimax::datasets::daily_demand;
use calendar_arimax::models::arima::ARIMA;
use calendar_arimax::models::Forecaster;
use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn bench_seasonal_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("seasonal_index");
    let start = Utc.with_ymd_and_hms(2015, 1, 1, 0, 0, 0).unwrap();

    for size in [365, 1461, 3653].iter() {
        let series = daily_demand(start, *size, 1).unwrap();

        group.bench_with_input(BenchmarkId::new("month_and_weekday", size), size, |b, _| {
            b.iter(|| seasonal_index(black_box(series.timestamps()), SeasonalFeatures::default()))
        });

        group.bench_with_input(BenchmarkId::new("month_only", size), size, |b, _| {
            b.iter(|| {
                seasonal_index(black_box(series.timestamps()), SeasonalFeatures::month_only())
            })
        });
    }

    group.finish();
}

fn bench_future_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("future_frame");
    let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
    let series = daily_demand(start, 730, 2).unwrap();

    for horizon in [7, 28, 365].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), horizon, |b, &h| {
            b.iter(|| future_frame(black_box(h), &series, SeasonalFeatures::default()))
        });
    }

    group.finish();
}

fn bench_arima_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("arima_fit");
    group.sample_size(20);
    let start = Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap();
    let series = daily_demand(start, 730, 3).unwrap();

    group.bench_function("ARIMA(1,0,1)", |b| {
        b.iter(|| {
            let mut model = ARIMA::new(1, 0, 1);
            model.fit(black_box(&series)).unwrap();
        })
    });

    group.bench_function("SARIMA(1,0,0)(1,0,0)[7]", |b| {
        b.iter(|| {
            let mut model = ARIMA::seasonal(1, 0, 0, 1, 0, 0, 7);
            model.fit(black_box(&series)).unwrap();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_seasonal_index,
    bench_future_frame,
    bench_arima_fit
);
criterion_main!(benches);
