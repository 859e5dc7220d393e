//! Performance benchmarks for the round-up savings engine.
//!
//! Measures the filter and returns call paths directly and through the
//! HTTP router, and how they scale with the number of expenses and rules.
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use roundup_engine::api::{AppState, create_router};
use roundup_engine::calculation::{calculate_returns, filter_expenses};
use roundup_engine::config::{ConfigLoader, EngineConfig};
use roundup_engine::models::{
    AdditionPeriod, CallOptions, Expense, FilterInput, InvestmentVehicle, OverridePeriod,
    ReportingWindow, ReturnsInput,
};

use axum::{body::Body, http::Request};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tower::ServiceExt;

fn load_config() -> EngineConfig {
    ConfigLoader::load("./config/default").expect("Failed to load config")
}

/// Creates `count` expenses spread hourly through 2023 with varied amounts.
fn create_expenses(count: usize) -> Vec<Expense> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..count)
        .map(|i| {
            let date = start + Duration::hours(i as i64 * 7);
            Expense::new(
                date.format("%Y-%m-%d %H:%M:%S").to_string(),
                Decimal::from(((i * 137) % 9_000 + 1) as i64),
            )
        })
        .collect()
}

/// Creates one month-long period of each kind per month of 2023.
fn create_filter_input(expense_count: usize, rules_per_kind: usize) -> FilterInput {
    let month = |m: usize| {
        let m = (m % 12) + 1;
        (
            format!("2023-{:02}-01 00:00:00", m),
            format!("2023-{:02}-31 23:59:59", m),
        )
    };

    FilterInput {
        expenses: create_expenses(expense_count),
        overrides: (0..rules_per_kind)
            .map(|i| {
                let (start, end) = month(i * 3);
                OverridePeriod {
                    start,
                    end,
                    fixed: Decimal::from(i as i64 % 50),
                }
            })
            .collect(),
        additions: (0..rules_per_kind)
            .map(|i| {
                let (start, end) = month(i);
                AdditionPeriod {
                    start,
                    end,
                    extra: Decimal::from(10),
                }
            })
            .collect(),
        windows: (0..rules_per_kind)
            .map(|i| {
                let (start, end) = month(i);
                ReportingWindow { start, end }
            })
            .collect(),
    }
}

/// Benchmark: filter call path.
fn bench_filter(c: &mut Criterion) {
    let config = load_config();
    let options = CallOptions::filter_defaults();
    let input = create_filter_input(100, 4);

    c.bench_function("filter_100_expenses", |b| {
        b.iter(|| black_box(filter_expenses(black_box(&input), &options, &config)))
    });
}

/// Benchmark: NPS returns call path.
fn bench_returns(c: &mut Criterion) {
    let config = load_config();
    let options = CallOptions::returns_defaults();
    let input = ReturnsInput {
        periods: create_filter_input(100, 4),
        age: 29,
        wage: Decimal::from(1_500_000),
        inflation: Decimal::new(55, 1),
    };

    c.bench_function("returns_nps_100_expenses", |b| {
        b.iter(|| {
            black_box(calculate_returns(
                black_box(&input),
                InvestmentVehicle::Nps,
                &options,
                &config,
            ))
        })
    });
}

/// Benchmark: returns request through the router.
fn bench_returns_http(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let router = create_router(AppState::new(load_config()));
    let input = create_filter_input(100, 4);
    let body = serde_json::json!({
        "expenses": input.expenses,
        "q": input.overrides,
        "p": input.additions,
        "k": input.windows,
        "age": 29,
        "wage": 50000,
        "inflation": 5.5
    })
    .to_string();

    c.bench_function("returns_index_http", |b| {
        b.to_async(&rt).iter(|| async {
            let router = router.clone();
            let response = router
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/returns/index")
                        .header("Content-Type", "application/json")
                        .body(Body::from(body.clone()))
                        .unwrap(),
                )
                .await
                .unwrap();
            black_box(response)
        })
    });
}

/// Benchmark: scaling with the number of expenses.
fn bench_scaling_expenses(c: &mut Criterion) {
    let config = load_config();
    let options = CallOptions::filter_defaults();

    let mut group = c.benchmark_group("scaling_expenses");

    for count in [10usize, 100, 1_000, 10_000].iter() {
        let input = create_filter_input(*count, 4);

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("expenses", count), count, |b, _| {
            b.iter(|| black_box(filter_expenses(&input, &options, &config)))
        });
    }

    group.finish();
}

/// Benchmark: scaling with the number of rules of each kind.
fn bench_scaling_rules(c: &mut Criterion) {
    let config = load_config();
    let options = CallOptions::filter_defaults();

    let mut group = c.benchmark_group("scaling_rules");
    group.sample_size(20);

    for rules in [1usize, 12, 120].iter() {
        let input = create_filter_input(1_000, *rules);

        group.bench_with_input(BenchmarkId::new("rules", rules), rules, |b, _| {
            b.iter(|| black_box(filter_expenses(&input, &options, &config)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_filter,
    bench_returns,
    bench_returns_http,
    bench_scaling_expenses,
    bench_scaling_rules,
);
criterion_main!(benches);
