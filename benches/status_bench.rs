use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;

use membership_engine::normalize::normalize_phone;
use membership_engine::reconcile::{calculate_membership_status, PaymentIndexBuilder};
use membership_engine::store::SheetRow;

fn bench_status_calculation(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership_status");

    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let paid = NaiveDate::from_ymd_opt(2024, 10, 15).unwrap();

    group.bench_function("with_payment", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(calculate_membership_status(
                    black_box(Some(paid)),
                    true,
                    now,
                ));
            }
        });
    });

    group.bench_function("no_payment", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                black_box(calculate_membership_status(None, black_box(true), now));
            }
        });
    });

    group.finish();
}

fn bench_phone_normalization(c: &mut Criterion) {
    let mut group = c.benchmark_group("phone_normalization");

    for raw in ["+1 (787) 555-0123", "787-555-0123", "no digits here"] {
        group.bench_with_input(BenchmarkId::from_parameter(raw), &raw, |b, input| {
            b.iter(|| normalize_phone(black_box(input)));
        });
    }

    group.finish();
}

fn payment_rows(count: usize) -> Vec<SheetRow> {
    (0..count)
        .map(|i| {
            let values: HashMap<String, String> = [
                ("Email".to_string(), format!("member{}@example.org", i % 500)),
                ("Amount".to_string(), format!("{}", 20 + (i % 20))),
                (
                    "Date".to_string(),
                    format!("2024-{:02}-{:02}", 1 + (i % 12), 1 + (i % 28)),
                ),
            ]
            .into_iter()
            .collect();
            SheetRow::new(i as u32 + 2, values)
        })
        .collect()
}

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("payment_index");

    for size in [100usize, 1_000, 5_000] {
        let rows = payment_rows(size);
        group.bench_with_input(BenchmarkId::new("build", size), &rows, |b, rows| {
            b.iter(|| {
                let mut builder = PaymentIndexBuilder::new(25.0);
                builder.add_primary_rows(black_box(rows));
                black_box(builder.finish())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_status_calculation,
    bench_phone_normalization,
    bench_index_build
);
criterion_main!(benches);
