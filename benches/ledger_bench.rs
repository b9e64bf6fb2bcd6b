//! Benchmarks for rollover propagation and CSV import preview
//!
//! Run with: cargo bench

use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use fintrack::import::{CsvImporter, MappingStore};
use fintrack::ledger::{FixedClock, Ledger, LedgerOptions};
use fintrack::storage::{FinanceStore, LocalStore, NewTransaction, TransactionKind, YearMonth};
use std::sync::Arc;
use tempfile::tempdir;

const CATEGORIES: [&str; 5] = ["Housing", "Groceries", "Dining", "Transport", "Other"];

/// A ledger with budgets and spending in every category for `months` months
fn seeded_ledger(rt: &tokio::runtime::Runtime, months: i32) -> (Ledger, YearMonth) {
    let start = YearMonth::new(2020, 1).unwrap();
    let today = start.offset(months).first_day();
    let ledger = Ledger::new(
        FinanceStore::open_in_memory().unwrap(),
        Arc::new(FixedClock::new(today)),
        LedgerOptions::default(),
    );

    rt.block_on(async {
        let mut rows = Vec::new();
        for m in 0..months {
            let month = start.offset(m);
            for (i, category) in CATEGORIES.iter().enumerate() {
                ledger
                    .set_budget(month, category, 100.0 + i as f64 * 50.0)
                    .await
                    .unwrap();
                for day in [3, 11, 19, 27] {
                    rows.push(NewTransaction::new(
                        NaiveDate::from_ymd_opt(month.year(), month.month(), day).unwrap(),
                        "Bench",
                        20.0 + day as f64,
                        TransactionKind::Expense,
                        *category,
                    ));
                }
            }
        }
        ledger.import_transactions(rows).await.unwrap();
    });

    (ledger, start)
}

fn bench_rollover(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("rollover");

    for months in [12, 36] {
        let (ledger, start) = seeded_ledger(&rt, months);
        group.throughput(Throughput::Elements(months as u64));

        group.bench_with_input(
            BenchmarkId::new("recompute_from_start", months),
            &start,
            |b, start| {
                b.iter(|| {
                    rt.block_on(ledger.recompute_rollovers_from(black_box(*start)))
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

fn create_csv(rows: usize) -> String {
    let mut csv = String::from("Date;Amount;Payee;Type;Category\n");
    for i in 0..rows {
        let day = i % 28 + 1;
        let month = i % 12 + 1;
        let (amount, kind) = if i % 7 == 0 {
            (format!("1.{:03},00", i % 1000), "credit")
        } else {
            (format!("-{},{:02}", i % 300 + 1, i % 100), "debit")
        };
        csv.push_str(&format!(
            "{:02}/{:02}/2024;{};Payee {};{};{}\n",
            day,
            month,
            i,
            kind,
            CATEGORIES[i % CATEGORIES.len()]
        ));
    }
    csv
}

fn bench_import_preview(c: &mut Criterion) {
    let dir = tempdir().unwrap();
    let importer = CsvImporter::new(MappingStore::new(Arc::new(LocalStore::new(
        dir.path(),
        "import",
    ))));
    let mut group = c.benchmark_group("import_preview");

    for size in [100, 1000, 10000] {
        let csv = create_csv(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::from_parameter(size), &csv, |b, csv| {
            b.iter(|| importer.preview(black_box(csv), "EUR", None).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rollover, bench_import_preview);
criterion_main!(benches);
