use chrono::{Months, NaiveDate, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lending_engine::core::loan::{Loan, LoanTerms};
use lending_engine::core::payment::Payment;
use lending_engine::core::user::UserId;
use lending_engine::reconcile::engine::ReconciliationEngine;
use lending_engine::schedule::generator::ScheduleGenerator;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn bench_schedule_12_months(c: &mut Criterion) {
    c.bench_function("schedule_12_months", |b| {
        b.iter(|| {
            ScheduleGenerator::generate(
                black_box(dec!(12_000)),
                black_box(dec!(12)),
                black_box(12),
                start(),
            )
        })
    });
}

fn bench_schedule_360_months(c: &mut Criterion) {
    c.bench_function("schedule_360_months", |b| {
        b.iter(|| {
            ScheduleGenerator::generate(
                black_box(dec!(250_000)),
                black_box(dec!(6.5)),
                black_box(360),
                start(),
            )
        })
    });
}

fn loan_with_payments(term: u32, payment_count: u32) -> (Loan, Vec<Payment>) {
    let mut loan = Loan::apply(
        LoanTerms {
            applicant: UserId::new("CUST-0001"),
            principal: dec!(50_000),
            annual_rate_percent: dec!(8.5),
            term_months: term,
            purpose: "benchmark".to_string(),
        },
        Utc::now(),
    )
    .unwrap();
    loan.approve(UserId::new("OFF-0001"), Utc::now()).unwrap();
    loan.disburse(Utc::now()).unwrap();

    let level = loan.schedule()[0].payment_amount;
    let payments = (0..payment_count)
        .map(|i| {
            let date = start().checked_add_months(Months::new(i + 1)).unwrap();
            Payment::new(loan.id(), UserId::new("CUST-0001"), level, date)
        })
        .collect();
    (loan, payments)
}

fn bench_recalculate_60_payments(c: &mut Criterion) {
    let (loan, payments) = loan_with_payments(60, 60);
    let at = Utc::now();

    c.bench_function("recalculate_60_payments", |b| {
        b.iter(|| {
            let mut replay = loan.clone();
            ReconciliationEngine::recalculate(black_box(&mut replay), black_box(&payments), at)
        })
    });
}

fn bench_incremental_payment(c: &mut Criterion) {
    let (loan, _) = loan_with_payments(60, 0);
    let at = Utc::now();

    c.bench_function("incremental_payment", |b| {
        b.iter(|| {
            let mut updated = loan.clone();
            ReconciliationEngine::apply_payment(
                black_box(&mut updated),
                black_box(Decimal::new(102_561, 2)),
                at,
            );
            updated
        })
    });
}

criterion_group!(
    benches,
    bench_schedule_12_months,
    bench_schedule_360_months,
    bench_recalculate_60_payments,
    bench_incremental_payment
);
criterion_main!(benches);
