//! Drift repair walkthrough.
//!
//! Shows the two reconciliation strategies working together: the O(1)
//! incremental path keeps the outstanding balance current on each payment,
//! and the full recalculation replays the ledger — backdated entries
//! included — to produce the authoritative schedule allocation state.

use chrono::{Days, Utc};
use lending_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  lending-engine: Drift Repair Example     ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let engine = LoanEngine::new(InMemoryStore::new());
    let borrower = Actor::new(UserId::new("CUST-0042"), Role::Customer);
    let officer = Actor::new(UserId::new("ADM-0001"), Role::Admin);

    let loan = engine
        .apply(
            &borrower,
            LoanTerms {
                applicant: borrower.id.clone(),
                principal: dec!(10_000),
                annual_rate_percent: dec!(5),
                term_months: 24,
                purpose: "van refit".to_string(),
            },
        )
        .expect("application should succeed");
    engine
        .approve(&officer, loan.id())
        .expect("approval should succeed");
    engine
        .disburse(&officer, loan.id())
        .expect("disbursement should succeed");

    println!("Disbursed {} over 24 months at 5% APR.", dec!(10_000));
    println!(
        "Level payment: {}\n",
        loan.schedule()[0].payment_amount
    );

    // A regular payment lands through the fast path.
    let outcome = engine
        .pay(&borrower, loan.id(), dec!(438.71), None, None)
        .expect("payment should succeed");
    println!(
        "Regular payment of 438.71 → outstanding {}",
        outcome.loan.outstanding_balance()
    );

    // A month-old cheque surfaces and is backfilled with its value date.
    let value_date = Utc::now().date_naive() - Days::new(32);
    let outcome = engine
        .pay(
            &borrower,
            loan.id(),
            dec!(438.71),
            Some(value_date),
            Some("backfilled cheque".to_string()),
        )
        .expect("backfill should succeed");
    println!(
        "Backdated payment of 438.71 (value date {}) → outstanding {}",
        value_date,
        outcome.loan.outstanding_balance()
    );

    // The fast path got the balance right, but the per-installment
    // allocation state has never seen either payment. Recalculate.
    println!("\nRunning full recalculation...\n");
    let loan = engine
        .recalculate(&officer, loan.id())
        .expect("recalculation should succeed");

    println!("Authoritative state after replaying the ledger:");
    println!("  outstanding: {}", loan.outstanding_balance());
    for installment in &loan.schedule()[..3] {
        println!(
            "  installment #{:<2} remaining allocation {:>9}",
            installment.number, installment.remaining_balance
        );
    }

    // Idempotence: running it again changes nothing.
    let again = engine
        .recalculate(&officer, loan.id())
        .expect("recalculation should succeed");
    println!(
        "\nSecond recalculation identical: {}",
        again == loan
    );
}
