//! Full loan lifecycle walkthrough.
//!
//! Applies for a loan, approves and disburses it, then repays it to
//! closure, printing the engine's view of the world at each step.

use lending_engine::prelude::*;
use rust_decimal_macros::dec;

fn main() {
    println!("╔═══════════════════════════════════════════╗");
    println!("║  lending-engine: Loan Lifecycle Example   ║");
    println!("╚═══════════════════════════════════════════╝\n");

    let engine = LoanEngine::new(InMemoryStore::new());
    let borrower = Actor::new(UserId::new("CUST-0001"), Role::Customer);
    let officer = Actor::new(UserId::new("OFF-0001"), Role::Officer);

    // --- Application ---
    println!("━━━ Step 1: Application ━━━\n");

    let loan = engine
        .apply(
            &borrower,
            LoanTerms {
                applicant: borrower.id.clone(),
                principal: dec!(1200),
                annual_rate_percent: dec!(12),
                term_months: 12,
                purpose: "espresso machine for the cafe".to_string(),
            },
        )
        .expect("application should succeed");

    println!("{}\n", loan);
    println!("First three installments of the generated plan:");
    for installment in &loan.schedule()[..3] {
        println!(
            "  #{:<2} due {}  payment {:>8}  principal {:>8}  interest {:>6}",
            installment.number,
            installment.due_date,
            installment.payment_amount,
            installment.principal_component,
            installment.interest_component,
        );
    }

    // --- Review and disbursement ---
    println!("\n━━━ Step 2: Approval and Disbursement ━━━\n");

    engine
        .approve(&officer, loan.id())
        .expect("approval should succeed");
    let loan = engine
        .disburse(&officer, loan.id())
        .expect("disbursement should succeed");
    println!("{}", loan);

    // --- Repayment ---
    println!("\n━━━ Step 3: Repayment ━━━\n");

    for month in 1..=3 {
        let outcome = engine
            .pay(&borrower, loan.id(), dec!(106.62), None, None)
            .expect("payment should succeed");
        println!(
            "  month {}: paid 106.62, outstanding {}",
            month,
            outcome.loan.outstanding_balance()
        );
    }

    let remaining = engine
        .loan(&borrower, loan.id())
        .expect("loan should exist")
        .outstanding_balance();
    println!("\n  paying off the remaining {}...", remaining);
    let outcome = engine
        .pay(&borrower, loan.id(), remaining, None, None)
        .expect("payoff should succeed");

    println!("\n━━━ Final State ━━━\n");
    println!("{}", outcome.loan);
    println!(
        "status {} | closed at {:?} | progress {:.0}%",
        outcome.loan.status(),
        outcome.loan.closed_at().map(|t| t.date_naive()),
        outcome.loan.progress_ratio() * 100.0
    );
}
