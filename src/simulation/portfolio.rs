//! Random loan portfolio generation.
//!
//! Drives realistic-looking books of loans through the engine for CLI
//! simulation runs and benchmarks.

use crate::core::loan::{LoanStatus, LoanTerms};
use crate::core::money::round_money;
use crate::core::user::{Actor, Role, User, UserId};
use crate::error::EngineResult;
use crate::lifecycle::engine::LoanEngine;
use crate::store::RecordStore;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for generating a random loan portfolio.
#[derive(Debug, Clone)]
pub struct PortfolioConfig {
    /// Number of loans to originate.
    pub loan_count: usize,
    /// Minimum principal per loan.
    pub min_principal: Decimal,
    /// Maximum principal per loan.
    pub max_principal: Decimal,
    /// Maximum annual rate in percent (rates draw uniformly from 0 up).
    pub max_rate_percent: Decimal,
    /// Term lengths to draw from, in months.
    pub term_choices: Vec<u32>,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            loan_count: 25,
            min_principal: Decimal::from(1_000),
            max_principal: Decimal::from(50_000),
            max_rate_percent: Decimal::from(24),
            term_choices: vec![6, 12, 24, 36],
        }
    }
}

/// Generate random loan applications for a portfolio run.
///
/// Applicant ids are sequential (`CUST-0000`, `CUST-0001`, ...), one
/// borrower per loan.
pub fn generate_applications(config: &PortfolioConfig) -> Vec<LoanTerms> {
    let mut rng = rand::thread_rng();

    let min_f64: f64 = config.min_principal.to_string().parse().unwrap_or(1_000.0);
    let max_f64: f64 = config.max_principal.to_string().parse().unwrap_or(50_000.0);
    let max_rate_f64: f64 = config.max_rate_percent.to_string().parse().unwrap_or(24.0);

    (0..config.loan_count)
        .map(|i| {
            let principal = Decimal::from_f64_retain(rng.gen_range(min_f64..max_f64))
                .map(round_money)
                .unwrap_or(config.min_principal);
            let rate = Decimal::from_f64_retain(rng.gen_range(0.0..max_rate_f64))
                .map(round_money)
                .unwrap_or(Decimal::ZERO);
            let term = config.term_choices[rng.gen_range(0..config.term_choices.len())];

            LoanTerms {
                applicant: UserId::new(format!("CUST-{:04}", i)),
                principal,
                annual_rate_percent: rate,
                term_months: term,
                purpose: "portfolio simulation".to_string(),
            }
        })
        .collect()
}

/// Aggregate outcome of a portfolio run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub loans: usize,
    pub closed: usize,
    pub payments_recorded: usize,
    pub total_principal: Decimal,
    pub total_outstanding: Decimal,
}

impl std::fmt::Display for PortfolioSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Portfolio Summary ===")?;
        writeln!(f, "Loans:             {}", self.loans)?;
        writeln!(f, "Closed:            {}", self.closed)?;
        writeln!(f, "Payments recorded: {}", self.payments_recorded)?;
        writeln!(f, "Total principal:   {}", self.total_principal)?;
        writeln!(f, "Total outstanding: {}", self.total_outstanding)?;
        Ok(())
    }
}

/// Originate, disburse, and partially repay a random portfolio.
///
/// Each loan is applied for by its borrower, approved and disbursed by a
/// synthetic officer, then receives up to `payments_per_loan` payments of
/// roughly one level installment each (with ±50% noise). Every loan is
/// recalculated at the end, so the reported outstanding figures come from
/// the authoritative full-replay path.
pub fn run_portfolio<S: RecordStore>(
    engine: &LoanEngine<S>,
    config: &PortfolioConfig,
    payments_per_loan: usize,
) -> EngineResult<PortfolioSummary> {
    let mut rng = rand::thread_rng();
    let officer = Actor::new(UserId::new("SIM-OFFICER"), Role::Officer);
    engine.store().put_user(&User::new(
        officer.id.clone(),
        "Simulation Officer",
        Role::Officer,
    ))?;

    let mut summary = PortfolioSummary {
        loans: 0,
        closed: 0,
        payments_recorded: 0,
        total_principal: Decimal::ZERO,
        total_outstanding: Decimal::ZERO,
    };

    for terms in generate_applications(config) {
        let borrower = Actor::new(terms.applicant.clone(), Role::Customer);
        engine.store().put_user(&User::new(
            borrower.id.clone(),
            borrower.id.as_str(),
            Role::Customer,
        ))?;

        let loan = engine.apply(&borrower, terms)?;
        engine.approve(&officer, loan.id())?;
        let mut loan = engine.disburse(&officer, loan.id())?;
        summary.loans += 1;
        summary.total_principal += loan.principal();

        let level_payment: f64 = loan.schedule()[0]
            .payment_amount
            .to_string()
            .parse()
            .unwrap_or(100.0);
        for _ in 0..payments_per_loan {
            if loan.status() != LoanStatus::Disbursed {
                break;
            }
            let amount = Decimal::from_f64_retain(rng.gen_range(0.5..1.5) * level_payment)
                .map(round_money)
                .unwrap_or(loan.schedule()[0].payment_amount);
            if amount <= Decimal::ZERO {
                continue;
            }
            let outcome = engine.pay(&borrower, loan.id(), amount, None, None)?;
            loan = outcome.loan;
            summary.payments_recorded += 1;
        }

        let loan = engine.recalculate(&officer, loan.id())?;
        summary.total_outstanding += loan.outstanding_balance();
        if loan.status() == LoanStatus::Closed {
            summary.closed += 1;
        }
    }

    Ok(summary)
}
