use crate::core::loan::Loan;
use crate::core::money::{clamp_balance, round_money};
use crate::core::payment::Payment;
use crate::error::EngineResult;
use crate::schedule::generator::ScheduleGenerator;
use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

/// Aligns a loan's recorded balances with its actual payment history.
///
/// Two strategies coexist. The incremental path runs on every new payment
/// and touches only the outstanding balance; the full recalculation replays
/// the whole ledger against a freshly generated schedule. When they
/// disagree — backdated payments, a write that landed on one record but not
/// the other — the full recalculation is the source of truth.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Fast path, applied on every new payment. O(1).
    ///
    /// Subtracts the amount from the outstanding balance and closes the
    /// loan when the balance reaches zero. Per-installment allocation state
    /// is untouched; that belongs to [`recalculate`](Self::recalculate).
    ///
    /// Overpayment beyond the outstanding balance clamps to zero — the
    /// excess is neither refunded nor tracked as credit. This is an
    /// intentional simplification.
    pub fn apply_payment(loan: &mut Loan, amount: Decimal, at: DateTime<Utc>) {
        let next = round_money(loan.outstanding_balance() - amount);
        if next <= Decimal::ZERO {
            loan.set_outstanding_balance(Decimal::ZERO);
            loan.mark_closed(at);
        } else {
            loan.set_outstanding_balance(next);
        }
    }

    /// Maintenance path: rebuild all schedule state from the full ledger.
    /// O(payments × installments).
    ///
    /// Regenerates the schedule from the loan's original terms and
    /// application date, discarding any drift accumulated by the fast path,
    /// then replays every payment in ascending value-date order. Each
    /// payment walks the installments in plan order, skipping exhausted
    /// ones, and allocates at most one level payment per installment per
    /// step. Afterwards the outstanding balance is recomputed directly from
    /// the payment total, clamped into `[0, principal]`, and the loan is
    /// closed if it reaches zero.
    ///
    /// Idempotent: recalculating twice over the same ledger produces
    /// identical schedule and balance output.
    pub fn recalculate(
        loan: &mut Loan,
        payments: &[Payment],
        at: DateTime<Utc>,
    ) -> EngineResult<()> {
        let mut schedule = ScheduleGenerator::generate(
            loan.principal(),
            loan.annual_rate_percent(),
            loan.term_months(),
            loan.applied_at().date_naive(),
        )?;

        let mut ordered: Vec<&Payment> = payments.iter().collect();
        ordered.sort_by_key(|p| (p.date(), p.recorded_at(), p.id()));

        let mut total_paid = Decimal::ZERO;
        for payment in ordered {
            total_paid += payment.amount();

            let mut unallocated = payment.amount();
            for installment in schedule.iter_mut() {
                if unallocated <= Decimal::ZERO {
                    break;
                }
                if installment.is_settled() {
                    continue;
                }
                let allocation = unallocated.min(installment.payment_amount);
                installment.remaining_balance =
                    round_money(installment.remaining_balance - allocation);
                unallocated = round_money(unallocated - allocation);
            }
            if unallocated > Decimal::ZERO {
                debug!(
                    "payment {} left {} unallocated after all installments",
                    payment.id(),
                    unallocated
                );
            }
        }

        let outstanding = clamp_balance(round_money(loan.principal() - total_paid), loan.principal());
        debug!(
            "recalculated loan {}: {} paid across {} payments, outstanding {}",
            loan.id(),
            total_paid,
            payments.len(),
            outstanding
        );

        loan.replace_schedule(schedule);
        loan.set_outstanding_balance(outstanding);
        if outstanding.is_zero() {
            loan.mark_closed(at);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loan::{LoanStatus, LoanTerms};
    use crate::core::user::UserId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn disbursed_loan() -> Loan {
        let mut loan = Loan::apply(
            LoanTerms {
                applicant: UserId::new("CUST-0001"),
                principal: dec!(1200),
                annual_rate_percent: dec!(12),
                term_months: 12,
                purpose: "working capital".to_string(),
            },
            Utc::now(),
        )
        .unwrap();
        loan.approve(UserId::new("OFF-0001"), Utc::now()).unwrap();
        loan.disburse(Utc::now()).unwrap();
        loan
    }

    fn payment(loan: &Loan, amount: Decimal, on: NaiveDate) -> Payment {
        Payment::new(loan.id(), UserId::new("CUST-0001"), amount, on)
    }

    #[test]
    fn test_incremental_reduces_balance() {
        let mut loan = disbursed_loan();
        ReconciliationEngine::apply_payment(&mut loan, dec!(106.62), Utc::now());
        assert_eq!(loan.outstanding_balance(), dec!(1093.38));
        assert_eq!(loan.status(), LoanStatus::Disbursed);
    }

    #[test]
    fn test_incremental_exact_payoff_closes() {
        let mut loan = disbursed_loan();
        ReconciliationEngine::apply_payment(&mut loan, dec!(1200), Utc::now());
        assert_eq!(loan.outstanding_balance(), Decimal::ZERO);
        assert_eq!(loan.status(), LoanStatus::Closed);
        assert!(loan.closed_at().is_some());
    }

    #[test]
    fn test_incremental_overpayment_clamps_to_zero() {
        let mut loan = disbursed_loan();
        ReconciliationEngine::apply_payment(&mut loan, dec!(1300), Utc::now());
        assert_eq!(loan.outstanding_balance(), Decimal::ZERO);
        assert_eq!(loan.status(), LoanStatus::Closed);
    }

    #[test]
    fn test_recalculate_allocates_in_plan_order() {
        let mut loan = disbursed_loan();
        let payments = vec![
            payment(&loan, dec!(106.62), date(2024, 2, 1)),
            payment(&loan, dec!(106.62), date(2024, 3, 1)),
            payment(&loan, dec!(300), date(2024, 4, 1)),
        ];

        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();

        // Two level payments plus 106.62 of the lump all land on the first
        // installment's allocation state; the lump's remainder walks on.
        let schedule = loan.schedule();
        assert_eq!(schedule[0].remaining_balance, dec!(785.52));
        assert_eq!(schedule[1].remaining_balance, dec!(903.19));
        assert_eq!(schedule[2].remaining_balance, dec!(826.53));
        // Untouched tail keeps generator state.
        assert_eq!(schedule[3].remaining_balance, dec!(815.80));

        assert_eq!(loan.outstanding_balance(), dec!(686.76));
        assert_eq!(loan.status(), LoanStatus::Disbursed);
    }

    #[test]
    fn test_recalculate_orders_backdated_payments() {
        let mut loan = disbursed_loan();
        // Recorded out of order; replay must follow value dates.
        let payments = vec![
            payment(&loan, dec!(500), date(2024, 6, 1)),
            payment(&loan, dec!(200), date(2024, 2, 1)),
        ];

        let mut reordered = loan.clone();
        let mut swapped = payments.clone();
        swapped.swap(0, 1);

        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();
        ReconciliationEngine::recalculate(&mut reordered, &swapped, Utc::now()).unwrap();

        assert_eq!(loan.schedule(), reordered.schedule());
        assert_eq!(loan.outstanding_balance(), reordered.outstanding_balance());
        assert_eq!(loan.outstanding_balance(), dec!(500));
    }

    #[test]
    fn test_recalculate_is_idempotent() {
        let mut loan = disbursed_loan();
        let payments = vec![
            payment(&loan, dec!(106.62), date(2024, 2, 1)),
            payment(&loan, dec!(400), date(2024, 3, 15)),
        ];

        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();
        let first_pass = loan.clone();
        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();

        assert_eq!(loan, first_pass);
    }

    #[test]
    fn test_recalculate_full_payoff_closes() {
        let mut loan = disbursed_loan();
        let payments = vec![payment(&loan, dec!(1200), date(2024, 5, 1))];

        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();
        assert_eq!(loan.outstanding_balance(), Decimal::ZERO);
        assert_eq!(loan.status(), LoanStatus::Closed);

        // A second run never re-stamps the closure timestamp.
        let closed_at = loan.closed_at();
        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();
        assert_eq!(loan.closed_at(), closed_at);
    }

    #[test]
    fn test_recalculate_without_payments_resets_schedule() {
        let mut loan = disbursed_loan();
        // Simulate fast-path drift.
        ReconciliationEngine::apply_payment(&mut loan, dec!(250), Utc::now());
        assert_eq!(loan.outstanding_balance(), dec!(950));

        ReconciliationEngine::recalculate(&mut loan, &[], Utc::now()).unwrap();
        assert_eq!(loan.outstanding_balance(), dec!(1200));
        assert_eq!(loan.schedule()[0].remaining_balance, dec!(1105.38));
        assert_eq!(loan.status(), LoanStatus::Disbursed);
    }

    #[test]
    fn test_paths_agree_for_chronological_payments() {
        let mut incremental = disbursed_loan();
        let amounts = [dec!(106.62), dec!(106.62), dec!(250), dec!(80.50)];
        let mut payments = Vec::new();
        for (i, amount) in amounts.iter().enumerate() {
            ReconciliationEngine::apply_payment(&mut incremental, *amount, Utc::now());
            payments.push(payment(
                &incremental,
                *amount,
                date(2024, 2 + i as u32, 1),
            ));
        }

        let mut full = incremental.clone();
        ReconciliationEngine::recalculate(&mut full, &payments, Utc::now()).unwrap();

        assert_eq!(full.outstanding_balance(), incremental.outstanding_balance());
        assert_eq!(full.status(), incremental.status());
    }

    #[test]
    fn test_unallocated_remainder_is_discarded() {
        let mut loan = disbursed_loan();
        // More than the whole plan can absorb.
        let payments = vec![payment(&loan, dec!(5000), date(2024, 2, 1))];

        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now()).unwrap();
        assert!(loan.schedule().iter().all(|i| i.is_settled()));
        assert_eq!(loan.outstanding_balance(), Decimal::ZERO);
        assert_eq!(loan.status(), LoanStatus::Closed);
    }

    #[test]
    fn test_replay_trusts_its_input_slice() {
        // Scoping payments to the loan happens in the ledger; a foreign
        // payment handed to recalculate is still replayed.
        let mut loan = disbursed_loan();
        let foreign = Payment::new(
            Uuid::new_v4(),
            UserId::new("CUST-0099"),
            dec!(100),
            date(2024, 2, 1),
        );
        ReconciliationEngine::recalculate(&mut loan, &[foreign], Utc::now()).unwrap();
        assert_eq!(loan.outstanding_balance(), dec!(1100));
    }
}
