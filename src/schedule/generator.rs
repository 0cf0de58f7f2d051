use crate::core::installment::Installment;
use crate::core::money::round_money;
use crate::error::{EngineError, EngineResult};
use chrono::{Months, NaiveDate};
use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

/// Generates level-payment amortization schedules.
///
/// Deterministic: identical inputs always produce an identical schedule,
/// which is what makes full recalculation safe to run at any time.
///
/// # Algorithm
///
/// 1. Monthly rate `r = annual_rate_percent / 100 / 12`.
/// 2. Level payment `principal / months` when `r == 0`, otherwise the
///    annuity payment `principal · r · (1+r)^n / ((1+r)^n − 1)`, rounded to
///    currency precision immediately. This fixed payment applies to every
///    installment except possibly the last.
/// 3. Walk a running balance from the principal down: each installment's
///    interest is the open balance times `r`, its principal component is the
///    payment minus that interest, all rounded at each step.
/// 4. Any residual left by cumulative rounding is absorbed into the final
///    installment's principal component, so the plan retires the principal
///    to exactly zero.
///
/// # Examples
///
/// ```
/// use lending_engine::schedule::generator::ScheduleGenerator;
/// use chrono::NaiveDate;
/// use rust_decimal_macros::dec;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let schedule = ScheduleGenerator::generate(dec!(1200), dec!(12), 12, start).unwrap();
///
/// assert_eq!(schedule.len(), 12);
/// assert_eq!(schedule[0].interest_component, dec!(12.00));
/// let recovered: rust_decimal::Decimal =
///     schedule.iter().map(|i| i.principal_component).sum();
/// assert_eq!(recovered, dec!(1200.00));
/// ```
pub struct ScheduleGenerator;

impl ScheduleGenerator {
    /// Produce the amortization plan for the given terms.
    ///
    /// Due dates advance from `start` by whole calendar months (a start on
    /// the 31st lands on the last day of shorter months).
    pub fn generate(
        principal: Decimal,
        annual_rate_percent: Decimal,
        term_months: u32,
        start: NaiveDate,
    ) -> EngineResult<Vec<Installment>> {
        if principal <= Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "principal must be positive, got {}",
                principal
            )));
        }
        if annual_rate_percent < Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "annual rate must not be negative, got {}",
                annual_rate_percent
            )));
        }
        if term_months == 0 {
            return Err(EngineError::Validation(
                "term must be at least one month".to_string(),
            ));
        }

        let monthly_rate = annual_rate_percent / dec!(100) / dec!(12);
        let payment = if monthly_rate.is_zero() {
            round_money(principal / Decimal::from(term_months))
        } else {
            let growth = (Decimal::ONE + monthly_rate).powi(term_months as i64);
            round_money(principal * monthly_rate * growth / (growth - Decimal::ONE))
        };

        let mut schedule = Vec::with_capacity(term_months as usize);
        let mut balance = principal;
        for number in 1..=term_months {
            let due_date = start
                .checked_add_months(Months::new(number - 1))
                .ok_or_else(|| {
                    EngineError::Validation(format!(
                        "due date out of range for installment {}",
                        number
                    ))
                })?;

            let interest = round_money(balance * monthly_rate);
            let principal_component = round_money(payment - interest);
            balance = round_money(balance - principal_component);

            schedule.push(Installment {
                number,
                due_date,
                payment_amount: payment,
                principal_component,
                interest_component: interest,
                remaining_balance: balance,
            });
        }

        // Absorb cumulative rounding drift into the last installment so the
        // schedule amortizes to exactly zero.
        if !balance.is_zero() {
            if let Some(last) = schedule.last_mut() {
                last.principal_component = round_money(last.principal_component + balance);
                last.payment_amount =
                    round_money(last.principal_component + last.interest_component);
                last.remaining_balance = Decimal::ZERO;
            }
        }

        Ok(schedule)
    }
}
