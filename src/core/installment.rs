use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One scheduled period of an amortization plan.
///
/// Installments are generated once, at application time, and their
/// `payment_amount`, `principal_component`, and `interest_component`
/// never change afterwards. The `remaining_balance` field is allocation
/// state: it starts at the declining balance the generator computed for
/// this installment and is decremented only by the reconciliation
/// engine as payments are replayed against the plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    /// 1-indexed position in the schedule.
    pub number: u32,
    /// Due date: the loan's start date advanced by whole calendar months.
    pub due_date: NaiveDate,
    /// Level annuity payment for this period.
    pub payment_amount: Decimal,
    /// Portion of the payment that retires principal.
    pub principal_component: Decimal,
    /// Portion of the payment that covers interest on the open balance.
    pub interest_component: Decimal,
    /// Allocation state, mutated only by the reconciliation engine.
    pub remaining_balance: Decimal,
}

impl Installment {
    /// Whether payment allocation has exhausted this installment.
    pub fn is_settled(&self) -> bool {
        self.remaining_balance <= Decimal::ZERO
    }
}
