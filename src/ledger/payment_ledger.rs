use crate::core::money::round_money;
use crate::core::payment::Payment;
use crate::core::user::UserId;
use crate::error::{EngineError, EngineResult};
use crate::store::RecordStore;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Append-only ledger of payment events, scoped per loan.
///
/// The ledger is state-agnostic: it validates the payment itself (positive
/// amount) but knows nothing about loan status — whether a loan may accept
/// payments at all is the lifecycle's decision. Append is the only
/// mutation; nothing here updates or deletes.
pub struct PaymentLedger<'a, S: RecordStore> {
    store: &'a S,
}

impl<'a, S: RecordStore> PaymentLedger<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Append a payment event.
    ///
    /// The amount is rounded to currency precision before it is stored, so
    /// the ledger and every balance derived from it stay at two decimals.
    pub fn record(
        &self,
        loan_id: Uuid,
        payer: UserId,
        amount: Decimal,
        date: NaiveDate,
        note: Option<String>,
    ) -> EngineResult<Payment> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::Validation(format!(
                "payment amount must be positive, got {}",
                amount
            )));
        }

        let mut payment = Payment::new(loan_id, payer, round_money(amount), date);
        if let Some(note) = note {
            payment = payment.with_note(note);
        }
        self.store.put_payment(&payment)?;
        Ok(payment)
    }

    /// All payments for a loan, ascending by payment date.
    ///
    /// Same-day payments order by recording time, then id, so that replaying
    /// the ledger is fully deterministic.
    pub fn for_loan(&self, loan_id: Uuid) -> EngineResult<Vec<Payment>> {
        let mut payments = self.store.payments_for_loan(loan_id)?;
        payments.sort_by_key(|p| (p.date(), p.recorded_at(), p.id()));
        Ok(payments)
    }

    /// Sum of all recorded payment amounts for a loan.
    pub fn total_paid(&self, loan_id: Uuid) -> EngineResult<Decimal> {
        let payments = self.store.payments_for_loan(loan_id)?;
        Ok(payments.iter().map(|p| p.amount()).sum())
    }
}
