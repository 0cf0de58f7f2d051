use crate::core::user::UserId;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A repayment event against a loan.
///
/// Payments are immutable once created. The ledger that holds them is
/// append-only: no update or delete operation exists, and reconciliation
/// is always a pure function of the accumulated payment history.
///
/// Amount validation (strictly positive) is the responsibility of
/// [`PaymentLedger::record`](crate::ledger::payment_ledger::PaymentLedger::record),
/// the only production path that creates payments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier for this payment.
    id: Uuid,
    /// The loan this payment applies to.
    loan_id: Uuid,
    /// The user who paid.
    payer: UserId,
    /// The amount paid.
    amount: Decimal,
    /// The value date of the payment. Backdated entries are allowed;
    /// full recalculation replays the ledger in value-date order.
    date: NaiveDate,
    /// Optional reference or memo.
    note: Option<String>,
    /// When this payment was recorded.
    recorded_at: DateTime<Utc>,
}

impl Payment {
    /// Create a new payment event.
    pub fn new(loan_id: Uuid, payer: UserId, amount: Decimal, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            payer,
            amount,
            date,
            note: None,
            recorded_at: Utc::now(),
        }
    }

    /// Create a payment with a specific ID (useful for testing / determinism).
    pub fn with_id(
        id: Uuid,
        loan_id: Uuid,
        payer: UserId,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id,
            loan_id,
            payer,
            amount,
            date,
            note: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attach a memo.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn loan_id(&self) -> Uuid {
        self.loan_id
    }

    pub fn payer(&self) -> &UserId {
        &self.payer
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_creation() {
        let loan_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let payment = Payment::new(loan_id, UserId::new("CUST-0001"), dec!(106.62), date)
            .with_note("february installment");

        assert_eq!(payment.loan_id(), loan_id);
        assert_eq!(payment.payer().as_str(), "CUST-0001");
        assert_eq!(payment.amount(), dec!(106.62));
        assert_eq!(payment.date(), date);
        assert_eq!(payment.note(), Some("february installment"));
    }

    #[test]
    fn test_payment_json_round_trip() {
        let payment = Payment::new(
            Uuid::new_v4(),
            UserId::new("CUST-0002"),
            dec!(250.00),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        );

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, payment);
    }
}
