use crate::core::loan::Loan;
use crate::core::payment::Payment;
use crate::core::user::{User, UserId};
use crate::store::{RecordStore, StoreError};
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// In-memory record store.
///
/// Backs tests, demos, and the CLI. Each entity table is guarded by its own
/// `RwLock`, giving the single-record atomicity the store contract promises
/// and nothing beyond it.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    loans: RwLock<HashMap<Uuid, Loan>>,
    payments: RwLock<HashMap<Uuid, Payment>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned(table: &str) -> StoreError {
    StoreError::Backend(format!("{} table lock poisoned", table))
}

impl RecordStore for InMemoryStore {
    fn put_loan(&self, loan: &Loan) -> Result<(), StoreError> {
        let mut loans = self.loans.write().map_err(|_| poisoned("loan"))?;
        loans.insert(loan.id(), loan.clone());
        Ok(())
    }

    fn loan(&self, id: Uuid) -> Result<Option<Loan>, StoreError> {
        let loans = self.loans.read().map_err(|_| poisoned("loan"))?;
        Ok(loans.get(&id).cloned())
    }

    fn loans(&self) -> Result<Vec<Loan>, StoreError> {
        let loans = self.loans.read().map_err(|_| poisoned("loan"))?;
        let mut all: Vec<Loan> = loans.values().cloned().collect();
        all.sort_by_key(|l| (l.applied_at(), l.id()));
        Ok(all)
    }

    fn put_payment(&self, payment: &Payment) -> Result<(), StoreError> {
        let mut payments = self.payments.write().map_err(|_| poisoned("payment"))?;
        payments.insert(payment.id(), payment.clone());
        Ok(())
    }

    fn payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError> {
        let payments = self.payments.read().map_err(|_| poisoned("payment"))?;
        Ok(payments.get(&id).cloned())
    }

    fn payments_for_loan(&self, loan_id: Uuid) -> Result<Vec<Payment>, StoreError> {
        let payments = self.payments.read().map_err(|_| poisoned("payment"))?;
        Ok(payments
            .values()
            .filter(|p| p.loan_id() == loan_id)
            .cloned()
            .collect())
    }

    fn put_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().map_err(|_| poisoned("user"))?;
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    fn user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned("user"))?;
        Ok(users.get(id).cloned())
    }

    fn users(&self) -> Result<Vec<User>, StoreError> {
        let users = self.users.read().map_err(|_| poisoned("user"))?;
        let mut all: Vec<User> = users.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loan::LoanTerms;
    use crate::core::user::Role;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;

    fn sample_loan() -> Loan {
        Loan::apply(
            LoanTerms {
                applicant: UserId::new("CUST-0001"),
                principal: dec!(1000),
                annual_rate_percent: dec!(10),
                term_months: 6,
                purpose: "test".to_string(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_loan_round_trip() {
        let store = InMemoryStore::new();
        let loan = sample_loan();
        store.put_loan(&loan).unwrap();

        let fetched = store.loan(loan.id()).unwrap().unwrap();
        assert_eq!(fetched, loan);
        assert!(store.loan(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_payments_filtered_by_loan() {
        let store = InMemoryStore::new();
        let loan_a = Uuid::new_v4();
        let loan_b = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        store
            .put_payment(&Payment::new(loan_a, UserId::new("CUST-0001"), dec!(100), date))
            .unwrap();
        store
            .put_payment(&Payment::new(loan_a, UserId::new("CUST-0001"), dec!(50), date))
            .unwrap();
        store
            .put_payment(&Payment::new(loan_b, UserId::new("CUST-0002"), dec!(75), date))
            .unwrap();

        assert_eq!(store.payments_for_loan(loan_a).unwrap().len(), 2);
        assert_eq!(store.payments_for_loan(loan_b).unwrap().len(), 1);
        assert!(store.payments_for_loan(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_users_sorted_by_id() {
        let store = InMemoryStore::new();
        store
            .put_user(&User::new(UserId::new("CUST-0002"), "B", Role::Customer))
            .unwrap();
        store
            .put_user(&User::new(UserId::new("CUST-0001"), "A", Role::Customer))
            .unwrap();

        let users = store.users().unwrap();
        assert_eq!(users[0].id.as_str(), "CUST-0001");
        assert_eq!(users[1].id.as_str(), "CUST-0002");
    }
}
