use crate::core::loan::{Loan, LoanStatus, LoanTerms};
use crate::core::payment::Payment;
use crate::core::user::Actor;
use crate::error::{EngineError, EngineResult};
use crate::ledger::payment_ledger::PaymentLedger;
use crate::lifecycle::permissions::{self, Operation};
use crate::reconcile::engine::ReconciliationEngine;
use crate::store::RecordStore;
use chrono::{NaiveDate, Utc};
use log::info;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Result of recording a payment: the payment event and the loan state
/// after incremental reconciliation.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub loan: Loan,
    pub payment: Payment,
}

/// The orchestrating service for loan lifecycles.
///
/// Every mutating operation follows the same shape: consult the capability
/// table, take the per-loan lock, load the record, run the pure transition
/// on a copy, persist on success. Guards run before any store write, so a
/// failed operation applies no effects at all.
///
/// The loan record is the unit of consistency. Mutations on the same loan
/// are linearized by a per-id mutex; operations on different loans proceed
/// fully in parallel. `pay` writes the payment record before the loan
/// record — the store gives only single-record atomicity, so a failure
/// between the two leaves drift that [`recalculate`](Self::recalculate)
/// repairs from the ledger.
pub struct LoanEngine<S: RecordStore> {
    store: S,
    locks: Mutex<HashMap<Uuid, Arc<Mutex<()>>>>,
}

impl<S: RecordStore> LoanEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Direct access to the underlying record store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn loan_lock(&self, loan_id: Uuid) -> Arc<Mutex<()>> {
        let mut locks = self
            .locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(loan_id).or_default().clone()
    }

    fn load_loan(&self, loan_id: Uuid) -> EngineResult<Loan> {
        self.store
            .loan(loan_id)?
            .ok_or_else(|| EngineError::loan_not_found(loan_id))
    }

    /// Create a loan in `applied` status with a freshly generated schedule.
    pub fn apply(&self, actor: &Actor, terms: LoanTerms) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::Apply)?;
        let loan = Loan::apply(terms, Utc::now())?;
        self.store.put_loan(&loan)?;
        info!(
            "loan {} applied by {} for {} over {} months",
            loan.id(),
            loan.applicant(),
            loan.principal(),
            loan.term_months()
        );
        Ok(loan)
    }

    /// Approve a loan application. Requires `applied` status.
    pub fn approve(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::Approve)?;
        let lock = self.loan_lock(loan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut loan = self.load_loan(loan_id)?;
        loan.approve(actor.id.clone(), Utc::now())?;
        self.store.put_loan(&loan)?;
        info!("loan {} approved by {}", loan_id, actor.id);
        Ok(loan)
    }

    /// Reject a loan application. Requires `applied` status; terminal.
    pub fn reject(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::Reject)?;
        let lock = self.loan_lock(loan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut loan = self.load_loan(loan_id)?;
        loan.reject(actor.id.clone(), Utc::now())?;
        self.store.put_loan(&loan)?;
        info!("loan {} rejected by {}", loan_id, actor.id);
        Ok(loan)
    }

    /// Disburse an approved loan: funds go out, repayment begins.
    pub fn disburse(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::Disburse)?;
        let lock = self.loan_lock(loan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut loan = self.load_loan(loan_id)?;
        loan.disburse(Utc::now())?;
        self.store.put_loan(&loan)?;
        info!("loan {} disbursed", loan_id);
        Ok(loan)
    }

    /// Record a repayment and run the incremental reconciliation.
    ///
    /// Requires `disbursed` status and a positive amount. The payment date
    /// defaults to today; backdated entries are accepted and picked up by
    /// the next full recalculation.
    pub fn pay(
        &self,
        actor: &Actor,
        loan_id: Uuid,
        amount: Decimal,
        date: Option<NaiveDate>,
        note: Option<String>,
    ) -> EngineResult<PaymentOutcome> {
        permissions::ensure(actor, Operation::Pay)?;
        let lock = self.loan_lock(loan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut loan = self.load_loan(loan_id)?;
        if loan.status() != LoanStatus::Disbursed {
            return Err(EngineError::InvalidState {
                loan_id,
                operation: Operation::Pay,
                status: loan.status(),
            });
        }

        let now = Utc::now();
        let ledger = PaymentLedger::new(&self.store);
        let payment = ledger.record(
            loan_id,
            actor.id.clone(),
            amount,
            date.unwrap_or_else(|| now.date_naive()),
            note,
        )?;

        ReconciliationEngine::apply_payment(&mut loan, payment.amount(), now);
        self.store.put_loan(&loan)?;
        info!(
            "payment {} of {} recorded against loan {}, outstanding {}",
            payment.id(),
            payment.amount(),
            loan_id,
            loan.outstanding_balance()
        );
        Ok(PaymentOutcome { loan, payment })
    }

    /// Rebuild the loan's schedule state and outstanding balance from the
    /// full payment ledger. Allowed for any existing loan; idempotent.
    pub fn recalculate(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::Recalculate)?;
        let lock = self.loan_lock(loan_id);
        let _guard = lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut loan = self.load_loan(loan_id)?;
        let payments = PaymentLedger::new(&self.store).for_loan(loan_id)?;
        ReconciliationEngine::recalculate(&mut loan, &payments, Utc::now())?;
        self.store.put_loan(&loan)?;
        info!(
            "loan {} recalculated from {} payments, outstanding {}",
            loan_id,
            payments.len(),
            loan.outstanding_balance()
        );
        Ok(loan)
    }

    /// Fetch a single loan.
    pub fn loan(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Loan> {
        permissions::ensure(actor, Operation::View)?;
        self.load_loan(loan_id)
    }

    /// List all loans, ordered by application time.
    pub fn loans(&self, actor: &Actor) -> EngineResult<Vec<Loan>> {
        permissions::ensure(actor, Operation::View)?;
        Ok(self.store.loans()?)
    }

    /// List a loan's payments, ascending by payment date.
    pub fn payments(&self, actor: &Actor, loan_id: Uuid) -> EngineResult<Vec<Payment>> {
        permissions::ensure(actor, Operation::View)?;
        // Surface NotFound for unknown loans rather than an empty list.
        self.load_loan(loan_id)?;
        PaymentLedger::new(&self.store).for_loan(loan_id)
    }
}
