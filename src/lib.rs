//! # lending-engine
//!
//! Loan accounting and lifecycle engine.
//!
//! Given a loan's originally agreed terms, this engine generates its
//! amortization schedule, records repayments in an append-only ledger, and
//! keeps the outstanding balance reconciled against the payment history —
//! a cheap incremental update on every payment, plus a full-replay
//! recalculation that repairs any drift on demand.
//!
//! ## Architecture
//!
//! - **core** — Foundational types: loans, installments, payments, users, money
//! - **schedule** — Level-payment amortization schedule generation
//! - **ledger** — Append-only payment ledger
//! - **reconcile** — Incremental and full balance reconciliation
//! - **lifecycle** — Status state machine, role guards, orchestrating engine
//! - **store** — Keyed record-store abstraction and in-memory implementation
//! - **simulation** — Random portfolio generation for stress-style runs

pub mod core;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod reconcile;
pub mod schedule;
pub mod simulation;
pub mod store;

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::core::installment::Installment;
    pub use crate::core::loan::{Loan, LoanStatus, LoanTerms};
    pub use crate::core::payment::Payment;
    pub use crate::core::user::{Actor, Role, User, UserId};
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::ledger::payment_ledger::PaymentLedger;
    pub use crate::lifecycle::engine::{LoanEngine, PaymentOutcome};
    pub use crate::reconcile::engine::ReconciliationEngine;
    pub use crate::schedule::generator::ScheduleGenerator;
    pub use crate::store::{InMemoryStore, RecordStore};
}
