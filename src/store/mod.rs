//! Keyed record storage abstraction.
//!
//! The engine depends only on the [`RecordStore`] trait: keyed get/list/put
//! for loans, payments, and users. Writes are single-record atomic and
//! nothing more — the engine never assumes multi-record transactions, and
//! cross-record consistency is restored by full recalculation when needed.
//! The in-memory implementation backs tests, demos, and the CLI; a real
//! datastore can be substituted without touching the engine.

pub mod memory;

pub use memory::InMemoryStore;

use crate::core::loan::Loan;
use crate::core::payment::Payment;
use crate::core::user::{User, UserId};
use thiserror::Error;
use uuid::Uuid;

/// Errors arising from the storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Keyed get/list/put access to the engine's three entity types.
///
/// Implementations must make each individual `put_*` atomic; ordering
/// between records is the caller's concern.
pub trait RecordStore: Send + Sync {
    /// Insert or overwrite a loan record.
    fn put_loan(&self, loan: &Loan) -> Result<(), StoreError>;
    fn loan(&self, id: Uuid) -> Result<Option<Loan>, StoreError>;
    /// All loans, ordered by application time for stable listings.
    fn loans(&self) -> Result<Vec<Loan>, StoreError>;

    /// Append a payment record. Payments are never overwritten in practice;
    /// the ledger layer guarantees append-only usage.
    fn put_payment(&self, payment: &Payment) -> Result<(), StoreError>;
    fn payment(&self, id: Uuid) -> Result<Option<Payment>, StoreError>;
    /// Payments recorded against a loan, in no particular order;
    /// the payment ledger owns ordering semantics.
    fn payments_for_loan(&self, loan_id: Uuid) -> Result<Vec<Payment>, StoreError>;

    fn put_user(&self, user: &User) -> Result<(), StoreError>;
    fn user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
    fn users(&self) -> Result<Vec<User>, StoreError>;
}
