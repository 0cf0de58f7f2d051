use crate::core::loan::LoanStatus;
use crate::core::user::Role;
use crate::lifecycle::permissions::Operation;
use crate::store::StoreError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the lending engine.
///
/// Every variant is terminal for the operation that raised it: the engine
/// performs no retries, and a failed operation applies no effects — the
/// loan record is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Malformed or out-of-range input (amount ≤ 0, term == 0, rate < 0, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A lifecycle transition was attempted from a status that does not
    /// permit it.
    #[error("cannot {operation} loan {loan_id} in status {status}")]
    InvalidState {
        loan_id: Uuid,
        operation: Operation,
        status: LoanStatus,
    },

    /// Unknown loan, payment, or user id.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    /// The actor's role does not grant the requested operation.
    #[error("role {role} is not permitted to {operation}")]
    Permission { role: Role, operation: Operation },

    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    pub(crate) fn loan_not_found(id: Uuid) -> Self {
        EngineError::NotFound {
            entity: "loan",
            id: id.to_string(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
