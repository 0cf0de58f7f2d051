use crate::core::user::{Actor, Role};
use crate::error::{EngineError, EngineResult};
use std::fmt;

/// Engine operations subject to role guards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Apply,
    Approve,
    Reject,
    Disburse,
    Pay,
    Recalculate,
    View,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Apply => "apply",
            Operation::Approve => "approve",
            Operation::Reject => "reject",
            Operation::Disburse => "disburse",
            Operation::Pay => "pay",
            Operation::Recalculate => "recalculate",
            Operation::View => "view",
        };
        write!(f, "{}", name)
    }
}

/// Single capability table keyed by (role, operation).
///
/// Customers apply for and repay their loans; officers and admins handle
/// review, disbursement, and maintenance (and may record counter payments
/// on a borrower's behalf). Reads are open to every authenticated role.
pub fn allowed(role: Role, operation: Operation) -> bool {
    use Operation::*;
    match (role, operation) {
        (Role::Customer, Apply | Pay | View) => true,
        (Role::Customer, _) => false,
        (Role::Officer | Role::Admin, Apply) => false,
        (Role::Officer | Role::Admin, _) => true,
    }
}

/// Check the capability table for the acting user, surfacing a permission
/// error on failure.
pub fn ensure(actor: &Actor, operation: Operation) -> EngineResult<()> {
    if allowed(actor.role, operation) {
        Ok(())
    } else {
        Err(EngineError::Permission {
            role: actor.role,
            operation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::user::UserId;

    #[test]
    fn test_customer_capabilities() {
        assert!(allowed(Role::Customer, Operation::Apply));
        assert!(allowed(Role::Customer, Operation::Pay));
        assert!(allowed(Role::Customer, Operation::View));
        assert!(!allowed(Role::Customer, Operation::Approve));
        assert!(!allowed(Role::Customer, Operation::Disburse));
        assert!(!allowed(Role::Customer, Operation::Recalculate));
    }

    #[test]
    fn test_staff_capabilities() {
        for role in [Role::Officer, Role::Admin] {
            assert!(!allowed(role, Operation::Apply));
            assert!(allowed(role, Operation::Approve));
            assert!(allowed(role, Operation::Reject));
            assert!(allowed(role, Operation::Disburse));
            assert!(allowed(role, Operation::Pay));
            assert!(allowed(role, Operation::Recalculate));
            assert!(allowed(role, Operation::View));
        }
    }

    #[test]
    fn test_ensure_surfaces_permission_error() {
        let customer = Actor::new(UserId::new("CUST-0001"), Role::Customer);
        assert!(ensure(&customer, Operation::Pay).is_ok());

        let err = ensure(&customer, Operation::Disburse).unwrap_err();
        assert!(matches!(err, EngineError::Permission { .. }));
    }
}
