//! Append-only payment ledger.

pub mod payment_ledger;
