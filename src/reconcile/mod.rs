//! Balance reconciliation: incremental fast path and full ledger replay.

pub mod engine;
