//! Amortization schedule generation.

pub mod generator;
