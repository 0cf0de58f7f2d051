use rust_decimal::{Decimal, RoundingStrategy};

/// Currency precision used throughout the engine: two decimal places.
pub const CURRENCY_DP: u32 = 2;

/// Round a money amount to currency precision, half away from zero.
///
/// Every balance, component, and allocation in the engine passes through
/// this single rounding point so that the incremental and full
/// reconciliation paths cannot drift on midpoint handling.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp a balance into `[0, ceiling]`.
pub fn clamp_balance(amount: Decimal, ceiling: Decimal) -> Decimal {
    amount.max(Decimal::ZERO).min(ceiling)
}
