//! Small Decimal helpers shared across the engine

use rust_decimal::prelude::*;

/// Divide, yielding zero when the divisor is zero or the quotient overflows
pub fn safe_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
}

/// Round half away from zero to `dp` places
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Truncate toward zero to `dp` places
pub fn truncate(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::ToZero)
}

/// Format with exactly `dp` fractional digits, rounding half up
pub fn to_fixed(value: Decimal, dp: u32) -> String {
    format!("{:.*}", dp as usize, round_half_up(value, dp))
}

/// `value^exp` for non-negative bases, saturating on overflow
pub fn pow(value: Decimal, exp: Decimal) -> Decimal {
    if value.is_zero() {
        return Decimal::ZERO;
    }
    value.checked_powd(exp).unwrap_or(Decimal::MAX)
}
