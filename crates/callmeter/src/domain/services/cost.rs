//! Rate/Cost Calculator

use rust_decimal::{Decimal, RoundingStrategy};

/// Decimal places kept for stored amounts
pub const COST_SCALE: u32 = 4;

/// Largest amount a `NUMERIC(14, 4)` column holds: 9999999999.9999
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0x107A_3FFF, 0x5AF3, 0, false, COST_SCALE);

/// Decimal places used when showing an amount to people
pub const DISPLAY_SCALE: u32 = 2;

/// Usage cost of a call: `max(0, seconds) / 60 * rate_per_minute`,
/// rounded half away from zero to [`COST_SCALE`] places.
///
/// A negative rate is treated as zero, and so is a product that does not fit
/// a stored amount (see [`MAX_AMOUNT`]).
pub fn calculate_cost(duration_seconds: i64, rate_per_minute: Decimal) -> Decimal {
    let zero = Decimal::ZERO.round_dp(COST_SCALE);
    if duration_seconds <= 0 || rate_per_minute <= Decimal::ZERO {
        return zero;
    }

    // Multiply first so the division by 60 happens once, on the product
    let Some(cost) = Decimal::from(duration_seconds)
        .checked_mul(rate_per_minute)
        .and_then(|product| product.checked_div(Decimal::from(60)))
    else {
        return zero;
    };

    let cost = cost.round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero);
    if cost > MAX_AMOUNT {
        return zero;
    }
    cost
}

/// Round an amount for display
pub fn display_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
