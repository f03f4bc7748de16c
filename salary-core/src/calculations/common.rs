//! Small decimal helpers shared by the calculation steps.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

/// One currency subunit.
pub const CENT: Decimal = dec!(0.01);

/// Rounds to cents, sending exact midpoints away from zero.
///
/// The engine itself never rounds; this is for presenting results.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(960.6245)), dec!(960.62));
/// assert_eq!(round_half_up(dec!(246.875)), dec!(246.88));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Floors `value` at zero.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

/// Whether `a` and `b` differ by at most `tolerance`.
pub fn within(
    a: Decimal,
    b: Decimal,
    tolerance: Decimal,
) -> bool {
    (a - b).abs() <= tolerance
}
