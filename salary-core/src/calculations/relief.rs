//! Tax-free allowance (NPD) evaluation.

use rust_decimal::Decimal;

use crate::models::ReliefFormula;

/// The allowance a relief formula grants at `gross`.
///
/// For [`ReliefFormula::Standard`] the first taper segment whose `[from, to)`
/// holds `gross` is used; a gross exactly on the end of the last segment is
/// evaluated on that segment. Above the cutoff the allowance is zero. The
/// result never exceeds the formula's base amount.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::relief::allowance_at;
/// use salary_core::{ReliefFormula, TaperSegment};
///
/// let formula = ReliefFormula::Standard {
///     cutoff_gross: dec!(2000),
///     base_amount: dec!(500),
///     taper: vec![TaperSegment {
///         from: dec!(0),
///         to: dec!(2000),
///         start_value: dec!(500),
///         slope: dec!(-0.25),
///     }],
/// };
///
/// assert_eq!(allowance_at(&formula, dec!(1000)), dec!(250));
/// assert_eq!(allowance_at(&formula, dec!(2000.01)), dec!(0));
/// ```
pub fn allowance_at(
    formula: &ReliefFormula,
    gross: Decimal,
) -> Decimal {
    match formula {
        ReliefFormula::None => Decimal::ZERO,
        ReliefFormula::Fixed { amount } => *amount,
        ReliefFormula::Standard {
            cutoff_gross,
            base_amount,
            taper,
        } => {
            if gross > *cutoff_gross {
                return Decimal::ZERO;
            }
            taper
                .iter()
                .find(|segment| segment.contains(gross))
                .or_else(|| taper.last().filter(|last| gross >= last.from))
                .map_or(Decimal::ZERO, |segment| segment.value_at(gross))
                .min(*base_amount)
        }
    }
}

/// The part of the allowance actually used against `gross`.
///
/// An allowance can never shield more than the whole salary, so this is the
/// allowance capped at `gross`.
pub fn relief_applied(
    formula: &ReliefFormula,
    gross: Decimal,
) -> Decimal {
    allowance_at(formula, gross).min(gross).max(Decimal::ZERO)
}
