//! Progressive income tax over an ordered bracket table.

use rust_decimal::Decimal;

use crate::models::TaxBracket;

/// Tax on `taxable_base`, each slice taxed at the rate of the bracket it
/// falls in.
///
/// Brackets must be in ascending order with only the last one unbounded, as
/// [`TaxPolicy`](crate::TaxPolicy) guarantees. A negative base is taxed as
/// zero.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::TaxBracket;
/// use salary_core::calculations::income_tax::progressive_tax;
///
/// let brackets = vec![
///     TaxBracket::bounded(dec!(1000), dec!(0.10)),
///     TaxBracket::unbounded(dec!(0.30)),
/// ];
///
/// // 1000 × 10% + 500 × 30%
/// assert_eq!(progressive_tax(&brackets, dec!(1500)), dec!(250));
/// ```
pub fn progressive_tax(
    brackets: &[TaxBracket],
    taxable_base: Decimal,
) -> Decimal {
    let mut tax = Decimal::ZERO;
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        if taxable_base <= lower {
            break;
        }
        let upper = bracket
            .upper_bound
            .map_or(taxable_base, |bound| bound.min(taxable_base));
        tax += (upper - lower) * bracket.rate;

        match bracket.upper_bound {
            Some(bound) => lower = bound,
            None => break,
        }
    }

    tax
}

/// Rate applied to the next unit of `taxable_base`.
pub fn marginal_rate(
    brackets: &[TaxBracket],
    taxable_base: Decimal,
) -> Decimal {
    brackets
        .iter()
        .find(|b| b.upper_bound.is_none_or(|bound| taxable_base < bound))
        .map_or(Decimal::ZERO, |b| b.rate)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::testing::reference_policy;

    fn brackets() -> Vec<TaxBracket> {
        reference_policy().brackets().to_vec()
    }

    // =========================================================================
    // progressive_tax
    // =========================================================================

    #[test]
    fn zero_base_pays_nothing() {
        assert_eq!(progressive_tax(&brackets(), dec!(0)), dec!(0));
    }

    #[test]
    fn negative_base_pays_nothing() {
        assert_eq!(progressive_tax(&brackets(), dec!(-10)), dec!(0));
    }

    #[test]
    fn first_bracket_only() {
        assert_eq!(progressive_tax(&brackets(), dec!(1234.3775)), dec!(246.87550));
    }

    #[test]
    fn exactly_on_first_edge() {
        assert_eq!(progressive_tax(&brackets(), dec!(6913.50)), dec!(1382.70));
    }

    #[test]
    fn spans_two_brackets() {
        // 6913.50 × 0.20 + 1086.50 × 0.25
        assert_eq!(progressive_tax(&brackets(), dec!(8000)), dec!(1654.325));
    }

    #[test]
    fn spans_all_brackets() {
        // 1382.70 + 4609 × 0.25 + 8477.50 × 0.32
        assert_eq!(progressive_tax(&brackets(), dec!(20000)), dec!(5247.75));
    }

    #[test]
    fn single_unbounded_bracket_is_flat() {
        let flat = vec![TaxBracket::unbounded(dec!(0.19))];

        assert_eq!(progressive_tax(&flat, dec!(3000)), dec!(570));
    }

    #[test]
    fn continuous_across_each_edge() {
        let brackets = brackets();
        let step = dec!(0.000001);

        for edge in [dec!(6913.50), dec!(11522.50)] {
            let below = progressive_tax(&brackets, edge - step);
            let at = progressive_tax(&brackets, edge);
            let above = progressive_tax(&brackets, edge + step);

            assert!(at - below <= step, "jump below edge {edge}");
            assert!(above - at <= step, "jump above edge {edge}");
        }
    }

    // =========================================================================
    // marginal_rate
    // =========================================================================

    #[test]
    fn marginal_rate_follows_brackets() {
        let brackets = brackets();

        assert_eq!(marginal_rate(&brackets, dec!(0)), dec!(0.20));
        assert_eq!(marginal_rate(&brackets, dec!(6913.49)), dec!(0.20));
        assert_eq!(marginal_rate(&brackets, dec!(6913.50)), dec!(0.25));
        assert_eq!(marginal_rate(&brackets, dec!(50000)), dec!(0.32));
    }
}
