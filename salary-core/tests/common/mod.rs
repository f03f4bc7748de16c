//! Policy builders shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use salary_core::{
    InsuranceRates, ReliefFormula, TaperSegment, TaxBracket, TaxPolicy, TaxPolicyConfig,
};

pub const CATEGORIES: [&str; 3] = ["standard", "fixed", "none"];

pub fn cents(value: i64) -> Decimal {
    Decimal::new(value, 2)
}

pub fn basis_points(value: i64) -> Decimal {
    Decimal::new(value, 4)
}

/// Allowance flat at `base` until `flat_until`, then falling by `1/divisor`
/// per unit of gross until it reaches zero exactly at the cutoff.
pub fn tapered_relief(
    base: Decimal,
    flat_until: Decimal,
    divisor: i64,
) -> ReliefFormula {
    let cutoff = flat_until + base * Decimal::from(divisor);
    ReliefFormula::Standard {
        cutoff_gross: cutoff,
        base_amount: base,
        taper: vec![
            TaperSegment {
                from: dec!(0),
                to: flat_until,
                start_value: base,
                slope: dec!(0),
            },
            TaperSegment {
                from: flat_until,
                to: cutoff,
                start_value: base,
                slope: -(Decimal::ONE / Decimal::from(divisor)),
            },
        ],
    }
}

pub fn reference_policy() -> TaxPolicy {
    TaxPolicy::new(TaxPolicyConfig {
        tax_year: 2025,
        reference_wage: dec!(2304.50),
        brackets: vec![
            TaxBracket::bounded(dec!(6913.50), dec!(0.20)),
            TaxBracket::bounded(dec!(11522.50), dec!(0.25)),
            TaxBracket::unbounded(dec!(0.32)),
        ],
        relief_categories: BTreeMap::from([
            (
                "standard".to_string(),
                tapered_relief(dec!(497.23), dec!(573.57), 4),
            ),
            (
                "fixed".to_string(),
                ReliefFormula::Fixed {
                    amount: dec!(497.23),
                },
            ),
            ("none".to_string(), ReliefFormula::None),
        ]),
        default_relief_category: "standard".to_string(),
        insurance: InsuranceRates {
            employee_rate_primary: dec!(0.0698),
            employee_rate_capped: dec!(0.1252),
            cap_multiple_of_reference_wage: dec!(5),
            employer_rate: dec!(0.3520),
            supplementary_pension_rate: dec!(0.02),
        },
    })
    .expect("reference policy is valid")
}

prop_compose! {
    /// Three brackets with edges at whole multiples of `reference_wage` and
    /// a top rate of at most 45%.
    pub fn arb_brackets(reference_wage: Decimal)(
        first_edge_multiple in 1i64..5,
        second_edge_extra in 1i64..5,
        first_rate_bp in 0i64..2500,
        second_rate_step_bp in 0i64..1000,
        top_rate_step_bp in 0i64..1000,
    ) -> Vec<TaxBracket> {
        let first_edge = reference_wage * Decimal::from(first_edge_multiple);
        let second_edge = first_edge + reference_wage * Decimal::from(second_edge_extra);
        let first_rate = basis_points(first_rate_bp);
        let second_rate = first_rate + basis_points(second_rate_step_bp);

        vec![
            TaxBracket::bounded(first_edge, first_rate),
            TaxBracket::bounded(second_edge, second_rate),
            TaxBracket::unbounded(second_rate + basis_points(top_rate_step_bp)),
        ]
    }
}

prop_compose! {
    /// Employee rates adding up to at most 28%.
    pub fn arb_insurance()(
        primary_bp in 0i64..1000,
        capped_bp in 0i64..1500,
        cap_multiple in 1i64..8,
        employer_bp in 0i64..4000,
        pension_bp in 0i64..300,
    ) -> InsuranceRates {
        InsuranceRates {
            employee_rate_primary: basis_points(primary_bp),
            employee_rate_capped: basis_points(capped_bp),
            cap_multiple_of_reference_wage: Decimal::from(cap_multiple),
            employer_rate: basis_points(employer_bp),
            supplementary_pension_rate: basis_points(pension_bp),
        }
    }
}

prop_compose! {
    pub fn arb_relief()(
        base_cents in 1_000i64..80_000,
        flat_until_cents in 1i64..100_000,
        divisor in prop::sample::select(vec![2i64, 4, 5, 8, 10]),
    ) -> ReliefFormula {
        tapered_relief(cents(base_cents), cents(flat_until_cents), divisor)
    }
}

prop_compose! {
    /// Any policy these generators build passes validation: the steepest
    /// taper (1/2) with the top rate (45%) and all employee rates (28%) still
    /// leaves net salary rising with gross.
    pub fn arb_policy()(reference_wage_cents in 100_000i64..500_000)(
        brackets in arb_brackets(cents(reference_wage_cents)),
        insurance in arb_insurance(),
        standard in arb_relief(),
        fixed_cents in 0i64..80_000,
        reference_wage in Just(cents(reference_wage_cents)),
    ) -> TaxPolicy {
        TaxPolicy::new(TaxPolicyConfig {
            tax_year: 2025,
            reference_wage,
            brackets,
            relief_categories: BTreeMap::from([
                ("standard".to_string(), standard),
                ("fixed".to_string(), ReliefFormula::Fixed { amount: cents(fixed_cents) }),
                ("none".to_string(), ReliefFormula::None),
            ]),
            default_relief_category: "standard".to_string(),
            insurance,
        })
        .expect("generated policy is valid")
    }
}

pub fn arb_category() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CATEGORIES.to_vec())
}

/// Salaries from zero up to one million, in cents.
pub fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(cents)
}
