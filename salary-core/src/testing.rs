//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use rust_decimal_macros::dec;

use crate::models::{
    InsuranceRates, ReliefFormula, TaperSegment, TaxBracket, TaxPolicy, TaxPolicyConfig,
};

/// Standard allowance: flat 497.23 up to 573.57, then shrinking by a quarter
/// of every extra unit of gross until it reaches zero exactly at 2562.49.
pub(crate) fn standard_relief() -> ReliefFormula {
    ReliefFormula::Standard {
        cutoff_gross: dec!(2562.49),
        base_amount: dec!(497.23),
        taper: vec![
            TaperSegment {
                from: dec!(0),
                to: dec!(573.57),
                start_value: dec!(497.23),
                slope: dec!(0),
            },
            TaperSegment {
                from: dec!(573.57),
                to: dec!(2562.49),
                start_value: dec!(497.23),
                slope: dec!(-0.25),
            },
        ],
    }
}

/// Monthly policy built around a 2304.50 reference wage: bracket edges at 3×
/// and 5× the reference wage, contributions capped at 5×.
pub(crate) fn reference_config() -> TaxPolicyConfig {
    TaxPolicyConfig {
        tax_year: 2025,
        reference_wage: dec!(2304.50),
        brackets: vec![
            TaxBracket::bounded(dec!(6913.50), dec!(0.20)),
            TaxBracket::bounded(dec!(11522.50), dec!(0.25)),
            TaxBracket::unbounded(dec!(0.32)),
        ],
        relief_categories: BTreeMap::from([
            ("standard".to_string(), standard_relief()),
            (
                "disability".to_string(),
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
    }
}

pub(crate) fn reference_policy() -> TaxPolicy {
    TaxPolicy::new(reference_config()).expect("reference policy is valid")
}
