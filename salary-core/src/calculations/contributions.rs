//! Social-insurance contributions on a gross salary.

use rust_decimal::Decimal;

use crate::models::{EmployeeContributions, TaxPolicy};

/// Employee-side contributions owed on `gross`.
///
/// The capped rate only sees gross up to [`TaxPolicy::contribution_cap`]; the
/// primary and supplementary rates see the whole gross.
pub fn employee_contributions(
    policy: &TaxPolicy,
    gross: Decimal,
    supplementary_pension: bool,
) -> EmployeeContributions {
    let insurance = policy.insurance();
    let capped_base = gross.min(policy.contribution_cap());

    EmployeeContributions {
        capped_portion: capped_base * insurance.employee_rate_capped,
        uncapped_portion: gross * insurance.employee_rate_primary,
        supplementary_portion: if supplementary_pension {
            gross * insurance.supplementary_pension_rate
        } else {
            Decimal::ZERO
        },
    }
}

/// Employer-side contribution on `gross`. Informational only.
pub fn employer_contribution(
    policy: &TaxPolicy,
    gross: Decimal,
) -> Decimal {
    gross * policy.insurance().employer_rate
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::testing::reference_policy;

    #[test]
    fn below_cap_both_rates_see_full_gross() {
        let contributions = employee_contributions(&reference_policy(), dec!(1500), false);

        assert_eq!(
            contributions,
            EmployeeContributions {
                capped_portion: dec!(187.80),
                uncapped_portion: dec!(104.70),
                supplementary_portion: dec!(0),
            }
        );
    }

    #[test]
    fn above_cap_capped_portion_stops_growing() {
        let policy = reference_policy();

        let at_cap = employee_contributions(&policy, dec!(11522.50), false);
        let far_above = employee_contributions(&policy, dec!(40000), false);

        // 11522.50 × 0.1252
        assert_eq!(at_cap.capped_portion, dec!(1442.617));
        assert_eq!(far_above.capped_portion, dec!(1442.617));
        assert_eq!(far_above.uncapped_portion, dec!(2792.00));
    }

    #[test]
    fn supplementary_pension_only_when_elected() {
        let policy = reference_policy();

        let without = employee_contributions(&policy, dec!(2000), false);
        let with = employee_contributions(&policy, dec!(2000), true);

        assert_eq!(without.supplementary_portion, dec!(0));
        assert_eq!(with.supplementary_portion, dec!(40.00));
        assert_eq!(with.total() - without.total(), dec!(40.00));
    }

    #[test]
    fn employer_contribution_uses_employer_rate() {
        assert_eq!(employer_contribution(&reference_policy(), dec!(1500)), dec!(528.0000));
    }
}
