use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Social-insurance parameters for one tax year.
///
/// All rates are fractions of gross salary (`0.0698` is 6.98%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsuranceRates {
    /// Employee rate applied to the whole gross salary.
    pub employee_rate_primary: Decimal,

    /// Employee rate applied to gross salary up to the contribution cap.
    pub employee_rate_capped: Decimal,

    /// The contribution cap expressed as a multiple of the reference wage.
    pub cap_multiple_of_reference_wage: Decimal,

    /// Employer-side rate. Reported, never deducted from net.
    pub employer_rate: Decimal,

    /// Employee rate for the optional supplementary pension scheme.
    pub supplementary_pension_rate: Decimal,
}

impl InsuranceRates {
    /// Sum of every employee-side rate, optionally including the
    /// supplementary pension rate.
    pub fn total_employee_rate(
        &self,
        supplementary_pension: bool,
    ) -> Decimal {
        let base = self.employee_rate_primary + self.employee_rate_capped;
        if supplementary_pension {
            base + self.supplementary_pension_rate
        } else {
            base
        }
    }
}
