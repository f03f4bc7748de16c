use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive income-tax band.
///
/// Brackets are stored in ascending order; each one covers the taxable base
/// from the previous bracket's `upper_bound` (or zero) up to its own
/// `upper_bound`, exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Upper edge of the band. `None` only on the last, unbounded band.
    pub upper_bound: Option<Decimal>,
    pub rate: Decimal,
}

impl TaxBracket {
    pub fn bounded(
        upper_bound: Decimal,
        rate: Decimal,
    ) -> Self {
        Self {
            upper_bound: Some(upper_bound),
            rate,
        }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self {
            upper_bound: None,
            rate,
        }
    }
}
