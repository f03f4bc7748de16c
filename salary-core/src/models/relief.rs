use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A linear piece of a tapering relief schedule.
///
/// Covers gross salaries in `[from, to)` and yields
/// `start_value + slope × (gross − from)`, floored at zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaperSegment {
    pub from: Decimal,
    pub to: Decimal,
    pub start_value: Decimal,
    pub slope: Decimal,
}

impl TaperSegment {
    pub fn contains(
        &self,
        gross: Decimal,
    ) -> bool {
        gross >= self.from && gross < self.to
    }

    pub fn value_at(
        &self,
        gross: Decimal,
    ) -> Decimal {
        (self.start_value + self.slope * (gross - self.from)).max(Decimal::ZERO)
    }

    /// Value at the (exclusive) right edge of the segment.
    pub fn end_value(&self) -> Decimal {
        self.value_at(self.to)
    }
}

/// How the tax-free allowance (NPD) is derived for a relief category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReliefFormula {
    /// No allowance.
    None,

    /// A flat allowance that does not depend on income.
    Fixed { amount: Decimal },

    /// An allowance that tapers as gross salary rises and vanishes above
    /// `cutoff_gross`. Never exceeds `base_amount`.
    Standard {
        cutoff_gross: Decimal,
        base_amount: Decimal,
        taper: Vec<TaperSegment>,
    },
}

impl ReliefFormula {
    /// Steepest (most negative) rate at which the allowance shrinks per unit
    /// of gross salary. Zero for formulas that never taper.
    pub fn steepest_slope(&self) -> Decimal {
        match self {
            ReliefFormula::Standard { taper, .. } => taper
                .iter()
                .map(|segment| segment.slope)
                .min()
                .unwrap_or(Decimal::ZERO)
                .min(Decimal::ZERO),
            ReliefFormula::None | ReliefFormula::Fixed { .. } => Decimal::ZERO,
        }
    }
}
