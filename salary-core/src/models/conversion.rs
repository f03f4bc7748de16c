use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::round_half_up;

/// Which side of the salary the caller knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    GrossToNet,
    NetToGross,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrossToNet => "gross_to_net",
            Self::NetToGross => "net_to_gross",
        }
    }

    /// Accepts the canonical names plus the short forms `gross` and `net`
    /// (naming the known amount), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross_to_net" | "gross" => Some(Self::GrossToNet),
            "net_to_gross" | "net" => Some(Self::NetToGross),
            _ => None,
        }
    }
}

/// A single conversion asked of the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// The known amount: gross for [`Direction::GrossToNet`], net otherwise.
    pub amount: Decimal,
    pub direction: Direction,
    /// Named relief category; `None` selects the policy default.
    pub relief_category: Option<String>,
    pub supplementary_pension: bool,
}

impl ConversionRequest {
    pub fn gross_to_net(gross: Decimal) -> Self {
        Self {
            amount: gross,
            direction: Direction::GrossToNet,
            relief_category: None,
            supplementary_pension: false,
        }
    }

    pub fn net_to_gross(net: Decimal) -> Self {
        Self {
            amount: net,
            direction: Direction::NetToGross,
            relief_category: None,
            supplementary_pension: false,
        }
    }

    pub fn with_relief_category(
        mut self,
        category: impl Into<String>,
    ) -> Self {
        self.relief_category = Some(category.into());
        self
    }

    pub fn with_supplementary_pension(
        mut self,
        elected: bool,
    ) -> Self {
        self.supplementary_pension = elected;
        self
    }
}

/// Employee-side social-insurance deductions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeContributions {
    /// Contribution at the capped rate, on gross up to the cap.
    pub capped_portion: Decimal,
    /// Contribution at the primary rate, on the whole gross.
    pub uncapped_portion: Decimal,
    /// Supplementary pension contribution; zero unless elected.
    pub supplementary_portion: Decimal,
}

impl EmployeeContributions {
    pub fn total(&self) -> Decimal {
        self.capped_portion + self.uncapped_portion + self.supplementary_portion
    }

    fn map(
        &self,
        f: impl Fn(Decimal) -> Decimal,
    ) -> Self {
        Self {
            capped_portion: f(self.capped_portion),
            uncapped_portion: f(self.uncapped_portion),
            supplementary_portion: f(self.supplementary_portion),
        }
    }
}

/// Full result of a conversion, in either direction.
///
/// Values are kept at full precision; call [`SalaryBreakdown::rounded`] for
/// display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub gross: Decimal,
    pub net: Decimal,
    pub relief_applied: Decimal,
    /// Gross minus relief, floored at zero.
    pub taxable_base: Decimal,
    pub income_tax: Decimal,
    pub employee_contributions: EmployeeContributions,
    pub employer_contribution: Decimal,
    /// Gross plus employer contribution.
    pub total_employment_cost: Decimal,
}

impl SalaryBreakdown {
    pub fn zero() -> Self {
        Self {
            gross: Decimal::ZERO,
            net: Decimal::ZERO,
            relief_applied: Decimal::ZERO,
            taxable_base: Decimal::ZERO,
            income_tax: Decimal::ZERO,
            employee_contributions: EmployeeContributions::default(),
            employer_contribution: Decimal::ZERO,
            total_employment_cost: Decimal::ZERO,
        }
    }

    /// Every field rounded half-up to cents.
    pub fn rounded(&self) -> Self {
        self.map(round_half_up)
    }

    /// Share of gross lost to income tax and employee contributions.
    pub fn effective_deduction_rate(&self) -> Decimal {
        if self.gross.is_zero() {
            return Decimal::ZERO;
        }
        (self.gross - self.net) / self.gross
    }

    /// Scales every amount by `periods`, e.g. 12 to turn a monthly breakdown
    /// into a yearly one.
    pub fn annualized(
        &self,
        periods: u32,
    ) -> Self {
        let factor = Decimal::from(periods);
        self.map(|value| value * factor)
    }

    fn map(
        &self,
        f: impl Fn(Decimal) -> Decimal,
    ) -> Self {
        Self {
            gross: f(self.gross),
            net: f(self.net),
            relief_applied: f(self.relief_applied),
            taxable_base: f(self.taxable_base),
            income_tax: f(self.income_tax),
            employee_contributions: self.employee_contributions.map(&f),
            employer_contribution: f(self.employer_contribution),
            total_employment_cost: f(self.total_employment_cost),
        }
    }
}
