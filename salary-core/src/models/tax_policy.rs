//! Validated, immutable tax-year parameters.
//!
//! A [`TaxPolicy`] is built once per tax year from a plain
//! [`TaxPolicyConfig`] and never changes afterwards. Construction checks every
//! invariant the salary converter relies on, most importantly that net salary
//! can never fall as gross salary rises, so an invalid policy is rejected up
//! front instead of producing odd numbers later.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use rust_decimal_macros::dec;
//! use salary_core::{InsuranceRates, ReliefFormula, TaxBracket, TaxPolicy, TaxPolicyConfig};
//!
//! let config = TaxPolicyConfig {
//!     tax_year: 2025,
//!     reference_wage: dec!(2304.50),
//!     brackets: vec![
//!         TaxBracket::bounded(dec!(6913.50), dec!(0.20)),
//!         TaxBracket::unbounded(dec!(0.25)),
//!     ],
//!     relief_categories: BTreeMap::from([("none".to_string(), ReliefFormula::None)]),
//!     default_relief_category: "none".to_string(),
//!     insurance: InsuranceRates {
//!         employee_rate_primary: dec!(0.0698),
//!         employee_rate_capped: dec!(0.1252),
//!         cap_multiple_of_reference_wage: dec!(5),
//!         employer_rate: dec!(0.352),
//!         supplementary_pension_rate: dec!(0.02),
//!     },
//! };
//!
//! let policy = TaxPolicy::new(config).unwrap();
//!
//! assert_eq!(policy.contribution_cap(), dec!(11522.50));
//! assert_eq!(policy.highest_marginal_rate(), dec!(0.25));
//! ```

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::{InsuranceRates, ReliefFormula, TaxBracket};

/// Reasons a [`TaxPolicyConfig`] is rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("reference wage must be positive, got {0}")]
    NonPositiveReferenceWage(Decimal),

    #[error("at least one tax bracket is required")]
    NoBrackets,

    #[error("{name} must be between 0 and 1, got {rate}")]
    RateOutOfRange { name: String, rate: Decimal },

    #[error("bracket {index} has no upper bound but is not the last bracket")]
    UnboundedBracketNotLast { index: usize },

    #[error("last bracket must be unbounded, got upper bound {0}")]
    LastBracketBounded(Decimal),

    #[error("bracket {index} upper bound {bound} does not exceed the previous bound")]
    BracketBoundsNotIncreasing { index: usize, bound: Decimal },

    #[error("bracket {index} rate {rate} is lower than the previous bracket's rate")]
    BracketRatesDecreasing { index: usize, rate: Decimal },

    #[error("contribution cap multiple must be positive, got {0}")]
    NonPositiveCapMultiple(Decimal),

    #[error("default relief category '{0}' is not defined")]
    UnknownDefaultReliefCategory(String),

    #[error("relief category '{category}': {name} must be non-negative, got {value}")]
    NegativeReliefParameter {
        category: String,
        name: String,
        value: Decimal,
    },

    #[error("relief category '{category}': taper has no segments")]
    EmptyTaper { category: String },

    #[error("relief category '{category}': taper must start at 0, starts at {from}")]
    TaperMustStartAtZero { category: String, from: Decimal },

    #[error("relief category '{category}': taper segment {index} is empty")]
    EmptyTaperSegment { category: String, index: usize },

    #[error("relief category '{category}': taper segment {index} does not start where the previous one ends")]
    TaperNotContiguous { category: String, index: usize },

    #[error("relief category '{category}': taper segment {index} jumps by {gap} at its start")]
    TaperDiscontinuous {
        category: String,
        index: usize,
        gap: Decimal,
    },

    #[error("relief category '{category}': taper segment {index} has rising slope {slope}")]
    TaperSlopePositive {
        category: String,
        index: usize,
        slope: Decimal,
    },

    #[error("relief category '{category}': taper segment {index} starts at {value}, above the base amount")]
    ReliefExceedsBase {
        category: String,
        index: usize,
        value: Decimal,
    },

    #[error("relief category '{category}': taper ends at {to}, before the cutoff {cutoff}")]
    TaperEndsBeforeCutoff {
        category: String,
        to: Decimal,
        cutoff: Decimal,
    },

    #[error("relief category '{category}': allowance of {remaining} is still left at the cutoff")]
    ReliefStepAtCutoff { category: String, remaining: Decimal },

    #[error("relief category '{category}': net salary would fall as gross rises (marginal net rate {marginal_rate})")]
    NetDecreasesWithGross {
        category: String,
        marginal_rate: Decimal,
    },
}

/// Raw, unvalidated policy parameters.
///
/// Monetary amounts are per pay period (monthly in the shipped policies).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxPolicyConfig {
    pub tax_year: i32,
    pub reference_wage: Decimal,
    pub brackets: Vec<TaxBracket>,
    pub relief_categories: BTreeMap<String, ReliefFormula>,
    pub default_relief_category: String,
    pub insurance: InsuranceRates,
}

/// Immutable tax-year parameters that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaxPolicyConfig", into = "TaxPolicyConfig")]
pub struct TaxPolicy {
    tax_year: i32,
    reference_wage: Decimal,
    brackets: Vec<TaxBracket>,
    relief_categories: BTreeMap<String, ReliefFormula>,
    default_relief_category: String,
    insurance: InsuranceRates,
}

impl TaxPolicy {
    /// Validates `config` and freezes it into a policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`PolicyError`] found, checking the reference wage,
    /// the brackets, the insurance rates and then every relief category.
    pub fn new(config: TaxPolicyConfig) -> Result<Self, PolicyError> {
        validate_reference_wage(config.reference_wage)?;
        validate_brackets(&config.brackets)?;
        validate_insurance(&config.insurance)?;

        if !config
            .relief_categories
            .contains_key(&config.default_relief_category)
        {
            return Err(PolicyError::UnknownDefaultReliefCategory(
                config.default_relief_category,
            ));
        }

        let highest_rate = config
            .brackets
            .iter()
            .map(|b| b.rate)
            .max()
            .unwrap_or(Decimal::ZERO);
        let employee_rate = config.insurance.total_employee_rate(true);

        for (category, formula) in &config.relief_categories {
            validate_relief(category, formula)?;

            let marginal_rate =
                Decimal::ONE - highest_rate * (Decimal::ONE - formula.steepest_slope()) - employee_rate;
            if marginal_rate < Decimal::ZERO {
                return Err(PolicyError::NetDecreasesWithGross {
                    category: category.clone(),
                    marginal_rate,
                });
            }
        }

        debug!(
            tax_year = config.tax_year,
            brackets = config.brackets.len(),
            relief_categories = config.relief_categories.len(),
            "tax policy validated"
        );

        Ok(Self {
            tax_year: config.tax_year,
            reference_wage: config.reference_wage,
            brackets: config.brackets,
            relief_categories: config.relief_categories,
            default_relief_category: config.default_relief_category,
            insurance: config.insurance,
        })
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn reference_wage(&self) -> Decimal {
        self.reference_wage
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn insurance(&self) -> &InsuranceRates {
        &self.insurance
    }

    pub fn default_relief_category(&self) -> &str {
        &self.default_relief_category
    }

    /// Names of every relief category, in alphabetical order.
    pub fn relief_categories(&self) -> impl Iterator<Item = &str> {
        self.relief_categories.keys().map(String::as_str)
    }

    pub fn relief_formula(
        &self,
        category: &str,
    ) -> Option<&ReliefFormula> {
        self.relief_categories.get(category)
    }

    /// Rate of the top (unbounded) bracket.
    pub fn highest_marginal_rate(&self) -> Decimal {
        self.brackets
            .last()
            .map(|b| b.rate)
            .unwrap_or(Decimal::ZERO)
    }

    /// Gross salary above which the capped contribution stops growing.
    pub fn contribution_cap(&self) -> Decimal {
        self.insurance.cap_multiple_of_reference_wage * self.reference_wage
    }

    pub fn total_employee_rate(
        &self,
        supplementary_pension: bool,
    ) -> Decimal {
        self.insurance.total_employee_rate(supplementary_pension)
    }
}

impl TryFrom<TaxPolicyConfig> for TaxPolicy {
    type Error = PolicyError;

    fn try_from(config: TaxPolicyConfig) -> Result<Self, Self::Error> {
        Self::new(config)
    }
}

impl From<TaxPolicy> for TaxPolicyConfig {
    fn from(policy: TaxPolicy) -> Self {
        Self {
            tax_year: policy.tax_year,
            reference_wage: policy.reference_wage,
            brackets: policy.brackets,
            relief_categories: policy.relief_categories,
            default_relief_category: policy.default_relief_category,
            insurance: policy.insurance,
        }
    }
}

fn validate_rate(
    name: impl Into<String>,
    rate: Decimal,
) -> Result<(), PolicyError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(PolicyError::RateOutOfRange {
            name: name.into(),
            rate,
        });
    }
    Ok(())
}

fn validate_reference_wage(reference_wage: Decimal) -> Result<(), PolicyError> {
    if reference_wage <= Decimal::ZERO {
        return Err(PolicyError::NonPositiveReferenceWage(reference_wage));
    }
    Ok(())
}

fn validate_brackets(brackets: &[TaxBracket]) -> Result<(), PolicyError> {
    let Some(last_index) = brackets.len().checked_sub(1) else {
        return Err(PolicyError::NoBrackets);
    };

    let mut previous_bound = Decimal::ZERO;
    let mut previous_rate = Decimal::ZERO;

    for (index, bracket) in brackets.iter().enumerate() {
        validate_rate(format!("brackets[{index}].rate"), bracket.rate)?;
        if bracket.rate < previous_rate {
            return Err(PolicyError::BracketRatesDecreasing {
                index,
                rate: bracket.rate,
            });
        }
        previous_rate = bracket.rate;

        match (bracket.upper_bound, index == last_index) {
            (Some(bound), true) => return Err(PolicyError::LastBracketBounded(bound)),
            (None, true) => {}
            (None, false) => return Err(PolicyError::UnboundedBracketNotLast { index }),
            (Some(bound), false) => {
                if bound <= previous_bound {
                    return Err(PolicyError::BracketBoundsNotIncreasing { index, bound });
                }
                previous_bound = bound;
            }
        }
    }

    Ok(())
}

fn validate_insurance(insurance: &InsuranceRates) -> Result<(), PolicyError> {
    validate_rate("employee_rate_primary", insurance.employee_rate_primary)?;
    validate_rate("employee_rate_capped", insurance.employee_rate_capped)?;
    validate_rate("employer_rate", insurance.employer_rate)?;
    validate_rate(
        "supplementary_pension_rate",
        insurance.supplementary_pension_rate,
    )?;
    if insurance.cap_multiple_of_reference_wage <= Decimal::ZERO {
        return Err(PolicyError::NonPositiveCapMultiple(
            insurance.cap_multiple_of_reference_wage,
        ));
    }
    Ok(())
}

fn non_negative(
    category: &str,
    name: &str,
    value: Decimal,
) -> Result<(), PolicyError> {
    if value < Decimal::ZERO {
        return Err(PolicyError::NegativeReliefParameter {
            category: category.to_string(),
            name: name.to_string(),
            value,
        });
    }
    Ok(())
}

fn validate_relief(
    category: &str,
    formula: &ReliefFormula,
) -> Result<(), PolicyError> {
    let (cutoff_gross, base_amount, taper) = match formula {
        ReliefFormula::None => return Ok(()),
        ReliefFormula::Fixed { amount } => return non_negative(category, "amount", *amount),
        ReliefFormula::Standard {
            cutoff_gross,
            base_amount,
            taper,
        } => (*cutoff_gross, *base_amount, taper),
    };

    non_negative(category, "cutoff_gross", cutoff_gross)?;
    non_negative(category, "base_amount", base_amount)?;

    let (Some(first), Some(last)) = (taper.first(), taper.last()) else {
        return Err(PolicyError::EmptyTaper {
            category: category.to_string(),
        });
    };
    if first.from != Decimal::ZERO {
        return Err(PolicyError::TaperMustStartAtZero {
            category: category.to_string(),
            from: first.from,
        });
    }

    for (index, segment) in taper.iter().enumerate() {
        if segment.to <= segment.from {
            return Err(PolicyError::EmptyTaperSegment {
                category: category.to_string(),
                index,
            });
        }
        if segment.slope > Decimal::ZERO {
            return Err(PolicyError::TaperSlopePositive {
                category: category.to_string(),
                index,
                slope: segment.slope,
            });
        }
        non_negative(category, "start_value", segment.start_value)?;
        if segment.start_value > base_amount {
            return Err(PolicyError::ReliefExceedsBase {
                category: category.to_string(),
                index,
                value: segment.start_value,
            });
        }

        if let Some(previous) = index.checked_sub(1).map(|i| &taper[i]) {
            if segment.from != previous.to {
                return Err(PolicyError::TaperNotContiguous {
                    category: category.to_string(),
                    index,
                });
            }
            // Any step, even a cent, lets net fall as gross crosses the edge.
            let gap = segment.start_value - previous.end_value();
            if !gap.is_zero() {
                return Err(PolicyError::TaperDiscontinuous {
                    category: category.to_string(),
                    index,
                    gap,
                });
            }
        }
    }

    if last.to < cutoff_gross {
        return Err(PolicyError::TaperEndsBeforeCutoff {
            category: category.to_string(),
            to: last.to,
            cutoff: cutoff_gross,
        });
    }

    let remaining = taper
        .iter()
        .find(|segment| segment.contains(cutoff_gross))
        .unwrap_or(last)
        .value_at(cutoff_gross);
    if remaining > Decimal::ZERO {
        return Err(PolicyError::ReliefStepAtCutoff {
            category: category.to_string(),
            remaining,
        });
    }

    Ok(())
}
