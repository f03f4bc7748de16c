//! Gross-to-net and net-to-gross salary conversion.
//!
//! # Forward model
//!
//! | Step | Description |
//! |------|-------------|
//! | 1    | Relief: allowance for the relief category at this gross, capped at gross |
//! | 2    | Taxable base: gross − relief |
//! | 3    | Income tax: progressive brackets over the taxable base |
//! | 4    | Employee contributions: capped, primary and optional supplementary pension |
//! | 5    | Employer contribution: employer rate × gross (not deducted) |
//! | 6    | Net: gross − income tax − employee contributions |
//!
//! # Inverse model
//!
//! Net salary never falls as gross rises (policy validation guarantees it), so
//! the gross for a wanted net is found by bisection over the forward model.
//! The breakdown returned by [`SalaryConverter::compute_gross`] always comes
//! from one last forward evaluation, so both directions report identical
//! figures for the same gross.
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use rust_decimal_macros::dec;
//! use salary_core::{
//!     InsuranceRates, ReliefFormula, SalaryConverter, TaxBracket, TaxPolicy, TaxPolicyConfig,
//! };
//!
//! let policy = TaxPolicy::new(TaxPolicyConfig {
//!     tax_year: 2025,
//!     reference_wage: dec!(2000),
//!     brackets: vec![
//!         TaxBracket::bounded(dec!(6000), dec!(0.20)),
//!         TaxBracket::unbounded(dec!(0.25)),
//!     ],
//!     relief_categories: BTreeMap::from([(
//!         "flat".to_string(),
//!         ReliefFormula::Fixed { amount: dec!(500) },
//!     )]),
//!     default_relief_category: "flat".to_string(),
//!     insurance: InsuranceRates {
//!         employee_rate_primary: dec!(0.05),
//!         employee_rate_capped: dec!(0.10),
//!         cap_multiple_of_reference_wage: dec!(3),
//!         employer_rate: dec!(0.30),
//!         supplementary_pension_rate: dec!(0.02),
//!     },
//! })
//! .unwrap();
//!
//! let converter = SalaryConverter::new(&policy);
//!
//! let forward = converter.compute_net(dec!(2500), None, false).unwrap();
//! // tax: (2500 - 500) × 20% = 400; contributions: 2500 × 15% = 375
//! assert_eq!(forward.net, dec!(1725));
//! assert_eq!(forward.total_employment_cost, dec!(3250));
//!
//! let inverse = converter.compute_gross(dec!(1725), None, false).unwrap();
//! assert!((inverse.gross - dec!(2500)).abs() < dec!(0.01));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::{debug, error};

use super::bisection::{
    BISECTION_ITERATIONS, BisectionOutcome, MAX_UPPER_BOUND, bisect_increasing,
};
use super::common::{CENT, non_negative, within};
use super::contributions::{employee_contributions, employer_contribution};
use super::income_tax::progressive_tax;
use super::relief::relief_applied;
use crate::models::{ConversionRequest, Direction, ReliefFormula, SalaryBreakdown, TaxPolicy};

/// Largest accepted gap between the requested net and the net produced by the
/// recovered gross.
pub const ROUND_TRIP_TOLERANCE: Decimal = CENT;

/// Largest gross or net amount the converter accepts, per pay period.
///
/// Keeps every intermediate sum of the forward model and the gross search far
/// from the limits of [`Decimal`].
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

/// Margin applied on top of the closed-form gross estimate that seeds the
/// bisection upper bound.
const UPPER_BOUND_HEADROOM: Decimal = dec!(1.5);

/// Errors returned by [`SalaryConverter`].
///
/// `NegativeAmount`, `AmountTooLarge` and `UnknownReliefCategory` are invalid
/// input: nothing is computed. The search variants are logged at error level
/// before being returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("salary amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("salary amount {amount} exceeds the maximum of {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("unknown relief category '{requested}'; available: {available:?}")]
    UnknownReliefCategory {
        requested: String,
        available: Vec<String>,
    },

    #[error(
        "gross search did not converge after {iterations} iterations \
         (interval width {interval_width}, residual {residual})"
    )]
    NonConvergence {
        iterations: u32,
        interval_width: Decimal,
        residual: Decimal,
    },

    #[error("no gross up to {upper_bound} yields net {target} (reached {reached})")]
    UpperBoundNotFound {
        target: Decimal,
        upper_bound: Decimal,
        reached: Decimal,
    },
}

impl ConversionError {
    /// Whether the caller asked for something meaningless, as opposed to the
    /// engine failing on a valid request.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::NegativeAmount(_)
                | Self::AmountTooLarge { .. }
                | Self::UnknownReliefCategory { .. }
        )
    }
}

/// Converts salaries under one [`TaxPolicy`].
///
/// Holds nothing but a shared reference to the policy, so it is cheap to
/// create per call and safe to use from many threads at once.
#[derive(Debug, Clone, Copy)]
pub struct SalaryConverter<'a> {
    policy: &'a TaxPolicy,
}

impl<'a> SalaryConverter<'a> {
    pub fn new(policy: &'a TaxPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &'a TaxPolicy {
        self.policy
    }

    /// Runs `request` in the direction it names.
    pub fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<SalaryBreakdown, ConversionError> {
        let category = request.relief_category.as_deref();
        match request.direction {
            Direction::GrossToNet => {
                self.compute_net(request.amount, category, request.supplementary_pension)
            }
            Direction::NetToGross => {
                self.compute_gross(request.amount, category, request.supplementary_pension)
            }
        }
    }

    /// Take-home pay and full breakdown for `gross`.
    ///
    /// `relief_category` of `None` uses the policy's default category.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::NegativeAmount`] if `gross` is negative.
    /// * [`ConversionError::AmountTooLarge`] if `gross` is above
    ///   [`MAX_AMOUNT`].
    /// * [`ConversionError::UnknownReliefCategory`] if the category is not
    ///   defined by the policy.
    pub fn compute_net(
        &self,
        gross: Decimal,
        relief_category: Option<&str>,
        supplementary_pension: bool,
    ) -> Result<SalaryBreakdown, ConversionError> {
        check_amount(gross)?;
        let formula = self.relief_formula(relief_category)?;

        Ok(self.breakdown(gross, formula, supplementary_pension))
    }

    /// The gross salary whose take-home pay is `net`, with its breakdown.
    ///
    /// A net of zero maps to a gross of zero.
    ///
    /// # Errors
    ///
    /// * [`ConversionError::NegativeAmount`] if `net` is negative.
    /// * [`ConversionError::AmountTooLarge`] if `net` is above [`MAX_AMOUNT`].
    /// * [`ConversionError::UnknownReliefCategory`] if the category is not
    ///   defined by the policy.
    /// * [`ConversionError::NonConvergence`] or
    ///   [`ConversionError::UpperBoundNotFound`] if the search cannot settle on
    ///   a gross within [`ROUND_TRIP_TOLERANCE`].
    pub fn compute_gross(
        &self,
        net: Decimal,
        relief_category: Option<&str>,
        supplementary_pension: bool,
    ) -> Result<SalaryBreakdown, ConversionError> {
        check_amount(net)?;
        let formula = self.relief_formula(relief_category)?;

        if net.is_zero() {
            return Ok(self.breakdown(Decimal::ZERO, formula, supplementary_pension));
        }

        let outcome = self.search_gross(net, formula, supplementary_pension)?;

        let breakdown = self.breakdown(outcome.root, formula, supplementary_pension);
        if !within(breakdown.net, net, ROUND_TRIP_TOLERANCE) {
            let residual = (breakdown.net - net).abs();
            error!(
                %net,
                gross = %breakdown.gross,
                %residual,
                "recovered gross does not reproduce the requested net"
            );
            return Err(ConversionError::NonConvergence {
                iterations: BISECTION_ITERATIONS,
                interval_width: outcome.interval_width(),
                residual,
            });
        }

        debug!(
            %net,
            gross = %breakdown.gross,
            upper_bound = %outcome.upper_bound,
            widenings = outcome.widenings,
            "recovered gross from net"
        );

        Ok(breakdown)
    }

    fn search_gross(
        &self,
        net: Decimal,
        formula: &ReliefFormula,
        supplementary_pension: bool,
    ) -> Result<BisectionOutcome, ConversionError> {
        bisect_increasing(
            |gross| self.breakdown(gross, formula, supplementary_pension).net,
            net,
            self.initial_upper_bound(net, supplementary_pension),
        )
    }

    fn relief_formula(
        &self,
        category: Option<&str>,
    ) -> Result<&'a ReliefFormula, ConversionError> {
        let policy = self.policy;
        let name = category.unwrap_or_else(|| policy.default_relief_category());

        policy
            .relief_formula(name)
            .ok_or_else(|| ConversionError::UnknownReliefCategory {
                requested: name.to_string(),
                available: policy.relief_categories().map(str::to_string).collect(),
            })
    }

    /// Closed-form guess at an upper bound for the gross behind `net`.
    ///
    /// Tax never exceeds the top rate on the whole gross, so
    /// `net / (1 − top rate − employee rates)` already bounds the answer. When
    /// that denominator is zero the guess is `net` and the search widens it.
    /// Never above [`MAX_UPPER_BOUND`].
    fn initial_upper_bound(
        &self,
        net: Decimal,
        supplementary_pension: bool,
    ) -> Decimal {
        let retained = Decimal::ONE
            - self.policy.highest_marginal_rate()
            - self.policy.total_employee_rate(supplementary_pension);

        let estimate = if retained > Decimal::ZERO {
            net.checked_div(retained)
        } else {
            Some(net)
        };

        estimate
            .and_then(|estimate| estimate.checked_mul(UPPER_BOUND_HEADROOM))
            .map_or(MAX_UPPER_BOUND, |bound| bound.min(MAX_UPPER_BOUND))
    }

    fn breakdown(
        &self,
        gross: Decimal,
        formula: &ReliefFormula,
        supplementary_pension: bool,
    ) -> SalaryBreakdown {
        let relief = relief_applied(formula, gross);
        let taxable_base = non_negative(gross - relief);
        let income_tax = progressive_tax(self.policy.brackets(), taxable_base);
        let employee = employee_contributions(self.policy, gross, supplementary_pension);
        let employer = employer_contribution(self.policy, gross);

        SalaryBreakdown {
            gross,
            net: gross - income_tax - employee.total(),
            relief_applied: relief,
            taxable_base,
            income_tax,
            employee_contributions: employee,
            employer_contribution: employer,
            total_employment_cost: gross + employer,
        }
    }
}

fn check_amount(amount: Decimal) -> Result<(), ConversionError> {
    if amount < Decimal::ZERO {
        return Err(ConversionError::NegativeAmount(amount));
    }
    if amount > MAX_AMOUNT {
        return Err(ConversionError::AmountTooLarge {
            amount,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}
