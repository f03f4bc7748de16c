//! Fixed-budget bisection over a non-decreasing function.
//!
//! Used to invert the forward salary model: the caller supplies the forward
//! function, the value it should reach, and a first guess for an upper bound.
//! The search always runs exactly [`BISECTION_ITERATIONS`] halvings, so its
//! cost is known in advance regardless of the target.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tracing::{debug, error};

use super::common::CENT;
use super::converter::ConversionError;

/// Number of halvings performed by every search.
pub const BISECTION_ITERATIONS: u32 = 60;

/// How many times the upper bound may be doubled before giving up.
pub const MAX_UPPER_BOUND_DOUBLINGS: u32 = 64;

/// Ceiling for the upper bound, initial or widened.
pub const MAX_UPPER_BOUND: Decimal = dec!(10000000000000000000000000);

/// Widest final interval still accepted as converged.
pub const MAX_FINAL_INTERVAL: Decimal = CENT;

/// Where a bisection ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BisectionOutcome {
    /// Midpoint evaluated on the last iteration.
    pub root: Decimal,
    /// Final lower end of the interval.
    pub low: Decimal,
    /// Final upper end of the interval.
    pub high: Decimal,
    /// Upper bound the search started from, after widening.
    pub upper_bound: Decimal,
    /// How many times the initial upper bound was doubled.
    pub widenings: u32,
}

impl BisectionOutcome {
    pub fn interval_width(&self) -> Decimal {
        self.high - self.low
    }
}

/// Finds `x ≥ 0` with `f(x) ≈ target` for a non-decreasing `f` with
/// `f(0) ≤ target`.
///
/// The upper bound starts at `initial_upper_bound` (at least 1, at most
/// [`MAX_UPPER_BOUND`]) and is doubled until `f(upper) ≥ target`. Each iteration then evaluates the midpoint and
/// keeps the half whose ends still straddle `target`.
///
/// # Errors
///
/// * [`ConversionError::UpperBoundNotFound`] if doubling never reaches
///   `target` before hitting [`MAX_UPPER_BOUND`].
/// * [`ConversionError::NonConvergence`] if the final interval is still wider
///   than [`MAX_FINAL_INTERVAL`].
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use salary_core::calculations::bisect_increasing;
///
/// let outcome = bisect_increasing(|x| x * dec!(0.6), dec!(300), dec!(100)).unwrap();
///
/// assert!((outcome.root - dec!(500)).abs() < dec!(0.000001));
/// assert!(outcome.widenings > 0);
/// ```
pub fn bisect_increasing<F>(
    f: F,
    target: Decimal,
    initial_upper_bound: Decimal,
) -> Result<BisectionOutcome, ConversionError>
where
    F: Fn(Decimal) -> Decimal,
{
    let (upper_bound, widenings) = widen_upper_bound(&f, target, initial_upper_bound)?;
    if widenings > 0 {
        debug!(
            %target,
            %initial_upper_bound,
            %upper_bound,
            widenings,
            "widened bisection upper bound"
        );
    }

    let mut low = Decimal::ZERO;
    let mut high = upper_bound;
    let mut mid = upper_bound;

    for _ in 0..BISECTION_ITERATIONS {
        mid = (low + high) / Decimal::TWO;
        if f(mid) > target {
            high = mid;
        } else {
            low = mid;
        }
    }

    let outcome = BisectionOutcome {
        root: mid,
        low,
        high,
        upper_bound,
        widenings,
    };

    let interval_width = outcome.interval_width();
    if interval_width > MAX_FINAL_INTERVAL {
        let residual = (f(mid) - target).abs();
        error!(
            %target,
            %upper_bound,
            %interval_width,
            %residual,
            "bisection interval still too wide after fixed budget"
        );
        return Err(ConversionError::NonConvergence {
            iterations: BISECTION_ITERATIONS,
            interval_width,
            residual,
        });
    }

    Ok(outcome)
}

fn widen_upper_bound<F>(
    f: &F,
    target: Decimal,
    initial_upper_bound: Decimal,
) -> Result<(Decimal, u32), ConversionError>
where
    F: Fn(Decimal) -> Decimal,
{
    let mut upper_bound = initial_upper_bound.clamp(Decimal::ONE, MAX_UPPER_BOUND);
    let mut reached = f(upper_bound);
    let mut widenings = 0;

    while reached < target {
        let doubled = upper_bound
            .checked_mul(Decimal::TWO)
            .filter(|doubled| *doubled <= MAX_UPPER_BOUND && widenings < MAX_UPPER_BOUND_DOUBLINGS);
        let Some(doubled) = doubled else {
            error!(
                %target,
                %upper_bound,
                %reached,
                widenings,
                "could not find an upper bound for bisection"
            );
            return Err(ConversionError::UpperBoundNotFound {
                target,
                upper_bound,
                reached,
            });
        };
        upper_bound = doubled;
        reached = f(upper_bound);
        widenings += 1;
    }

    Ok((upper_bound, widenings))
}
