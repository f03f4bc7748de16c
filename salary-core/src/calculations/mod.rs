//! The salary conversion engine.
//!
//! The forward model is split into one module per step (relief, income tax,
//! contributions) and assembled by [`SalaryConverter`]. The inverse direction
//! runs a fixed-budget bisection over the forward model.

pub mod bisection;
pub mod common;
pub mod contributions;
pub mod converter;
pub mod income_tax;
pub mod relief;

pub use bisection::{
    BISECTION_ITERATIONS, BisectionOutcome, MAX_UPPER_BOUND, bisect_increasing,
};
pub use converter::{ConversionError, MAX_AMOUNT, SalaryConverter};
