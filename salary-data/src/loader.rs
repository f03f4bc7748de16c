//! TOML policy files.
//!
//! ## File format
//!
//! ```toml
//! tax_year = 2025
//! period = "monthly"            # or "annual"; defaults to "monthly"
//! reference_wage = "2304.50"
//! default_relief_category = "standard"
//!
//! [[brackets]]
//! upper_bound = { reference_wage_multiple = 3 }   # or an absolute amount
//! rate = "0.20"
//!
//! [[brackets]]                                    # last bracket: no upper_bound
//! rate = "0.32"
//!
//! [insurance]
//! employee_rate_primary = "0.0698"
//! employee_rate_capped = "0.1252"
//! cap_multiple_of_reference_wage = 5
//! employer_rate = "0.3520"
//! supplementary_pension_rate = "0.02"
//!
//! [relief_categories.none]
//! kind = "none"                                   # or "fixed" / "standard"
//! ```
//!
//! Amounts may be written as strings (exact) or TOML numbers.
//!
//! ### Periods
//!
//! The engine works per month. In an `annual` file every absolute amount
//! (reference wage, absolute bracket bounds, relief amounts and taper edges)
//! is divided by 12 on load. Rates, slopes and reference-wage multiples are
//! period-independent and kept as written.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use salary_core::{
    InsuranceRates, PolicyError, PolicyRegistry, ReliefFormula, TaperSegment, TaxBracket,
    TaxPolicy, TaxPolicyConfig,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// The policy shipped with the crate.
pub const REFERENCE_POLICY_TOML: &str = include_str!("../policies/reference_2025.toml");

const MONTHS_PER_YEAR: u32 = 12;

/// Errors that can occur when loading policy files.
#[derive(Debug, Error)]
pub enum PolicyFileError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid policy TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("policy for tax year {tax_year} rejected: {source}")]
    Invalid {
        tax_year: i32,
        #[source]
        source: PolicyError,
    },

    #[error("in '{path}': {source}")]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<PolicyFileError>,
    },

    #[error("no policy files (*.toml) found in '{0}'")]
    EmptyDirectory(PathBuf),

    #[error("tax year {tax_year} is defined by both '{first}' and '{second}'")]
    DuplicateTaxYear {
        tax_year: i32,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Period the absolute amounts of a policy file are expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    #[default]
    Monthly,
    Annual,
}

impl Period {
    /// Factor that turns an amount in this period into a monthly amount.
    fn months(self) -> u32 {
        match self {
            Period::Monthly => 1,
            Period::Annual => MONTHS_PER_YEAR,
        }
    }
}

/// A bracket edge, absolute or relative to the reference wage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BoundSpec {
    Absolute(Decimal),
    Multiple { reference_wage_multiple: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BracketSpec {
    #[serde(default)]
    pub upper_bound: Option<BoundSpec>,
    pub rate: Decimal,
}

/// A policy file exactly as written on disk, before any validation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyFile {
    pub tax_year: i32,
    #[serde(default)]
    pub period: Period,
    pub reference_wage: Decimal,
    pub default_relief_category: String,
    pub brackets: Vec<BracketSpec>,
    pub insurance: InsuranceRates,
    pub relief_categories: BTreeMap<String, ReliefFormula>,
}

impl PolicyFile {
    /// Resolves reference-wage multiples and converts amounts to monthly.
    pub fn into_config(self) -> TaxPolicyConfig {
        let months = Decimal::from(self.period.months());
        let monthly = |amount: Decimal| amount / months;
        let reference_wage = monthly(self.reference_wage);

        let brackets = self
            .brackets
            .into_iter()
            .map(|spec| TaxBracket {
                upper_bound: spec.upper_bound.map(|bound| match bound {
                    BoundSpec::Absolute(amount) => monthly(amount),
                    BoundSpec::Multiple {
                        reference_wage_multiple,
                    } => reference_wage * reference_wage_multiple,
                }),
                rate: spec.rate,
            })
            .collect();

        let relief_categories = self
            .relief_categories
            .into_iter()
            .map(|(name, formula)| (name, scale_relief(formula, &monthly)))
            .collect();

        TaxPolicyConfig {
            tax_year: self.tax_year,
            reference_wage,
            brackets,
            relief_categories,
            default_relief_category: self.default_relief_category,
            insurance: self.insurance,
        }
    }
}

fn scale_relief(
    formula: ReliefFormula,
    scale: &impl Fn(Decimal) -> Decimal,
) -> ReliefFormula {
    match formula {
        ReliefFormula::None => ReliefFormula::None,
        ReliefFormula::Fixed { amount } => ReliefFormula::Fixed {
            amount: scale(amount),
        },
        ReliefFormula::Standard {
            cutoff_gross,
            base_amount,
            taper,
        } => ReliefFormula::Standard {
            cutoff_gross: scale(cutoff_gross),
            base_amount: scale(base_amount),
            taper: taper
                .into_iter()
                .map(|segment| TaperSegment {
                    from: scale(segment.from),
                    to: scale(segment.to),
                    start_value: scale(segment.start_value),
                    slope: segment.slope,
                })
                .collect(),
        },
    }
}

/// Loader for TOML policy files.
pub struct PolicyLoader;

impl PolicyLoader {
    /// Parse and validate one policy from TOML text.
    pub fn parse(input: &str) -> Result<TaxPolicy, PolicyFileError> {
        let file: PolicyFile = toml::from_str(input)?;
        let tax_year = file.tax_year;
        let period = file.period;

        let policy = TaxPolicy::new(file.into_config())
            .map_err(|source| PolicyFileError::Invalid { tax_year, source })?;

        debug!(tax_year, ?period, "parsed policy");
        Ok(policy)
    }

    /// The policy shipped with the crate.
    pub fn reference() -> Result<TaxPolicy, PolicyFileError> {
        Self::parse(REFERENCE_POLICY_TOML)
    }

    /// Read a file from disk and delegate to [`PolicyLoader::parse`].
    pub fn from_file(path: &Path) -> Result<TaxPolicy, PolicyFileError> {
        let contents = fs::read_to_string(path).map_err(|source| PolicyFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse(&contents).map_err(|source| PolicyFileError::InFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Load every `*.toml` file in `dir` into a registry.
    ///
    /// Files are read in name order. Two files for the same tax year are an
    /// error rather than a silent replacement.
    pub fn load_dir(dir: &Path) -> Result<PolicyRegistry, PolicyFileError> {
        let io_error = |source| PolicyFileError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        if paths.is_empty() {
            return Err(PolicyFileError::EmptyDirectory(dir.to_path_buf()));
        }

        let mut registry = PolicyRegistry::new();
        let mut sources: HashMap<i32, PathBuf> = HashMap::new();

        for path in paths {
            let policy = Self::from_file(&path)?;
            let tax_year = policy.tax_year();

            if let Some(first) = sources.get(&tax_year) {
                return Err(PolicyFileError::DuplicateTaxYear {
                    tax_year,
                    first: first.clone(),
                    second: path,
                });
            }

            info!(tax_year, path = %path.display(), "loaded policy");
            registry.register(policy);
            sources.insert(tax_year, path);
        }

        Ok(registry)
    }
}
