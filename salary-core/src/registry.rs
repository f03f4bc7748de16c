use std::collections::HashMap;

use thiserror::Error;

use crate::models::TaxPolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyRegistryError {
    #[error("no policy registered for tax year {requested}; available: {available:?}")]
    UnknownYear { requested: i32, available: Vec<i32> },

    #[error("no policies registered")]
    Empty,
}

/// Validated [`TaxPolicy`] instances, one per tax year.
///
/// Typical lifetime:
/// 1. Create with `PolicyRegistry::new()`.
/// 2. Call `register` once per policy file.
/// 3. Look policies up by year with `get`, or take the newest with `latest`.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: HashMap<i32, TaxPolicy>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
        }
    }

    /// Register a policy under its own tax year.
    ///
    /// A policy already registered for that year is replaced and returned.
    pub fn register(
        &mut self,
        policy: TaxPolicy,
    ) -> Option<TaxPolicy> {
        self.policies.insert(policy.tax_year(), policy)
    }

    /// Every registered tax year, ascending.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years: Vec<_> = self.policies.keys().copied().collect();
        years.sort_unstable();
        years
    }

    /// # Errors
    /// * [`PolicyRegistryError::UnknownYear`] if nothing is registered for
    ///   `year`; the error lists the years that are.
    pub fn get(
        &self,
        year: i32,
    ) -> Result<&TaxPolicy, PolicyRegistryError> {
        self.policies
            .get(&year)
            .ok_or_else(|| PolicyRegistryError::UnknownYear {
                requested: year,
                available: self.available_years(),
            })
    }

    /// Policy for the most recent tax year.
    pub fn latest(&self) -> Result<&TaxPolicy, PolicyRegistryError> {
        self.policies
            .iter()
            .max_by_key(|(year, _)| **year)
            .map(|(_, policy)| policy)
            .ok_or(PolicyRegistryError::Empty)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
