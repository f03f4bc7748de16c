pub mod calculations;
pub mod models;
pub mod registry;

#[cfg(test)]
mod testing;

pub use calculations::{ConversionError, SalaryConverter};
pub use models::*;
pub use registry::{PolicyRegistry, PolicyRegistryError};
